//! Model, dataset, and scenario identifiers.

use serde::{Deserialize, Serialize};

/// Identifier of a contributing climate model or reanalysis dataset
/// (e.g., "ACCESS-CM2", "GLDAS").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelId(pub String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Kind of source dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// CMIP6 forward projection.
    Projection,
    /// Historical observational reanalysis (GLDAS).
    Reanalysis,
}

/// CMIP6 shared socioeconomic pathway scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Ssp126,
    Ssp245,
    Ssp370,
    Ssp585,
}

impl Scenario {
    /// Parse from the dataset naming convention (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ssp126" => Some(Self::Ssp126),
            "ssp245" => Some(Self::Ssp245),
            "ssp370" => Some(Self::Ssp370),
            "ssp585" => Some(Self::Ssp585),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ssp126 => "ssp126",
            Self::Ssp245 => "ssp245",
            Self::Ssp370 => "ssp370",
            Self::Ssp585 => "ssp585",
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
