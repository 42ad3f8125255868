//! Physical units for field variables.

use serde::{Deserialize, Serialize};

/// Units of a temperature field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Native unit of CMIP6 `tas` and GLDAS `Tair_f_inst`.
    #[default]
    Kelvin,
    Celsius,
}

impl Units {
    /// Convert a value from these units to `target`.
    pub fn convert(&self, value: f32, target: Units) -> f32 {
        match (self, target) {
            (Units::Kelvin, Units::Celsius) => value - 273.15,
            (Units::Celsius, Units::Kelvin) => value + 273.15,
            _ => value,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Kelvin => "K",
            Units::Celsius => "degC",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
