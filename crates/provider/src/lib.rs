//! Data-provider boundary.
//!
//! The core never speaks to Earth Engine, S3, or any catalog directly; it
//! asks a [`DataProvider`] for a typed [`GriddedField`] and handles the
//! failures. Production backends live behind this trait; the in-memory
//! implementation here backs the test suite.

pub mod error;
pub mod memory;

use async_trait::async_trait;
use ensemble_common::{BoundingBox, DatasetKind, GriddedField, ModelId, Scenario, TimeRange};

pub use error::ProviderError;
pub use memory::InMemoryProvider;

/// Last year covered by the GLDAS reanalysis record. Years past the cutoff
/// only exist as CMIP6 projections.
pub const REANALYSIS_CUTOFF_YEAR: i32 = 2022;

/// Which dataset kind covers a given year.
pub fn dataset_kind_for_year(year: i32) -> DatasetKind {
    if year <= REANALYSIS_CUTOFF_YEAR {
        DatasetKind::Reanalysis
    } else {
        DatasetKind::Projection
    }
}

/// A request for one model's native field.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub model: ModelId,
    /// Scenario for projection datasets; reanalysis providers ignore it.
    pub scenario: Scenario,
    /// Region of interest. Providers may return a larger native coverage;
    /// they must never return a smaller one without failing.
    pub bbox: BoundingBox,
    pub range: TimeRange,
}

/// Source of native gridded fields.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetch the native field for one model over a region and time range.
    async fn fetch_field(&self, request: &FetchRequest) -> Result<GriddedField, ProviderError>;

    /// Distinct model identifiers available for a scenario.
    async fn list_models(&self, scenario: Scenario) -> Result<Vec<ModelId>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_kind_cutoff() {
        assert_eq!(dataset_kind_for_year(2020), DatasetKind::Reanalysis);
        assert_eq!(
            dataset_kind_for_year(REANALYSIS_CUTOFF_YEAR),
            DatasetKind::Reanalysis
        );
        assert_eq!(dataset_kind_for_year(2023), DatasetKind::Projection);
    }
}
