//! Query-level error types.

use ensemble_stats::{EnsembleError, ExcludedModel};
use thiserror::Error;

/// Errors surfaced to the caller of [`crate::RegionTimeQuery::run`].
///
/// Per-model failures never appear here; they are folded into the response's
/// excluded-model list. What does appear is either a structural misuse or a
/// total failure.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The request carried an empty model set. Raised before any fetch.
    #[error("no models selected")]
    NoModelsSelected,

    /// Every requested model failed; there is nothing to aggregate.
    #[error("no models returned valid data for this region/time range")]
    EmptyEnsemble { excluded: Vec<ExcludedModel> },

    /// Structural aggregation failure (shape mismatch); a bug, not a data
    /// condition.
    #[error(transparent)]
    Ensemble(#[from] EnsembleError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}
