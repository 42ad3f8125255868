//! Error types for ensemble aggregation.

use ensemble_common::{GridShape, ModelId};
use thiserror::Error;

/// Errors from ensemble aggregation. Both variants are structural: they mean
/// the caller fed the aggregator something it never should have.
#[derive(Debug, Error)]
pub enum EnsembleError {
    /// A field's shape differs from the rest of the ensemble.
    #[error("field {model} has shape {found:?}, ensemble expects {expected:?}")]
    GridMismatch {
        model: ModelId,
        expected: GridShape,
        found: GridShape,
    },

    /// The ensemble contains no fields at all.
    #[error("ensemble contains no fields")]
    Empty,
}
