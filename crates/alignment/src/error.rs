//! Error types for the alignment passes.

use chrono::{DateTime, Utc};
use ensemble_common::{BoundingBox, ModelId, TimeRange};
use thiserror::Error;

/// Errors from spatial resampling.
#[derive(Debug, Error)]
pub enum ResampleError {
    /// The target grid asks for more resolution than the native grid can
    /// support without extrapolating.
    #[error(
        "target grid is {factor:.2}x finer than native grid of {model} (max upscale {max:.2}x)"
    )]
    Resolution {
        model: ModelId,
        factor: f64,
        max: f64,
    },

    /// The target bounding box is not fully inside the field's coverage.
    #[error("target bbox {target:?} not contained in native coverage {native:?} of {model}")]
    Coverage {
        model: ModelId,
        target: BoundingBox,
        native: BoundingBox,
    },
}

/// Errors from temporal alignment.
#[derive(Debug, Error)]
pub enum AlignError {
    /// The requested time range is not covered by the field's native record.
    #[error(
        "requested range {requested:?} not covered by native record of {model} ({native_start} to {native_end})"
    )]
    TemporalRange {
        model: ModelId,
        native_start: DateTime<Utc>,
        native_end: DateTime<Utc>,
        requested: TimeRange,
    },
}
