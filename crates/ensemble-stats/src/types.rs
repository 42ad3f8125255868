//! Result types produced by aggregation and uncertainty estimation.

use ensemble_common::{GridShape, ModelId, Sample, TargetGrid, Units};
use serde::{Deserialize, Serialize};

/// A model excluded from the ensemble, with the reason it was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedModel {
    pub model: ModelId,
    pub reason: String,
}

/// Per-cell, per-step ensemble statistics.
///
/// All statistic planes are flat arrays indexed by
/// [`GridShape::flat_index`]. Cells where no model contributed carry
/// `count == 0` and missing statistics rather than poisoning neighbors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleResult {
    /// The grid all members were aligned to.
    pub grid: TargetGrid,
    pub shape: GridShape,
    pub units: Units,
    /// Percentile levels computed, in ascending order (e.g., 10, 50, 90).
    pub levels: Vec<f64>,
    /// Contributing model count per cell/step.
    pub count: Vec<u32>,
    /// Arithmetic mean across contributing models.
    pub mean: Vec<Sample>,
    /// Population standard deviation across contributing models.
    pub stddev: Vec<Sample>,
    /// One plane per entry in `levels`.
    pub percentiles: Vec<Vec<Sample>>,
    /// Models that contributed, in input order.
    pub members: Vec<ModelId>,
    /// Aligned member samples, one flat plane per member. Retained so the
    /// agreement score can be computed against the per-cell spread.
    pub member_values: Vec<Vec<Sample>>,
    /// Models dropped before aggregation, with reasons.
    pub excluded: Vec<ExcludedModel>,
}

impl EnsembleResult {
    /// True when no model contributed at this flat index.
    pub fn is_no_data(&self, idx: usize) -> bool {
        self.count.get(idx).copied().unwrap_or(0) == 0
    }

    /// The percentile plane for a given level, if it was computed.
    pub fn percentile_plane(&self, level: f64) -> Option<&[Sample]> {
        self.levels
            .iter()
            .position(|&l| l == level)
            .map(|i| self.percentiles[i].as_slice())
    }

    /// Number of contributing models at (time, row, col).
    pub fn count_at(&self, t: usize, row: usize, col: usize) -> u32 {
        self.count[self.shape.flat_index(t, row, col)]
    }
}

/// Uncertainty band derived from an [`EnsembleResult`].
///
/// Computed fresh per query and never persisted; the session cache is the
/// only place it lives between calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UncertaintyBand {
    /// Percentile level of the lower bound (e.g., 10).
    pub lower_level: f64,
    /// Percentile level of the upper bound (e.g., 90).
    pub upper_level: f64,
    pub shape: GridShape,
    /// Lower bound per cell/step.
    pub lower: Vec<Sample>,
    /// Upper bound per cell/step.
    pub upper: Vec<Sample>,
    /// Fraction of contributing models within one standard deviation of the
    /// mean; missing where no model contributed, never coerced to zero.
    pub agreement: Vec<Sample>,
}
