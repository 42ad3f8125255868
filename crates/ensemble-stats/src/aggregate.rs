//! Folding aligned fields into per-cell ensemble statistics.

use crate::error::EnsembleError;
use crate::types::EnsembleResult;
use ensemble_common::{AlignedField, Sample};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for ensemble statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Percentile levels to compute, strictly increasing, in [0, 100].
    pub percentile_levels: Vec<f64>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            percentile_levels: vec![10.0, 50.0, 90.0],
        }
    }
}

impl StatsConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("STATS_PERCENTILE_LEVELS") {
            let levels: Vec<f64> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if !levels.is_empty() {
                config.percentile_levels = levels;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.percentile_levels.is_empty() {
            return Err("percentile_levels must not be empty".to_string());
        }
        for w in self.percentile_levels.windows(2) {
            if w[1] <= w[0] {
                return Err("percentile_levels must be strictly increasing".to_string());
            }
        }
        if self
            .percentile_levels
            .iter()
            .any(|&l| !(0.0..=100.0).contains(&l))
        {
            return Err("percentile_levels must lie in [0, 100]".to_string());
        }
        Ok(())
    }
}

/// Per-cell output of the fold, before the planes are reassembled.
struct CellStats {
    count: u32,
    mean: Sample,
    stddev: Sample,
    percentiles: Vec<Sample>,
}

/// Combine aligned model fields into per-cell summary statistics.
///
/// All fields must share the first field's grid and shape; anything else is a
/// caller bug and fails with [`EnsembleError::GridMismatch`]. A member with a
/// missing sample at a cell/step is excluded from that cell's statistics only
/// and the local count drops; cells where every member is missing end up
/// with `count == 0` and missing statistics.
pub fn aggregate(
    fields: Vec<AlignedField>,
    config: &StatsConfig,
) -> Result<EnsembleResult, EnsembleError> {
    let first = fields.first().ok_or(EnsembleError::Empty)?;
    let grid = first.grid.clone();
    let units = first.units;
    let shape = first.shape();

    for field in &fields {
        if field.grid != grid || field.shape() != shape {
            return Err(EnsembleError::GridMismatch {
                model: field.model.clone(),
                expected: shape,
                found: field.shape(),
            });
        }
    }

    debug!(
        members = fields.len(),
        cells = shape.len(),
        levels = ?config.percentile_levels,
        "aggregating ensemble"
    );

    let members: Vec<_> = fields.iter().map(|f| f.model.clone()).collect();
    let member_values: Vec<Vec<Sample>> = fields.into_iter().map(|f| f.data).collect();

    let cells: Vec<CellStats> = (0..shape.len())
        .into_par_iter()
        .map(|idx| {
            let mut values: Vec<f32> = member_values
                .iter()
                .filter_map(|plane| plane[idx].value())
                .collect();
            cell_stats(&mut values, &config.percentile_levels)
        })
        .collect();

    let mut count = Vec::with_capacity(shape.len());
    let mut mean = Vec::with_capacity(shape.len());
    let mut stddev = Vec::with_capacity(shape.len());
    let mut percentiles = vec![Vec::with_capacity(shape.len()); config.percentile_levels.len()];
    for cell in cells {
        count.push(cell.count);
        mean.push(cell.mean);
        stddev.push(cell.stddev);
        for (plane, p) in percentiles.iter_mut().zip(cell.percentiles) {
            plane.push(p);
        }
    }

    Ok(EnsembleResult {
        grid,
        shape,
        units,
        levels: config.percentile_levels.clone(),
        count,
        mean,
        stddev,
        percentiles,
        members,
        member_values,
        excluded: Vec::new(),
    })
}

fn cell_stats(values: &mut Vec<f32>, levels: &[f64]) -> CellStats {
    let n = values.len();
    if n == 0 {
        return CellStats {
            count: 0,
            mean: Sample::Missing,
            stddev: Sample::Missing,
            percentiles: vec![Sample::Missing; levels.len()],
        };
    }

    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    // Population variance: the ensemble is the whole population of sampled
    // models, not a sample of a larger one.
    let variance = values
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n as f64;

    values.sort_by(|a, b| a.total_cmp(b));
    let percentiles = levels
        .iter()
        .map(|&level| Sample::Present(percentile(values, level)))
        .collect();

    CellStats {
        count: n as u32,
        mean: Sample::Present(mean as f32),
        stddev: Sample::Present(variance.sqrt() as f32),
        percentiles,
    }
}

/// Percentile by linear interpolation between order statistics.
///
/// `sorted` must be ascending and non-empty.
pub fn percentile(sorted: &[f32], level: f64) -> f32 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = level / 100.0 * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = (rank - lo as f64) as f32;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}
