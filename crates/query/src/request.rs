//! Query request and response types.

use ensemble_common::{BoundingBox, ModelId, Scenario, TargetGrid, TimeRange, TimeStep, Units};
use ensemble_stats::{EnsembleResult, UncertaintyBand};
use serde::{Deserialize, Serialize};

/// A region/time selection to run the pipeline over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub bbox: BoundingBox,
    pub range: TimeRange,
    pub step: TimeStep,
    /// Models to include in the ensemble. Order is irrelevant; duplicates are
    /// collapsed.
    pub models: Vec<ModelId>,
    pub scenario: Scenario,
    /// Units of the returned statistics.
    pub units: Units,
}

impl QueryRequest {
    /// Requested models, deduplicated, in first-seen order.
    pub fn distinct_models(&self) -> Vec<ModelId> {
        let mut seen = Vec::new();
        for model in &self.models {
            if !seen.contains(model) {
                seen.push(model.clone());
            }
        }
        seen
    }

    /// Session cache key: quantized grid extent plus the sorted model set,
    /// scenario, and units. Two requests naming the same models in different
    /// order share a key.
    pub fn cache_key(&self, grid: &TargetGrid) -> String {
        let mut models: Vec<&str> = self.models.iter().map(|m| m.as_str()).collect();
        models.sort_unstable();
        models.dedup();
        format!(
            "{}|{}|{}|{}",
            grid.cache_key(),
            models.join(","),
            self.scenario,
            self.units
        )
    }
}

/// Aggregate statistics over the whole response, mirroring the headline
/// numbers a dashboard shows next to the plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySummary {
    /// Models that survived into the ensemble.
    pub model_count: usize,
    /// Models dropped along the way.
    pub excluded_count: usize,
    /// Mean of all per-cell ensemble means with data.
    pub ensemble_mean: Option<f32>,
    /// Mean of all per-cell standard deviations with data.
    pub mean_spread: Option<f32>,
}

/// Everything a presentation layer needs from one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub result: EnsembleResult,
    pub band: UncertaintyBand,
    pub summary: QuerySummary,
}

impl QuerySummary {
    pub(crate) fn from_result(result: &EnsembleResult) -> Self {
        let mut mean_sum = 0.0f64;
        let mut mean_n = 0usize;
        let mut sd_sum = 0.0f64;
        let mut sd_n = 0usize;
        for s in &result.mean {
            if let Some(v) = s.value() {
                mean_sum += v as f64;
                mean_n += 1;
            }
        }
        for s in &result.stddev {
            if let Some(v) = s.value() {
                sd_sum += v as f64;
                sd_n += 1;
            }
        }
        Self {
            model_count: result.members.len(),
            excluded_count: result.excluded.len(),
            ensemble_mean: (mean_n > 0).then(|| (mean_sum / mean_n as f64) as f32),
            mean_spread: (sd_n > 0).then(|| (sd_sum / sd_n as f64) as f32),
        }
    }
}
