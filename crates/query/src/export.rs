//! Flat row export for download endpoints.
//!
//! One row per cell per time step, serialized with camelCase keys to match
//! the JSON/CSV download format consumed by the frontend.

use crate::request::QueryResponse;
use chrono::{DateTime, Utc};
use ensemble_common::Sample;
use serde::Serialize;

/// One exported cell/step with its headline statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub lat: f64,
    pub lon: f64,
    /// Start of the target time step, UTC.
    pub time: DateTime<Utc>,
    /// Contributing model count; 0 marks a no-data cell.
    pub count: u32,
    pub mean: Option<f32>,
    pub stddev: Option<f32>,
    pub p10: Option<f32>,
    pub p50: Option<f32>,
    pub p90: Option<f32>,
    pub agreement_score: Option<f32>,
}

fn plane_value(plane: Option<&[Sample]>, idx: usize) -> Option<f32> {
    plane.and_then(|p| p.get(idx)).and_then(Sample::value)
}

/// Flatten a response into export rows, time-major then north-to-south.
pub fn to_rows(response: &QueryResponse) -> Vec<ExportRow> {
    let result = &response.result;
    let shape = result.shape;
    let steps = result.grid.time_steps();
    let p10 = result.percentile_plane(10.0);
    let p50 = result.percentile_plane(50.0);
    let p90 = result.percentile_plane(90.0);

    let mut rows = Vec::with_capacity(shape.len());
    for (t, step) in steps.iter().enumerate() {
        for row in 0..shape.ny {
            for col in 0..shape.nx {
                let idx = shape.flat_index(t, row, col);
                let (lon, lat) = result.grid.cell_center(row, col);
                rows.push(ExportRow {
                    lat,
                    lon,
                    time: *step,
                    count: result.count[idx],
                    mean: result.mean[idx].value(),
                    stddev: result.stddev[idx].value(),
                    p10: plane_value(p10, idx),
                    p50: plane_value(p50, idx),
                    p90: plane_value(p90, idx),
                    agreement_score: response.band.agreement[idx].value(),
                });
            }
        }
    }
    rows
}
