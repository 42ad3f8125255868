//! Tagged sample values.
//!
//! Scientific grids routinely carry per-dataset "no data" sentinels. Those are
//! translated into an explicit `Missing` tag at the provider boundary so the
//! statistics code never compares against magic constants.

use serde::{Deserialize, Serialize};

/// A single grid cell value: either a physical value or an explicit gap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Sample {
    /// A valid physical value.
    Present(f32),
    /// No data at this cell/time step.
    Missing,
}

impl Sample {
    /// Tag a raw value, mapping a dataset's sentinel (and NaN) to `Missing`.
    pub fn from_raw(value: f32, sentinel: Option<f32>) -> Self {
        if value.is_nan() {
            return Sample::Missing;
        }
        if let Some(s) = sentinel {
            if value == s {
                return Sample::Missing;
            }
        }
        Sample::Present(value)
    }

    /// The contained value, if present.
    pub fn value(&self) -> Option<f32> {
        match self {
            Sample::Present(v) => Some(*v),
            Sample::Missing => None,
        }
    }

    /// True if this sample carries no data.
    pub fn is_missing(&self) -> bool {
        matches!(self, Sample::Missing)
    }

    /// Apply a function to the contained value, preserving `Missing`.
    pub fn map(self, f: impl FnOnce(f32) -> f32) -> Self {
        match self {
            Sample::Present(v) => Sample::Present(f(v)),
            Sample::Missing => Sample::Missing,
        }
    }
}
