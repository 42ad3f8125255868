//! The canonical target grid all inputs are aligned onto.

use crate::{BoundingBox, TimeRange, TimeStep};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Shape of an aligned lat x lon x time block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    /// Rows (latitude, north to south).
    pub ny: usize,
    /// Columns (longitude, west to east).
    pub nx: usize,
    /// Time steps.
    pub nt: usize,
}

impl GridShape {
    /// Total number of cells across all time steps.
    pub fn len(&self) -> usize {
        self.ny * self.nx * self.nt
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cells per single time step.
    pub fn cells_per_step(&self) -> usize {
        self.ny * self.nx
    }

    /// Flat index for (time, row, col). Time-major, then row-major
    /// top-to-bottom.
    pub fn flat_index(&self, t: usize, row: usize, col: usize) -> usize {
        (t * self.ny + row) * self.nx + col
    }
}

/// The canonical spatio-temporal grid the platform aggregates onto.
///
/// Every field entering the ensemble must be resampled and aligned to this
/// grid; the aggregator rejects anything with a different shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetGrid {
    /// Spatial bounds of the grid.
    pub bbox: BoundingBox,
    /// Cell width in degrees longitude.
    pub dx: f64,
    /// Cell height in degrees latitude.
    pub dy: f64,
    /// Time window covered by the grid.
    pub range: TimeRange,
    /// Length of one target time step.
    pub step: TimeStep,
}

impl TargetGrid {
    pub fn new(bbox: BoundingBox, dx: f64, dy: f64, range: TimeRange, step: TimeStep) -> Self {
        Self {
            bbox,
            dx,
            dy,
            range,
            step,
        }
    }

    /// Number of columns.
    pub fn nx(&self) -> usize {
        (self.bbox.width() / self.dx).round().max(1.0) as usize
    }

    /// Number of rows.
    pub fn ny(&self) -> usize {
        (self.bbox.height() / self.dy).round().max(1.0) as usize
    }

    /// Shape of a field aligned to this grid.
    pub fn shape(&self) -> GridShape {
        GridShape {
            ny: self.ny(),
            nx: self.nx(),
            nt: self.step_bounds().len(),
        }
    }

    /// Center coordinates (lon, lat) of the cell at (row, col).
    ///
    /// Row 0 is the northernmost row, matching row-major top-to-bottom data
    /// ordering.
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.bbox.min_lon + (col as f64 + 0.5) * self.dx,
            self.bbox.max_lat - (row as f64 + 0.5) * self.dy,
        )
    }

    /// Start instants of all target time steps.
    pub fn time_steps(&self) -> Vec<DateTime<Utc>> {
        self.step_bounds().into_iter().map(|(s, _)| s).collect()
    }

    /// Half-open `[start, end)` bounds of every target time step.
    pub fn step_bounds(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        let mut bounds = Vec::new();
        match self.step {
            TimeStep::Daily => {
                let mut cur = self.range.start;
                while cur < self.range.end {
                    let next = cur + chrono::Duration::days(1);
                    bounds.push((cur, next.min(self.range.end)));
                    cur = next;
                }
            }
            TimeStep::Monthly => {
                let mut year = self.range.start.year();
                let mut month = self.range.start.month();
                let mut cur = self.range.start;
                while cur < self.range.end {
                    let (next_year, next_month) = if month == 12 {
                        (year + 1, 1)
                    } else {
                        (year, month + 1)
                    };
                    let next = Utc
                        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
                        .unwrap();
                    bounds.push((cur, next.min(self.range.end)));
                    cur = next;
                    year = next_year;
                    month = next_month;
                }
            }
        }
        bounds
    }

    /// Cache key fragment covering the full spatio-temporal extent.
    pub fn cache_key(&self) -> String {
        format!(
            "{}_{:.4}x{:.4}_{}_{}",
            self.bbox.cache_key(),
            self.dx,
            self.dy,
            self.range.cache_key(),
            self.step.as_str()
        )
    }
}
