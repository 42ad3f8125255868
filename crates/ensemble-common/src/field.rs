//! Field containers: native gridded fields and their aligned form.

use crate::{BoundingBox, Calendar, DatasetKind, GridShape, ModelId, Sample, Scenario, TargetGrid, TimeAxis, Units};
use serde::{Deserialize, Serialize};

/// Interpolation method used during spatial resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    /// Smooth interpolation between the four nearest source cells.
    #[default]
    Bilinear,
    /// Value of the nearest source cell; used when the source grid is too
    /// coarse for bilinear to add anything but false precision.
    Nearest,
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bilinear => write!(f, "bilinear"),
            Self::Nearest => write!(f, "nearest"),
        }
    }
}

/// A native lat x lon x time block as delivered by a data provider.
///
/// Immutable once produced; the pipeline derives aligned copies from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GriddedField {
    /// Source model or dataset identifier.
    pub model: ModelId,
    pub kind: DatasetKind,
    /// Scenario for projections; `None` for reanalysis.
    pub scenario: Option<Scenario>,
    pub units: Units,
    /// Native spatial coverage.
    pub bbox: BoundingBox,
    /// Native cell width in degrees longitude.
    pub dx: f64,
    /// Native cell height in degrees latitude.
    pub dy: f64,
    /// Rows (north to south).
    pub ny: usize,
    /// Columns (west to east).
    pub nx: usize,
    /// Native time axis in the model's own calendar.
    pub axis: TimeAxis,
    /// Samples, time-major then row-major top-to-bottom;
    /// `len == axis.len * ny * nx`.
    pub data: Vec<Sample>,
}

impl GriddedField {
    /// Sample at (time, row, col), or `None` when out of bounds.
    pub fn sample(&self, t: usize, row: usize, col: usize) -> Option<Sample> {
        if t >= self.axis.len || row >= self.ny || col >= self.nx {
            return None;
        }
        self.data.get((t * self.ny + row) * self.nx + col).copied()
    }

    /// The samples of one native time slice.
    pub fn time_slice(&self, t: usize) -> &[Sample] {
        let cells = self.ny * self.nx;
        &self.data[t * cells..(t + 1) * cells]
    }

    /// Center coordinates (lon, lat) of the native cell at (row, col).
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.bbox.min_lon + (col as f64 + 0.5) * self.dx,
            self.bbox.max_lat - (row as f64 + 0.5) * self.dy,
        )
    }
}

/// Record of how a field was transformed onto the target grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Native cell size before resampling (dx, dy).
    pub native_resolution: (f64, f64),
    /// Native step length in native days.
    pub native_step_days: f64,
    /// Native calendar convention.
    pub native_calendar: Calendar,
    /// Spatial interpolation method applied.
    pub interpolation: InterpolationMethod,
    /// Ratio of native to target cell size (values above 1 mean the target
    /// is finer than the source).
    pub scale_factor: f64,
}

/// A field resampled and aligned onto a [`TargetGrid`].
///
/// After spatial resampling the time axis is still native; temporal alignment
/// replaces it with the target axis. [`AlignedField::is_aligned`] tells the
/// two states apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedField {
    pub model: ModelId,
    pub units: Units,
    /// The grid this field was aligned to.
    pub grid: TargetGrid,
    /// Remaining time axis; native until temporal alignment has run.
    pub axis: TimeAxis,
    /// Samples, time-major then row-major top-to-bottom.
    pub data: Vec<Sample>,
    pub provenance: Provenance,
}

impl AlignedField {
    /// Current shape: target spatial dimensions, current temporal length.
    pub fn shape(&self) -> GridShape {
        GridShape {
            ny: self.grid.ny(),
            nx: self.grid.nx(),
            nt: self.axis.len,
        }
    }

    /// True once the temporal dimension matches the target grid.
    pub fn is_aligned(&self) -> bool {
        self.axis.len == self.grid.step_bounds().len() && self.axis.calendar == Calendar::Gregorian
    }

    /// Sample at (time, row, col), or `None` when out of bounds.
    pub fn sample(&self, t: usize, row: usize, col: usize) -> Option<Sample> {
        let shape = self.shape();
        if t >= shape.nt || row >= shape.ny || col >= shape.nx {
            return None;
        }
        self.data.get(shape.flat_index(t, row, col)).copied()
    }

    /// Convert all samples to the given units in place.
    pub fn convert_units(&mut self, target: Units) {
        if self.units == target {
            return;
        }
        let from = self.units;
        for s in &mut self.data {
            *s = s.map(|v| from.convert(v, target));
        }
        self.units = target;
    }
}
