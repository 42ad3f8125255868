//! Synthetic field generators for the test suite.
//!
//! Generators build predictable, verifiable fields so tests can assert exact
//! values after resampling, alignment, and aggregation.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use ensemble_common::{
    AlignedField, BoundingBox, Calendar, DatasetKind, GriddedField, InterpolationMethod, ModelId,
    Provenance, Sample, Scenario, TargetGrid, TimeAxis, TimeRange, TimeStep, Units,
};

/// Midnight UTC on the given date.
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// Square-celled target grid over `bbox` and `[start, end)`.
pub fn target_grid(
    bbox: BoundingBox,
    cell: f64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: TimeStep,
) -> TargetGrid {
    TargetGrid::new(bbox, cell, cell, TimeRange::new(start, end), step)
}

/// Build a field cell by cell from a closure over (time, row, col).
///
/// This is the general generator; the others wrap it. The field is tagged as
/// an SSP5-8.5 projection in Kelvin, which is what most tests want.
pub fn field_from_fn(
    model: &str,
    bbox: BoundingBox,
    cell: f64,
    ny: usize,
    nx: usize,
    axis: TimeAxis,
    f: impl Fn(usize, usize, usize) -> Sample,
) -> GriddedField {
    let mut data = Vec::with_capacity(axis.len * ny * nx);
    for t in 0..axis.len {
        for row in 0..ny {
            for col in 0..nx {
                data.push(f(t, row, col));
            }
        }
    }
    GriddedField {
        model: ModelId::from(model),
        kind: DatasetKind::Projection,
        scenario: Some(Scenario::Ssp585),
        units: Units::Kelvin,
        bbox,
        dx: cell,
        dy: cell,
        ny,
        nx,
        axis,
        data,
    }
}

/// Field with value `col * 1000 + row + t / 10` at every cell, on a daily
/// Gregorian axis starting 2020-01-01.
///
/// The spatial gradient makes interpolation errors visible; checking
/// `grid[row][col] == col * 1000 + row` verifies data ordering.
pub fn gradient_field(
    model: &str,
    bbox: BoundingBox,
    cell: f64,
    ny: usize,
    nx: usize,
    nt: usize,
) -> GriddedField {
    let axis = TimeAxis::new(Calendar::Gregorian, 2020, 0.0, 1.0, nt);
    field_from_fn(model, bbox, cell, ny, nx, axis, |t, row, col| {
        Sample::Present((col * 1000 + row) as f32 + t as f32 / 10.0)
    })
}

/// Field filled with a constant value on the given axis.
pub fn constant_field(
    model: &str,
    bbox: BoundingBox,
    cell: f64,
    ny: usize,
    nx: usize,
    axis: TimeAxis,
    value: f32,
) -> GriddedField {
    field_from_fn(model, bbox, cell, ny, nx, axis, |_, _, _| {
        Sample::Present(value)
    })
}

/// Build an already-aligned field directly on the target grid, bypassing the
/// alignment passes. Handy for aggregation tests that want exact member
/// values per cell.
pub fn aligned_field_from_fn(
    model: &str,
    grid: &TargetGrid,
    f: impl Fn(usize, usize, usize) -> Sample,
) -> AlignedField {
    let shape = grid.shape();
    let mut data = Vec::with_capacity(shape.len());
    for t in 0..shape.nt {
        for row in 0..shape.ny {
            for col in 0..shape.nx {
                data.push(f(t, row, col));
            }
        }
    }
    let jan1 = Utc
        .with_ymd_and_hms(grid.range.start.year(), 1, 1, 0, 0, 0)
        .unwrap();
    let start_doy = (grid.range.start - jan1).num_seconds() as f64 / 86_400.0;
    let total_days = (grid.range.end - grid.range.start).num_seconds() as f64 / 86_400.0;
    let axis = TimeAxis::new(
        Calendar::Gregorian,
        grid.range.start.year(),
        start_doy,
        total_days / shape.nt.max(1) as f64,
        shape.nt,
    );
    AlignedField {
        model: ModelId::from(model),
        units: Units::Kelvin,
        grid: grid.clone(),
        axis,
        data,
        provenance: Provenance {
            native_resolution: (grid.dx, grid.dy),
            native_step_days: 1.0,
            native_calendar: Calendar::Gregorian,
            interpolation: InterpolationMethod::Bilinear,
            scale_factor: 1.0,
        },
    }
}
