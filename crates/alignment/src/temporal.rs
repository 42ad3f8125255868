//! Temporal alignment of resampled fields onto the target time axis.

use crate::calendar;
use crate::error::AlignError;
use chrono::{Datelike, TimeZone, Utc};
use ensemble_common::{AlignedField, Calendar, Sample, TargetGrid, TimeAxis, TimeStep};
use tracing::debug;

/// Map a spatially resampled field's native time axis onto the target axis.
///
/// Each native step is placed on the UTC timeline through the calendar
/// mapping in [`crate::calendar`], then every target step takes the mean of
/// all native steps overlapping it. That single rule covers both directions:
/// a native step coarser than the target is broadcast across every target
/// step it spans, and finer native steps are averaged within each target
/// step. Missing samples are skipped per cell; a cell with no present
/// contributor stays missing.
pub fn align(field: AlignedField, target: &TargetGrid) -> Result<AlignedField, AlignError> {
    let bounds = target.step_bounds();
    let nt_native = field.axis.len;

    // Native step edges on the UTC timeline, including the exclusive end.
    let edges: Vec<_> = (0..=nt_native)
        .map(|k| calendar::step_start_utc(&field.axis, k))
        .collect();
    let native_start = edges[0];
    let native_end = edges[nt_native];

    if native_start > target.range.start || native_end < target.range.end {
        return Err(AlignError::TemporalRange {
            model: field.model.clone(),
            native_start,
            native_end,
            requested: target.range,
        });
    }

    let cells = field.grid.ny() * field.grid.nx();
    debug!(
        model = %field.model,
        native_steps = nt_native,
        target_steps = bounds.len(),
        calendar = ?field.axis.calendar,
        "aligning time axis"
    );

    let mut data = vec![Sample::Missing; bounds.len() * cells];
    for (i, (step_start, step_end)) in bounds.iter().enumerate() {
        let contributors: Vec<usize> = (0..nt_native)
            .filter(|&k| edges[k] < *step_end && edges[k + 1] > *step_start)
            .collect();

        for cell in 0..cells {
            let mut sum = 0.0f64;
            let mut n = 0u32;
            for &k in &contributors {
                if let Some(v) = field.data[k * cells + cell].value() {
                    sum += v as f64;
                    n += 1;
                }
            }
            if n > 0 {
                data[i * cells + cell] = Sample::Present((sum / n as f64) as f32);
            }
        }
    }

    let axis = target_axis(target, bounds.len());
    Ok(AlignedField { axis, data, ..field })
}

/// Nominal Gregorian axis describing the target steps.
///
/// Step boundaries are authoritative on [`TargetGrid::step_bounds`]; the axis
/// here carries a mean step length so downstream provenance stays meaningful
/// for variable-length monthly steps.
fn target_axis(target: &TargetGrid, len: usize) -> TimeAxis {
    let year = target.range.start.year();
    let jan1 = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap();
    let start_doy = (target.range.start - jan1).num_seconds() as f64 / 86_400.0;
    let step_days = match target.step {
        TimeStep::Daily => 1.0,
        TimeStep::Monthly => {
            let total = (target.range.end - target.range.start).num_seconds() as f64 / 86_400.0;
            total / len.max(1) as f64
        }
    };
    TimeAxis::new(Calendar::Gregorian, year, start_doy, step_days, len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlignmentConfig;
    use crate::spatial::resample;
    use ensemble_common::{BoundingBox, TimeStep};
    use test_utils::{field_from_fn, target_grid, utc};

    const BBOX: BoundingBox = BoundingBox {
        min_lon: -100.0,
        min_lat: 40.0,
        max_lon: -98.0,
        max_lat: 42.0,
    };

    fn monthly_grid(months: u32) -> TargetGrid {
        target_grid(
            BBOX,
            0.25,
            utc(2021, 1, 1),
            utc(2021, 1 + months - 1, 1) + chrono::Duration::days(31),
            TimeStep::Monthly,
        )
    }

    fn spatially_resampled(field: ensemble_common::GriddedField, grid: &TargetGrid) -> AlignedField {
        resample(&field, grid, &AlignmentConfig::default()).unwrap()
    }

    #[test]
    fn test_daily_to_monthly_averages() {
        let grid = target_grid(BBOX, 0.25, utc(2021, 1, 1), utc(2021, 3, 1), TimeStep::Monthly);
        // Daily native record, value = day index everywhere.
        let axis = TimeAxis::new(Calendar::Gregorian, 2021, 0.0, 1.0, 59);
        let field = field_from_fn("A", BBOX, 0.25, 8, 8, axis, |t, _, _| {
            Sample::Present(t as f32)
        });
        let aligned = align(spatially_resampled(field, &grid), &grid).unwrap();

        assert!(aligned.is_aligned());
        assert_eq!(aligned.shape().nt, 2);
        // January: mean of day indices 0..=30 = 15.
        assert!((aligned.sample(0, 0, 0).unwrap().value().unwrap() - 15.0).abs() < 1e-4);
        // February: mean of 31..=58 = 44.5.
        assert!((aligned.sample(1, 3, 3).unwrap().value().unwrap() - 44.5).abs() < 1e-4);
    }

    #[test]
    fn test_day360_monthly_to_gregorian_monthly() {
        let grid = target_grid(BBOX, 0.25, utc(2021, 1, 1), utc(2021, 4, 1), TimeStep::Monthly);
        // 360-day calendar, twelve 30-day steps, value = step index.
        let axis = TimeAxis::new(Calendar::Day360, 2021, 0.0, 30.0, 12);
        let field = field_from_fn("B", BBOX, 0.25, 8, 8, axis, |t, _, _| {
            Sample::Present(t as f32)
        });
        let aligned = align(spatially_resampled(field, &grid), &grid).unwrap();

        assert_eq!(aligned.shape().nt, 3);
        // February [day 31, 59) sits entirely inside the stretched native
        // step 1 [30.4, 60.8): pure broadcast.
        assert!((aligned.sample(1, 0, 0).unwrap().value().unwrap() - 1.0).abs() < 1e-4);
        // March [59, 90) straddles native steps 1 and 2: their mean.
        assert!((aligned.sample(2, 0, 0).unwrap().value().unwrap() - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_missing_contributors_skipped_per_cell() {
        let grid = target_grid(BBOX, 0.25, utc(2021, 1, 1), utc(2021, 2, 1), TimeStep::Monthly);
        let axis = TimeAxis::new(Calendar::Gregorian, 2021, 0.0, 1.0, 31);
        // Cell (0,0) is missing on even days; everywhere else present.
        let field = field_from_fn("C", BBOX, 0.25, 8, 8, axis, |t, row, col| {
            if row == 0 && col == 0 && t % 2 == 0 {
                Sample::Missing
            } else {
                Sample::Present(t as f32)
            }
        });
        let aligned = align(spatially_resampled(field, &grid), &grid).unwrap();

        // Odd days 1..=29: mean = 15.
        assert!((aligned.sample(0, 0, 0).unwrap().value().unwrap() - 15.0).abs() < 1e-4);
        // A fully present cell sees all 31 days: mean = 15.
        assert!((aligned.sample(0, 4, 4).unwrap().value().unwrap() - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_fully_missing_cell_stays_missing() {
        let grid = target_grid(BBOX, 0.25, utc(2021, 1, 1), utc(2021, 2, 1), TimeStep::Monthly);
        let axis = TimeAxis::new(Calendar::Gregorian, 2021, 0.0, 1.0, 31);
        let field = field_from_fn("C", BBOX, 0.25, 8, 8, axis, |_, row, col| {
            if row == 7 && col == 7 {
                Sample::Missing
            } else {
                Sample::Present(1.0)
            }
        });
        let aligned = align(spatially_resampled(field, &grid), &grid).unwrap();
        assert!(aligned.sample(0, 7, 7).unwrap().is_missing());
        assert!(!aligned.sample(0, 0, 0).unwrap().is_missing());
    }

    #[test]
    fn test_uncovered_range_rejected() {
        let grid = monthly_grid(12);
        // Native record covers only the first half of the year.
        let axis = TimeAxis::new(Calendar::Gregorian, 2021, 0.0, 1.0, 180);
        let field = field_from_fn("D", BBOX, 0.25, 8, 8, axis, |_, _, _| {
            Sample::Present(0.0)
        });
        match align(spatially_resampled(field, &grid), &grid) {
            Err(AlignError::TemporalRange { model, .. }) => {
                assert_eq!(model.as_str(), "D");
            }
            other => panic!("expected TemporalRange error, got {other:?}"),
        }
    }

    #[test]
    fn test_align_idempotent_on_daily_axis() {
        let grid = target_grid(BBOX, 0.25, utc(2021, 1, 1), utc(2021, 1, 11), TimeStep::Daily);
        let axis = TimeAxis::new(Calendar::Gregorian, 2021, 0.0, 1.0, 10);
        let field = field_from_fn("E", BBOX, 0.25, 8, 8, axis, |t, row, col| {
            Sample::Present((t * 100 + row * 10 + col) as f32)
        });
        let once = align(spatially_resampled(field, &grid), &grid).unwrap();
        let twice = align(once.clone(), &grid).unwrap();
        assert_eq!(once.data, twice.data);
        assert!(twice.is_aligned());
    }
}
