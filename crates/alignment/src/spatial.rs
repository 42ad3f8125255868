//! Spatial resampling of native fields onto the target grid.

use crate::config::AlignmentConfig;
use crate::error::ResampleError;
use ensemble_common::{
    AlignedField, GriddedField, InterpolationMethod, Provenance, Sample, TargetGrid,
};
use tracing::debug;

/// Resample a native field's spatial grid onto the target grid.
///
/// The temporal dimension is untouched; every native time slice is
/// interpolated independently. Bilinear interpolation is the default; when
/// the native grid is coarser than the target cell by more than the
/// configured factor, nearest-neighbor is used instead. The method and scale
/// factor end up in the returned field's provenance.
pub fn resample(
    field: &GriddedField,
    target: &TargetGrid,
    config: &AlignmentConfig,
) -> Result<AlignedField, ResampleError> {
    if !field.bbox.contains_bbox(&target.bbox) {
        return Err(ResampleError::Coverage {
            model: field.model.clone(),
            target: target.bbox,
            native: field.bbox,
        });
    }

    // How much finer the target is than the source, on the worse axis.
    let scale_factor = (field.dx / target.dx).max(field.dy / target.dy);
    if scale_factor > config.max_upscale_factor {
        return Err(ResampleError::Resolution {
            model: field.model.clone(),
            factor: scale_factor,
            max: config.max_upscale_factor,
        });
    }

    let method = if scale_factor > config.coarse_fallback_factor {
        InterpolationMethod::Nearest
    } else {
        InterpolationMethod::Bilinear
    };

    let ny = target.ny();
    let nx = target.nx();
    let nt = field.axis.len;

    debug!(
        model = %field.model,
        method = %method,
        scale_factor,
        ny,
        nx,
        nt,
        "resampling field onto target grid"
    );

    let mut data = Vec::with_capacity(nt * ny * nx);
    for t in 0..nt {
        let slice = field.time_slice(t);
        for row in 0..ny {
            for col in 0..nx {
                let (lon, lat) = target.cell_center(row, col);
                // Fractional source cell-center coordinates.
                let fx = (lon - field.bbox.min_lon) / field.dx - 0.5;
                let fy = (field.bbox.max_lat - lat) / field.dy - 0.5;
                let value = match method {
                    InterpolationMethod::Bilinear => {
                        bilinear_interpolate(slice, field.nx, field.ny, fx, fy)
                    }
                    InterpolationMethod::Nearest => {
                        nearest_interpolate(slice, field.nx, field.ny, fx, fy)
                    }
                };
                data.push(value);
            }
        }
    }

    Ok(AlignedField {
        model: field.model.clone(),
        units: field.units,
        grid: target.clone(),
        axis: field.axis.clone(),
        data,
        provenance: Provenance {
            native_resolution: (field.dx, field.dy),
            native_step_days: field.axis.step_days,
            native_calendar: field.axis.calendar,
            interpolation: method,
            scale_factor,
        },
    })
}

/// Nearest-neighbor interpolation at fractional source coordinates.
///
/// Coordinates are clamped to the grid, so cell centers that sit in the
/// half-cell margin inside the source bbox still resolve.
pub fn nearest_interpolate(data: &[Sample], width: usize, height: usize, x: f64, y: f64) -> Sample {
    let col = (x.round().max(0.0) as usize).min(width - 1);
    let row = (y.round().max(0.0) as usize).min(height - 1);
    data[row * width + col]
}

/// Bilinear interpolation at fractional source coordinates.
///
/// If any of the four surrounding source cells is missing, the result is
/// missing; inventing data across a gap would corrupt downstream statistics.
pub fn bilinear_interpolate(data: &[Sample], width: usize, height: usize, x: f64, y: f64) -> Sample {
    let x = x.clamp(0.0, (width - 1) as f64);
    let y = y.clamp(0.0, (height - 1) as f64);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let xf = (x - x0 as f64) as f32;
    let yf = (y - y0 as f64) as f32;

    let corners = [
        data[y0 * width + x0],
        data[y0 * width + x1],
        data[y1 * width + x0],
        data[y1 * width + x1],
    ];
    let mut v = [0.0f32; 4];
    for (i, c) in corners.iter().enumerate() {
        match c.value() {
            Some(val) => v[i] = val,
            None => return Sample::Missing,
        }
    }

    let top = v[0] * (1.0 - xf) + v[1] * xf;
    let bottom = v[2] * (1.0 - xf) + v[3] * xf;
    Sample::Present(top * (1.0 - yf) + bottom * yf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensemble_common::{BoundingBox, TimeStep};
    use test_utils::{gradient_field, target_grid, utc};

    fn present(values: &[f32]) -> Vec<Sample> {
        values.iter().map(|&v| Sample::Present(v)).collect()
    }

    #[test]
    fn test_bilinear_corners_and_center() {
        let data = present(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(
            bilinear_interpolate(&data, 2, 2, 0.0, 0.0),
            Sample::Present(1.0)
        );
        assert_eq!(
            bilinear_interpolate(&data, 2, 2, 1.0, 1.0),
            Sample::Present(4.0)
        );
        let center = bilinear_interpolate(&data, 2, 2, 0.5, 0.5);
        assert!((center.value().unwrap() - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_bilinear_missing_corner_propagates() {
        let data = vec![
            Sample::Present(1.0),
            Sample::Missing,
            Sample::Present(3.0),
            Sample::Present(4.0),
        ];
        assert!(bilinear_interpolate(&data, 2, 2, 0.5, 0.5).is_missing());
        // Away from the gap the value is intact.
        assert_eq!(
            bilinear_interpolate(&data, 2, 2, 0.0, 1.0),
            Sample::Present(3.0)
        );
    }

    #[test]
    fn test_nearest_rounds_and_clamps() {
        let data = present(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(
            nearest_interpolate(&data, 2, 2, 0.4, 0.4),
            Sample::Present(1.0)
        );
        assert_eq!(
            nearest_interpolate(&data, 2, 2, 0.6, 0.6),
            Sample::Present(4.0)
        );
        assert_eq!(
            nearest_interpolate(&data, 2, 2, -0.4, 5.0),
            Sample::Present(3.0)
        );
    }

    #[test]
    fn test_resample_identity_on_matching_grid() {
        let grid = target_grid(
            BoundingBox::new(-100.0, 40.0, -98.0, 42.0),
            0.25,
            utc(2020, 1, 1),
            utc(2020, 2, 1),
            TimeStep::Monthly,
        );
        let field = gradient_field("A", grid.bbox, 0.25, 8, 8, 1);
        let aligned = resample(&field, &grid, &AlignmentConfig::default()).unwrap();

        assert_eq!(aligned.shape().ny, 8);
        assert_eq!(aligned.shape().nx, 8);
        for (got, want) in aligned.data.iter().zip(field.data.iter()) {
            let (g, w) = (got.value().unwrap(), want.value().unwrap());
            assert!((g - w).abs() < 1e-4, "identity resample changed {w} -> {g}");
        }
    }

    #[test]
    fn test_resample_coarse_source_falls_back_to_nearest() {
        let grid = target_grid(
            BoundingBox::new(-100.0, 40.0, -98.0, 42.0),
            0.25,
            utc(2020, 1, 1),
            utc(2020, 2, 1),
            TimeStep::Monthly,
        );
        // Native 1.0 degree vs target 0.25: factor 4, above the fallback
        // threshold but at the refusal limit.
        let field = gradient_field("A", BoundingBox::new(-102.0, 38.0, -96.0, 44.0), 1.0, 6, 6, 1);
        let aligned = resample(&field, &grid, &AlignmentConfig::default()).unwrap();
        assert_eq!(
            aligned.provenance.interpolation,
            InterpolationMethod::Nearest
        );
        assert!((aligned.provenance.scale_factor - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_resample_rejects_excessive_upscale() {
        let grid = target_grid(
            BoundingBox::new(-100.0, 40.0, -98.0, 42.0),
            0.1,
            utc(2020, 1, 1),
            utc(2020, 2, 1),
            TimeStep::Monthly,
        );
        let field = gradient_field("A", BoundingBox::new(-102.0, 38.0, -96.0, 44.0), 1.0, 6, 6, 1);
        match resample(&field, &grid, &AlignmentConfig::default()) {
            Err(ResampleError::Resolution { factor, .. }) => {
                assert!((factor - 10.0).abs() < 1e-9);
            }
            other => panic!("expected Resolution error, got {other:?}"),
        }
    }

    #[test]
    fn test_resample_rejects_uncovered_bbox() {
        let grid = target_grid(
            BoundingBox::new(-100.0, 40.0, -98.0, 42.0),
            0.25,
            utc(2020, 1, 1),
            utc(2020, 2, 1),
            TimeStep::Monthly,
        );
        // Native coverage stops east of the target box.
        let field = gradient_field("A", BoundingBox::new(-99.0, 38.0, -90.0, 44.0), 0.25, 24, 36, 1);
        assert!(matches!(
            resample(&field, &grid, &AlignmentConfig::default()),
            Err(ResampleError::Coverage { .. })
        ));
    }

    #[test]
    fn test_resample_downscale_uses_bilinear() {
        let grid = target_grid(
            BoundingBox::new(-100.0, 40.0, -98.0, 42.0),
            0.5,
            utc(2020, 1, 1),
            utc(2020, 2, 1),
            TimeStep::Monthly,
        );
        let field = gradient_field("A", BoundingBox::new(-101.0, 39.0, -97.0, 43.0), 0.25, 16, 16, 1);
        let aligned = resample(&field, &grid, &AlignmentConfig::default()).unwrap();
        assert_eq!(
            aligned.provenance.interpolation,
            InterpolationMethod::Bilinear
        );
        assert!(aligned.provenance.scale_factor < 1.0);
    }

    #[test]
    fn test_resample_range_unused() {
        // TimeRange on the grid is irrelevant to the spatial pass; three
        // native steps stay three steps.
        let grid = target_grid(
            BoundingBox::new(-100.0, 40.0, -98.0, 42.0),
            0.25,
            utc(2020, 1, 1),
            utc(2020, 4, 1),
            TimeStep::Monthly,
        );
        let field = gradient_field("A", grid.bbox, 0.25, 8, 8, 3);
        let aligned = resample(&field, &grid, &AlignmentConfig::default()).unwrap();
        assert_eq!(aligned.axis.len, 3);
        assert_eq!(aligned.data.len(), 3 * 8 * 8);
    }
}
