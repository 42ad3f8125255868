//! Uncertainty bands and model agreement.

use crate::aggregate::percentile;
use crate::types::{EnsembleResult, UncertaintyBand};
use ensemble_common::Sample;
use serde::{Deserialize, Serialize};

/// Configuration for the uncertainty band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandConfig {
    /// Percentile level of the lower bound.
    pub lower_percentile: f64,
    /// Percentile level of the upper bound.
    pub upper_percentile: f64,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            lower_percentile: 10.0,
            upper_percentile: 90.0,
        }
    }
}

impl BandConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("BAND_LOWER_PERCENTILE") {
            if let Ok(level) = val.parse() {
                config.lower_percentile = level;
            }
        }

        if let Ok(val) = std::env::var("BAND_UPPER_PERCENTILE") {
            if let Ok(level) = val.parse() {
                config.upper_percentile = level;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.lower_percentile)
            || !(0.0..=100.0).contains(&self.upper_percentile)
        {
            return Err("band percentiles must lie in [0, 100]".to_string());
        }
        if self.lower_percentile >= self.upper_percentile {
            return Err("lower band percentile must be below the upper".to_string());
        }
        Ok(())
    }
}

/// Derive an uncertainty band and agreement score from an ensemble result.
///
/// Bounds are computed from the retained member values, so the configured
/// percentile pair need not be among the levels the aggregator produced. The
/// agreement score is the fraction of contributing models within one
/// population standard deviation of the mean; where nothing contributed it
/// stays missing rather than being coerced to zero.
pub fn estimate(result: &EnsembleResult, config: &BandConfig) -> UncertaintyBand {
    let len = result.shape.len();
    let mut lower = Vec::with_capacity(len);
    let mut upper = Vec::with_capacity(len);
    let mut agreement = Vec::with_capacity(len);

    for idx in 0..len {
        let mut values: Vec<f32> = result
            .member_values
            .iter()
            .filter_map(|plane| plane[idx].value())
            .collect();

        if values.is_empty() {
            lower.push(Sample::Missing);
            upper.push(Sample::Missing);
            agreement.push(Sample::Missing);
            continue;
        }

        values.sort_by(|a, b| a.total_cmp(b));
        lower.push(Sample::Present(percentile(&values, config.lower_percentile)));
        upper.push(Sample::Present(percentile(&values, config.upper_percentile)));

        // mean/stddev are Present wherever count > 0.
        let mean = result.mean[idx].value().unwrap_or(0.0);
        let sd = result.stddev[idx].value().unwrap_or(0.0);
        let within = values.iter().filter(|&&v| (v - mean).abs() <= sd).count();
        agreement.push(Sample::Present(within as f32 / values.len() as f32));
    }

    UncertaintyBand {
        lower_level: config.lower_percentile,
        upper_level: config.upper_percentile,
        shape: result.shape,
        lower,
        upper,
        agreement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, StatsConfig};
    use ensemble_common::{BoundingBox, TimeStep};
    use test_utils::{aligned_field_from_fn, target_grid, utc};

    fn grid() -> ensemble_common::TargetGrid {
        target_grid(
            BoundingBox::new(-100.0, 40.0, -98.0, 42.0),
            0.5,
            utc(2020, 1, 1),
            utc(2020, 2, 1),
            TimeStep::Monthly,
        )
    }

    #[test]
    fn test_identical_members_full_agreement() {
        let g = grid();
        let fields: Vec<_> = (0..3)
            .map(|i| aligned_field_from_fn(&format!("M{i}"), &g, |_, _, _| Sample::Present(280.0)))
            .collect();
        let result = aggregate(fields, &StatsConfig::default()).unwrap();
        let band = estimate(&result, &BandConfig::default());

        for idx in 0..result.shape.len() {
            assert_eq!(band.agreement[idx], Sample::Present(1.0));
            assert_eq!(band.lower[idx], Sample::Present(280.0));
            assert_eq!(band.upper[idx], Sample::Present(280.0));
        }
    }

    #[test]
    fn test_band_bounds_ordered() {
        let g = grid();
        let fields: Vec<_> = (0..5)
            .map(|i| {
                aligned_field_from_fn(&format!("M{i}"), &g, move |_, row, col| {
                    Sample::Present((i * 3 + row + col) as f32)
                })
            })
            .collect();
        let result = aggregate(fields, &StatsConfig::default()).unwrap();
        let band = estimate(&result, &BandConfig::default());

        for idx in 0..result.shape.len() {
            assert!(band.lower[idx].value().unwrap() <= band.upper[idx].value().unwrap());
        }
    }

    #[test]
    fn test_agreement_counts_outliers() {
        let g = grid();
        // Four clustered members and one far outlier.
        let values = [10.0f32, 10.5, 9.5, 10.0, 100.0];
        let fields: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                aligned_field_from_fn(&format!("M{i}"), &g, move |_, _, _| Sample::Present(v))
            })
            .collect();
        let result = aggregate(fields, &StatsConfig::default()).unwrap();
        let band = estimate(&result, &BandConfig::default());

        // Mean = 28, sd ~ 36: the cluster sits within one sd, the outlier
        // marginally outside.
        let a = band.agreement[0].value().unwrap();
        assert!((a - 0.8).abs() < 1e-6, "agreement was {a}");
    }

    #[test]
    fn test_no_data_cell_agreement_missing() {
        let g = grid();
        let fields: Vec<_> = (0..2)
            .map(|i| {
                aligned_field_from_fn(&format!("M{i}"), &g, |_, row, col| {
                    if row == 0 && col == 0 {
                        Sample::Missing
                    } else {
                        Sample::Present(5.0)
                    }
                })
            })
            .collect();
        let result = aggregate(fields, &StatsConfig::default()).unwrap();
        let band = estimate(&result, &BandConfig::default());

        let gap = result.shape.flat_index(0, 0, 0);
        assert!(band.agreement[gap].is_missing());
        assert!(band.lower[gap].is_missing());
        assert!(band.upper[gap].is_missing());
    }

    #[test]
    fn test_band_config_validation() {
        assert!(BandConfig::default().validate().is_ok());
        assert!(BandConfig {
            lower_percentile: 90.0,
            upper_percentile: 10.0
        }
        .validate()
        .is_err());
        assert!(BandConfig {
            lower_percentile: -1.0,
            upper_percentile: 90.0
        }
        .validate()
        .is_err());
    }
}
