//! Configuration for the alignment passes.

use serde::{Deserialize, Serialize};

/// Configuration for spatial resampling behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// Maximum ratio of native to target cell size before resampling is
    /// refused. Upsampling a coarse source beyond this factor would be
    /// extrapolation, not interpolation.
    pub max_upscale_factor: f64,

    /// Ratio of native to target cell size above which bilinear interpolation
    /// is replaced by nearest-neighbor, so a coarse source does not fabricate
    /// spurious sub-cell precision.
    pub coarse_fallback_factor: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            max_upscale_factor: 4.0,
            coarse_fallback_factor: 2.0,
        }
    }
}

impl AlignmentConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("ALIGN_MAX_UPSCALE_FACTOR") {
            if let Ok(factor) = val.parse() {
                config.max_upscale_factor = factor;
            }
        }

        if let Ok(val) = std::env::var("ALIGN_COARSE_FALLBACK_FACTOR") {
            if let Ok(factor) = val.parse() {
                config.coarse_fallback_factor = factor;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_upscale_factor < 1.0 {
            return Err("max_upscale_factor must be >= 1".to_string());
        }
        if self.coarse_fallback_factor < 1.0 {
            return Err("coarse_fallback_factor must be >= 1".to_string());
        }
        if self.coarse_fallback_factor > self.max_upscale_factor {
            return Err("coarse_fallback_factor must not exceed max_upscale_factor".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = AlignmentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_upscale_factor, 4.0);
        assert_eq!(config.coarse_fallback_factor, 2.0);
    }

    #[test]
    fn test_validation_rejects_inverted_factors() {
        let config = AlignmentConfig {
            max_upscale_factor: 2.0,
            coarse_fallback_factor: 3.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_sub_unit_factor() {
        let config = AlignmentConfig {
            max_upscale_factor: 0.5,
            coarse_fallback_factor: 0.5,
        };
        assert!(config.validate().is_err());
    }
}
