//! Configuration for the query orchestrator.

use alignment::AlignmentConfig;
use ensemble_stats::{BandConfig, StatsConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`crate::RegionTimeQuery`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Target grid cell size in degrees (square cells). 0.25 matches the
    /// native NEX-GDDP-CMIP6 grid.
    pub cell_size_deg: f64,

    /// Independent timeout per model fetch. A timed-out model is a per-model
    /// failure, not a query failure.
    pub fetch_timeout: Duration,

    /// Maximum number of model fetches in flight at once.
    pub parallel_fetches: usize,

    /// Capacity of the per-session response cache.
    pub cache_entries: usize,

    /// Time-to-live of cached responses.
    pub cache_ttl: Duration,

    pub alignment: AlignmentConfig,
    pub stats: StatsConfig,
    pub band: BandConfig,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            cell_size_deg: 0.25,
            fetch_timeout: Duration::from_secs(30),
            parallel_fetches: 4,
            cache_entries: 64,
            cache_ttl: Duration::from_secs(3600),
            alignment: AlignmentConfig::default(),
            stats: StatsConfig::default(),
            band: BandConfig::default(),
        }
    }
}

impl QueryConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("QUERY_CELL_SIZE_DEG") {
            if let Ok(size) = val.parse() {
                config.cell_size_deg = size;
            }
        }

        if let Ok(val) = std::env::var("QUERY_FETCH_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.fetch_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(val) = std::env::var("QUERY_PARALLEL_FETCHES") {
            if let Ok(n) = val.parse() {
                config.parallel_fetches = n;
            }
        }

        if let Ok(val) = std::env::var("QUERY_CACHE_ENTRIES") {
            if let Ok(n) = val.parse() {
                config.cache_entries = n;
            }
        }

        if let Ok(val) = std::env::var("QUERY_CACHE_TTL_SECS") {
            if let Ok(secs) = val.parse() {
                config.cache_ttl = Duration::from_secs(secs);
            }
        }

        config.alignment = AlignmentConfig::from_env();
        config.stats = StatsConfig::from_env();
        config.band = BandConfig::from_env();

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.cell_size_deg <= 0.0 {
            return Err("cell_size_deg must be > 0".to_string());
        }
        if self.fetch_timeout.is_zero() {
            return Err("fetch_timeout must be > 0".to_string());
        }
        if self.parallel_fetches == 0 {
            return Err("parallel_fetches must be > 0".to_string());
        }
        if self.cache_entries == 0 {
            return Err("cache_entries must be > 0".to_string());
        }
        self.alignment.validate()?;
        self.stats.validate()?;
        self.band.validate()?;
        Ok(())
    }
}
