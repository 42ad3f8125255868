//! Ensemble statistics over aligned model fields.
//!
//! [`aggregate`] folds N aligned fields into per-cell, per-step summary
//! statistics; [`estimate`] derives an uncertainty band and model agreement
//! score from the aggregate. Both treat the ensemble as the full population
//! of sampled models, so spread uses the population standard deviation
//! (divide by N) and percentiles interpolate linearly between order
//! statistics.

pub mod aggregate;
pub mod error;
pub mod types;
pub mod uncertainty;

pub use aggregate::{aggregate, StatsConfig};
pub use error::EnsembleError;
pub use types::{EnsembleResult, ExcludedModel, UncertaintyBand};
pub use uncertainty::{estimate, BandConfig};
