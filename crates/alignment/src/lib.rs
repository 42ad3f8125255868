//! Alignment of heterogeneous model grids onto the canonical target grid.
//!
//! Two passes, in order:
//!
//! 1. [`spatial::resample`] reprojects a native field's lat/lon grid onto the
//!    target cell layout (bilinear, with a nearest-neighbor fallback for
//!    coarse sources).
//! 2. [`temporal::align`] maps the native calendar/time-step convention onto
//!    the target time axis (360-day and no-leap calendars included).
//!
//! Both passes record what they did in the field's provenance.

pub mod calendar;
pub mod config;
pub mod error;
pub mod spatial;
pub mod temporal;

pub use config::AlignmentConfig;
pub use error::{AlignError, ResampleError};
pub use spatial::resample;
pub use temporal::align;
