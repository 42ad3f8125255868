//! Shared test utilities for the climate-ensemble workspace.

pub mod generators;

pub use generators::{
    aligned_field_from_fn, constant_field, field_from_fn, gradient_field, target_grid, utc,
};
