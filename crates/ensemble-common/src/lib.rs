//! Shared types for the climate-ensemble workspace.
//!
//! Everything the pipeline crates exchange lives here: bounding boxes, the
//! canonical target grid, time axes and calendars, tagged sample values, and
//! field containers with their provenance.

pub mod bbox;
pub mod field;
pub mod grid;
pub mod model;
pub mod sample;
pub mod time;
pub mod units;

pub use bbox::BoundingBox;
pub use field::{AlignedField, GriddedField, InterpolationMethod, Provenance};
pub use grid::{GridShape, TargetGrid};
pub use model::{DatasetKind, ModelId, Scenario};
pub use sample::Sample;
pub use time::{Calendar, TimeAxis, TimeRange, TimeStep};
pub use units::Units;
