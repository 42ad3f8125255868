//! Region/time query orchestration.
//!
//! This is the public entry point of the computational core. Given a spatial
//! bound, a time range, and a set of model ids, [`RegionTimeQuery::run`]
//! fetches each model's native field concurrently, resamples and aligns it
//! onto the target grid, folds the survivors into ensemble statistics with
//! an uncertainty band, and caches the response per session.
//!
//! # Partial failure
//!
//! A model that fails to fetch, resample, or align is dropped from the
//! ensemble and recorded in the response's excluded-model list; the query
//! itself only fails when no model survives.
//!
//! ```text
//! QueryRequest
//!      |
//!      +--> per-model task (bounded, timed out, abort-on-drop)
//!      |        fetch -> resample -> align
//!      |
//!      +--> barrier: collect survivors + exclusions
//!               |
//!               aggregate -> estimate -> QueryResponse
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod query;
pub mod request;

pub use cache::{CacheStats, SessionCache};
pub use config::QueryConfig;
pub use error::QueryError;
pub use export::{to_rows, ExportRow};
pub use query::RegionTimeQuery;
pub use request::{QueryRequest, QueryResponse, QuerySummary};
