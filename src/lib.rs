//! Load and weather analytics for the ERCOT grid.
//!
//! Pure computations over hourly regional load and zone weather series:
//!
//! - `model`: shared types and the error enum.
//! - `regions`: static registry of ERCOT regions and weather zones.
//! - `ingest`: reshaping typed load and weather rows into series.
//! - `analysis`: aggregation, streaks, outliers, percentiles, accuracy.
//! - `summary`: report compositions built on `analysis`.
//! - `config`: TOML analysis parameters.
//! - `logging`: `tracing` subscriber setup and run summaries.

pub mod analysis;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod regions;
pub mod summary;

pub use model::{AnalyticsError, Result};
