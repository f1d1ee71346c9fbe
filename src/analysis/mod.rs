//! The analytical core: pure, synchronous computations over in-memory
//! series.
//!
//! Nothing in here performs I/O or keeps state between calls. Groups are
//! disjoint, so callers may run per-group work in parallel without locking.
//!
//! Submodules:
//! - `aggregate`: hourly series to daily/monthly values.
//! - `streaks`: consecutive-day runs over a threshold.
//! - `outliers`: mean ± k·σ labelling per period.
//! - `percentile`: continuous percentile thresholds and extreme days.
//! - `accuracy`: forecast error metrics.
//! - `stats`: shared mean / sample standard deviation helpers.

pub mod accuracy;
pub mod aggregate;
pub mod outliers;
pub mod percentile;
pub mod stats;
pub mod streaks;
