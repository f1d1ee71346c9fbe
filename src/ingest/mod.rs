//! Conversion of caller-supplied, already-typed rows into engine series.
//!
//! - `load`: wide hourly load rows to one series per ERCOT region.
//! - `weather`: hourly zone weather readings to per-metric series and
//!   system-wide daily weather.

pub mod load;
pub mod weather;
