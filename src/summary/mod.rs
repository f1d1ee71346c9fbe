//! Report-level compositions of the analysis components.
//!
//! Each function here combines the aggregator, streak, outlier and
//! percentile components the way one of the service's reports needs them.
//! They stay pure: rows in, records out.
//!
//! - `heatwaves`: hot-day streaks with average peak load.
//! - `extreme_heat`: percentile heat threshold and median peak load.
//! - `outlier_weather`: weather on high/low load-outlier days.
//! - `precipitation`: rainy-day versus dry-day load.

use chrono::NaiveDate;

use crate::model::DailyAggregate;

pub mod extreme_heat;
pub mod heatwaves;
pub mod outlier_weather;
pub mod precipitation;

/// Keeps the days inside `[start, end]`; either bound may be open.
pub fn restrict_days(
    daily: &[DailyAggregate],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<DailyAggregate> {
    daily
        .iter()
        .filter(|d| start.is_none_or(|s| d.day >= s) && end.is_none_or(|e| d.day <= e))
        .cloned()
        .collect()
}
