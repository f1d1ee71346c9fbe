//! Weather conditions on load-outlier days.
//!
//! Days whose average load lies beyond ±k standard deviations of their
//! period mean are grouped per (period, high/low), and the mean weather on
//! those days is reported alongside the day count.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::outliers::{label_outliers, Period};
use crate::analysis::stats::mean;
use crate::ingest::weather::DailyWeather;
use crate::model::{AnalyticsError, Classification, DailyAggregate, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierWeather {
    pub month_start: NaiveDate,
    pub outlier_group: Classification,
    pub num_days: usize,
    pub avg_temp_c: Option<f64>,
    pub avg_rh_pct: Option<f64>,
    pub avg_precip_mm: Option<f64>,
    pub avg_wind_kmh: Option<f64>,
    pub avg_pressure_hpa: Option<f64>,
    pub avg_cloud_cover_pct: Option<f64>,
}

/// Parameters echoed next to the rows so consumers can tell which `k`
/// produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierWeatherReport {
    pub data: Vec<OutlierWeather>,
    pub std_dev_threshold: f64,
    pub period: Period,
}

fn mean_of<F>(days: &[&DailyWeather], field: F) -> Option<f64>
where
    F: Fn(&DailyWeather) -> Option<f64>,
{
    let values: Vec<f64> = days.iter().filter_map(|d| field(*d)).collect();
    mean(&values)
}

/// Builds the outlier/weather profile for a daily average-load series.
///
/// `daily_load` must hold a single group (normally the `ERCOT` total), since
/// the weather records are system-wide and carry no zone; mixed groups are
/// an `InvalidParameter`.
///
/// Rows are ordered by period, with `High` before `Low`. Periods without
/// outliers produce no rows. Each weather mean is `None` when none of the
/// outlier days reported that metric.
pub fn outlier_weather_profile(
    daily_load: &[DailyAggregate],
    daily_weather: &[DailyWeather],
    period: Period,
    k: f64,
) -> Result<OutlierWeatherReport> {
    if let Some(first) = daily_load.first() {
        if let Some(other) = daily_load.iter().find(|d| d.group_key != first.group_key) {
            return Err(AnalyticsError::invalid(
                "daily_load",
                format!(
                    "outlier weather is profiled for one load series; got '{}' and '{}'",
                    first.group_key, other.group_key
                ),
            ));
        }
    }

    let labels = label_outliers(daily_load, period, k)?;
    let weather_by_day: BTreeMap<NaiveDate, &DailyWeather> =
        daily_weather.iter().map(|w| (w.day, w)).collect();

    let mut groups: BTreeMap<(NaiveDate, Classification), Vec<NaiveDate>> = BTreeMap::new();
    for label in labels
        .iter()
        .filter(|l| l.classification != Classification::None)
    {
        groups
            .entry((period.start_of(label.day), label.classification))
            .or_default()
            .push(label.day);
    }

    let data = groups
        .into_iter()
        .map(|((month_start, outlier_group), days)| {
            let weather: Vec<&DailyWeather> = days
                .iter()
                .filter_map(|d| weather_by_day.get(d).copied())
                .collect();
            OutlierWeather {
                month_start,
                outlier_group,
                num_days: days.len(),
                avg_temp_c: mean_of(&weather, |w| w.temp_c),
                avg_rh_pct: mean_of(&weather, |w| w.rh_pct),
                avg_precip_mm: mean_of(&weather, |w| w.precip_mm),
                avg_wind_kmh: mean_of(&weather, |w| w.wind_kmh),
                avg_pressure_hpa: mean_of(&weather, |w| w.pressure_hpa),
                avg_cloud_cover_pct: mean_of(&weather, |w| w.cloud_cover_pct),
            }
        })
        .collect();

    Ok(OutlierWeatherReport {
        data,
        std_dev_threshold: k,
        period,
    })
}
