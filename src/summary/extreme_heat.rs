//! Peak load on extreme-heat days.
//!
//! A zone's extreme-heat days are those whose daily maximum temperature is
//! at or above the zone's `p`-th percentile. For those days the median daily
//! peak load is reported.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::percentile::{classify_extreme, median, GroupBy};
use crate::logging::{log_run_summary, Component};
use crate::model::{DailyAggregate, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremeHeatLoad {
    pub zone_code: String,
    /// `None` when no extreme-heat day has load data.
    pub median_peak_load_mw: Option<f64>,
    pub num_extreme_heat_days: usize,
    pub threshold_percentile: f64,
    pub threshold_temp_f: f64,
}

/// One record per zone present in `max_temp_daily`, ordered by zone.
pub fn extreme_heat_load(
    max_temp_daily: &[DailyAggregate],
    peak_load_daily: &[DailyAggregate],
    p: f64,
) -> Result<Vec<ExtremeHeatLoad>> {
    let classification = classify_extreme(max_temp_daily, GroupBy::Key, p)?;
    let peak_load: BTreeMap<(&str, NaiveDate), f64> = peak_load_daily
        .iter()
        .map(|l| ((l.group_key.as_str(), l.day), l.value))
        .collect();

    let records: Vec<ExtremeHeatLoad> = classification
        .thresholds
        .iter()
        .map(|t| {
            let loads: Vec<f64> = classification
                .extreme_days
                .iter()
                .filter(|d| d.group_key == t.group_key)
                .filter_map(|d| peak_load.get(&(d.group_key.as_str(), d.day)).copied())
                .collect();
            ExtremeHeatLoad {
                zone_code: t.group_key.clone(),
                median_peak_load_mw: median(&loads),
                num_extreme_heat_days: t.n_extreme,
                threshold_percentile: t.percentile,
                threshold_temp_f: t.threshold,
            }
        })
        .collect();

    let with_load = records.iter().filter(|r| r.median_peak_load_mw.is_some()).count();
    log_run_summary(
        Component::Summary,
        records.len(),
        with_load,
        records.len() - with_load,
    );

    Ok(records)
}
