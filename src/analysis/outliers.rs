//! Dispersion-based outlier labelling of daily aggregates.
//!
//! Each day is compared against the mean and sample standard deviation of
//! its own period (month or year) and group. Days further than `k` standard
//! deviations from the mean are labelled `High` or `Low`.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::stats::{mean, sample_stddev};
use crate::logging::Component;
use crate::model::{
    AnalyticsError, Classification, DailyAggregate, MonthlyStats, OutlierLabel, Result,
};

/// Calendar period used to group days before computing dispersion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Month,
    Year,
}

impl Period {
    /// First day of the period containing `day`.
    pub fn start_of(self, day: NaiveDate) -> NaiveDate {
        let start = match self {
            Period::Month => NaiveDate::from_ymd_opt(day.year(), day.month(), 1),
            Period::Year => NaiveDate::from_ymd_opt(day.year(), 1, 1),
        };
        start.unwrap_or(day)
    }
}

fn group_by_period(
    daily_values: &[DailyAggregate],
    period: Period,
) -> BTreeMap<(String, NaiveDate), Vec<&DailyAggregate>> {
    let mut groups: BTreeMap<(String, NaiveDate), Vec<&DailyAggregate>> = BTreeMap::new();
    for row in daily_values {
        groups
            .entry((row.group_key.clone(), period.start_of(row.day)))
            .or_default()
            .push(row);
    }
    groups
}

/// Mean and sample standard deviation per (period, group), ordered by
/// group then period.
///
/// Periods with a single day get `sample_stddev = None`.
pub fn period_stats(daily_values: &[DailyAggregate], period: Period) -> Vec<MonthlyStats> {
    group_by_period(daily_values, period)
        .into_iter()
        .filter_map(|((group_key, month), rows)| {
            let values: Vec<f64> = rows.iter().map(|r| r.value).collect();
            let mu = mean(&values)?;
            Some(MonthlyStats {
                month,
                group_key,
                n: values.len(),
                mean: mu,
                sample_stddev: sample_stddev(&values).ok(),
            })
        })
        .collect()
}

/// Classifies one value against its period statistics.
///
/// An undefined or zero standard deviation never produces an outlier.
pub fn classify(value: f64, stats: &MonthlyStats, k: f64) -> Classification {
    let sigma = match stats.sample_stddev {
        Some(s) if s > 0.0 => s,
        _ => return Classification::None,
    };
    if value > stats.mean + k * sigma {
        Classification::High
    } else if value < stats.mean - k * sigma {
        Classification::Low
    } else {
        Classification::None
    }
}

/// Labels every day as `High`, `Low` or `None` relative to its period and
/// group, ordered by `(group_key, day)`.
///
/// `k` must be finite. A `k <= 0` is accepted but turns every value that
/// differs from the mean into an outlier; callers should reject it.
pub fn label_outliers(
    daily_values: &[DailyAggregate],
    period: Period,
    k: f64,
) -> Result<Vec<OutlierLabel>> {
    if !k.is_finite() {
        return Err(AnalyticsError::invalid("k", format!("must be finite, got {}", k)));
    }
    if k <= 0.0 {
        warn!(
            component = %Component::Outliers,
            k,
            "non-positive k labels every non-mean value as an outlier"
        );
    }

    let mut labels = Vec::with_capacity(daily_values.len());
    for stats in period_stats(daily_values, period) {
        for row in daily_values
            .iter()
            .filter(|r| r.group_key == stats.group_key && period.start_of(r.day) == stats.month)
        {
            labels.push(OutlierLabel {
                day: row.day,
                group_key: row.group_key.clone(),
                value: row.value,
                classification: classify(row.value, &stats, k),
            });
        }
    }
    labels.sort_by(|a, b| (&a.group_key, a.day).cmp(&(&b.group_key, b.day)));

    debug!(
        component = %Component::Outliers,
        days = labels.len(),
        high = labels.iter().filter(|l| l.classification == Classification::High).count(),
        low = labels.iter().filter(|l| l.classification == Classification::Low).count(),
        "labelled outliers"
    );

    Ok(labels)
}

/// Convenience filter dropping the `None` labels before reporting.
pub fn outliers_only(labels: Vec<OutlierLabel>) -> Vec<OutlierLabel> {
    labels
        .into_iter()
        .filter(|l| l.classification != Classification::None)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
