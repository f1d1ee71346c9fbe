//! Percentile thresholds and extreme-day partitioning.
//!
//! Percentiles use linear interpolation between adjacent order statistics
//! (the continuous definition), not nearest rank.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::analysis::outliers::Period;
use crate::logging::Component;
use crate::model::{AnalyticsError, DailyAggregate, Result};

/// How days are grouped before a threshold is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    /// One threshold per group key.
    Key,
    /// One threshold per group key and calendar period.
    KeyAndPeriod(Period),
}

/// The cutoff computed for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupThreshold {
    pub group_key: String,
    /// Start of the period, when grouping by period.
    pub period: Option<NaiveDate>,
    pub percentile: f64,
    pub threshold: f64,
    pub n_days: usize,
    pub n_extreme: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremeClassification {
    pub thresholds: Vec<GroupThreshold>,
    /// Days at or above their group's threshold, ordered by group then day.
    pub extreme_days: Vec<DailyAggregate>,
}

fn check_percentile(p: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&p) {
        return Err(AnalyticsError::invalid(
            "p",
            format!("percentile must lie in [0, 100], got {}", p),
        ));
    }
    Ok(())
}

/// Continuous percentile of `values` (any order).
///
/// For sorted `v[0..n]` and `r = p/100 * (n-1)` the result is
/// `v[floor(r)] + (r - floor(r)) * (v[ceil(r)] - v[floor(r)])`.
pub fn percentile_cutoff(values: &[f64], p: f64) -> Result<f64> {
    check_percentile(p)?;
    if values.is_empty() {
        return Err(AnalyticsError::EmptyInput(
            "percentile of an empty set of values".to_string(),
        ));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(AnalyticsError::invalid("values", "must all be finite"));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    Ok(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

/// Interpolated median, or `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    percentile_cutoff(values, 50.0).ok()
}

/// Computes a `p`-th percentile threshold per group and collects the days
/// whose value is at or above it.
pub fn classify_extreme(
    daily_values: &[DailyAggregate],
    group_by: GroupBy,
    p: f64,
) -> Result<ExtremeClassification> {
    check_percentile(p)?;

    let mut groups: BTreeMap<(String, Option<NaiveDate>), Vec<&DailyAggregate>> = BTreeMap::new();
    for row in daily_values {
        let period = match group_by {
            GroupBy::Key => None,
            GroupBy::KeyAndPeriod(period) => Some(period.start_of(row.day)),
        };
        groups
            .entry((row.group_key.clone(), period))
            .or_default()
            .push(row);
    }

    let mut thresholds = Vec::with_capacity(groups.len());
    let mut extreme_days = Vec::new();
    for ((group_key, period), mut rows) in groups {
        let values: Vec<f64> = rows.iter().map(|r| r.value).collect();
        let threshold = percentile_cutoff(&values, p)?;

        rows.sort_by_key(|r| r.day);
        let before = extreme_days.len();
        extreme_days.extend(rows.into_iter().filter(|r| r.value >= threshold).cloned());

        thresholds.push(GroupThreshold {
            group_key,
            period,
            percentile: p,
            threshold,
            n_days: values.len(),
            n_extreme: extreme_days.len() - before,
        });
    }

    debug!(
        component = %Component::Percentile,
        groups = thresholds.len(),
        extreme_days = extreme_days.len(),
        p,
        "classified extreme days"
    );

    Ok(ExtremeClassification {
        thresholds,
        extreme_days,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
