//! Temporal aggregation of hourly series into daily or monthly values.
//!
//! Every period key is derived from the UTC timestamp. Aggregates that will
//! later be joined (daily load against daily temperature, for instance) must
//! all come from this module so their day keys line up.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::logging::Component;
use crate::model::{AnalyticsError, DailyAggregate, ObservationSeries, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
}

impl Granularity {
    /// The period key a UTC calendar date falls into.
    pub fn period_of(self, day: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => day,
            Granularity::Month => day.with_day(1).unwrap_or(day),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    Mean,
    Sum,
    Max,
}

impl Reducer {
    /// Reduces a slice of values. Returns `None` for an empty slice.
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let reduced = match self {
            Reducer::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Reducer::Sum => values.iter().sum(),
            Reducer::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        };
        Some(reduced)
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Collapses hourly series into one value per (period, group).
///
/// `group_keys`, when given, restricts the output to those groups. A
/// restriction that matches nothing yields an empty vector rather than an
/// error; callers must handle absence explicitly.
///
/// Fails with `EmptyInput` when the supplied series contain no observations
/// at all, and with `InvalidParameter` when two series share a group key.
/// Output is sorted by `(group_key, day)`.
pub fn aggregate(
    series: &[ObservationSeries],
    granularity: Granularity,
    reducer: Reducer,
    group_keys: Option<&[&str]>,
) -> Result<Vec<DailyAggregate>> {
    if series.iter().all(|s| s.is_empty()) {
        return Err(AnalyticsError::EmptyInput(
            "no observations supplied to the aggregator".to_string(),
        ));
    }

    let mut seen = BTreeSet::new();
    if let Some(dup) = series.iter().find(|s| !seen.insert(s.group_key())) {
        return Err(AnalyticsError::invalid(
            "series",
            format!("more than one series for group '{}'", dup.group_key()),
        ));
    }

    let mut buckets: BTreeMap<(&str, NaiveDate), Vec<f64>> = BTreeMap::new();
    for s in series {
        if let Some(keys) = group_keys {
            if !keys.iter().any(|k| *k == s.group_key()) {
                continue;
            }
        }
        for obs in s.observations() {
            let period = granularity.period_of(obs.timestamp.date_naive());
            buckets
                .entry((s.group_key(), period))
                .or_default()
                .push(obs.value);
        }
    }

    let aggregates: Vec<DailyAggregate> = buckets
        .into_iter()
        .filter_map(|((group_key, day), values)| {
            reducer.apply(&values).map(|value| DailyAggregate {
                day,
                group_key: group_key.to_string(),
                value,
                count: values.len(),
            })
        })
        .collect();

    debug!(
        component = %Component::Aggregator,
        series = series.len(),
        rows = aggregates.len(),
        ?granularity,
        ?reducer,
        "aggregated hourly series"
    );

    Ok(aggregates)
}

/// Daily aggregation of a single series, the common case for the summaries.
pub fn daily(series: &ObservationSeries, reducer: Reducer) -> Result<Vec<DailyAggregate>> {
    aggregate(std::slice::from_ref(series), Granularity::Day, reducer, None)
}

/// Second pass over already-aggregated days: reduces the values of
/// `group_key` that fall inside `[start, end]` (inclusive).
///
/// Returns `None` when no day of that group falls inside the window.
pub fn aggregate_window(
    daily: &[DailyAggregate],
    group_key: &str,
    start: NaiveDate,
    end: NaiveDate,
    reducer: Reducer,
) -> Option<f64> {
    let values: Vec<f64> = daily
        .iter()
        .filter(|d| d.group_key == group_key && d.day >= start && d.day <= end)
        .map(|d| d.value)
        .collect();
    reducer.apply(&values)
}

/// Splits aggregate rows into per-group vectors, keyed and ordered by group.
pub fn partition_by_group(daily: &[DailyAggregate]) -> BTreeMap<String, Vec<DailyAggregate>> {
    let mut groups: BTreeMap<String, Vec<DailyAggregate>> = BTreeMap::new();
    for row in daily {
        groups.entry(row.group_key.clone()).or_default().push(row.clone());
    }
    groups
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Observation;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, day, hour, 0, 0).unwrap()
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn coast_series() -> ObservationSeries {
        ObservationSeries::new(
            "COAST",
            vec![
                Observation::new(at(1, 0), 10.0),
                Observation::new(at(1, 12), 20.0),
                Observation::new(at(1, 23), 30.0),
                Observation::new(at(2, 0), 5.0),
            ],
        )
        .unwrap()
    }

    // --- Reducers -----------------------------------------------------------

    #[test]
    fn test_daily_mean_groups_by_utc_date() {
        let rows = aggregate(&[coast_series()], Granularity::Day, Reducer::Mean, None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].day, date(7, 1));
        assert_eq!(rows[0].value, 20.0);
        assert_eq!(rows[0].count, 3);
        assert_eq!(rows[1].day, date(7, 2));
        assert_eq!(rows[1].value, 5.0);
    }

    #[test]
    fn test_daily_sum_and_max() {
        let sums = aggregate(&[coast_series()], Granularity::Day, Reducer::Sum, None).unwrap();
        assert_eq!(sums[0].value, 60.0);
        let maxes = aggregate(&[coast_series()], Granularity::Day, Reducer::Max, None).unwrap();
        assert_eq!(maxes[0].value, 30.0);
    }

    #[test]
    fn test_month_granularity_keys_on_first_of_month() {
        let rows = aggregate(&[coast_series()], Granularity::Month, Reducer::Max, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].day, date(7, 1));
        assert_eq!(rows[0].value, 30.0);
        assert_eq!(rows[0].count, 4);
    }

    #[test]
    fn test_offset_timestamps_truncate_in_utc() {
        // 2024-07-01T20:00-05:00 is 2024-07-02T01:00Z and belongs to July 2.
        let ts = DateTime::parse_from_rfc3339("2024-07-01T20:00:00-05:00")
            .unwrap()
            .with_timezone(&Utc);
        let series = ObservationSeries::new("EAST", vec![Observation::new(ts, 1.0)]).unwrap();
        let rows = daily(&series, Reducer::Mean).unwrap();
        assert_eq!(rows[0].day, date(7, 2));
    }

    // --- Grouping and restriction -------------------------------------------

    #[test]
    fn test_group_restriction_filters_series() {
        let east = ObservationSeries::new("EAST", vec![Observation::new(at(1, 0), 1.0)]).unwrap();
        let rows = aggregate(
            &[coast_series(), east],
            Granularity::Day,
            Reducer::Mean,
            Some(&["EAST"][..]),
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].group_key, "EAST");
    }

    #[test]
    fn test_restriction_matching_nothing_is_empty_not_error() {
        let rows = aggregate(
            &[coast_series()],
            Granularity::Day,
            Reducer::Mean,
            Some(&["WEST"][..]),
        )
        .expect("an empty group after filtering is not an error");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_output_sorted_by_group_then_day() {
        let west = ObservationSeries::new("WEST", vec![Observation::new(at(1, 0), 1.0)]).unwrap();
        let east = ObservationSeries::new("EAST", vec![Observation::new(at(2, 0), 1.0)]).unwrap();
        let rows = aggregate(&[west, east], Granularity::Day, Reducer::Sum, None).unwrap();
        let keys: Vec<_> = rows.iter().map(|r| r.group_key.as_str()).collect();
        assert_eq!(keys, vec!["EAST", "WEST"]);
    }

    #[test]
    fn test_two_series_with_same_group_rejected() {
        let result = aggregate(
            &[coast_series(), coast_series()],
            Granularity::Day,
            Reducer::Sum,
            None,
        );
        assert!(
            matches!(result, Err(AnalyticsError::InvalidParameter { .. })),
            "same hours under one key must not be summed twice: {:?}",
            result
        );
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let empty = ObservationSeries::new("COAST", Vec::new()).unwrap();
        let result = aggregate(&[empty], Granularity::Day, Reducer::Mean, None);
        assert!(matches!(result, Err(AnalyticsError::EmptyInput(_))));
        let result = aggregate(&[], Granularity::Day, Reducer::Mean, None);
        assert!(matches!(result, Err(AnalyticsError::EmptyInput(_))));
    }

    // --- Window pass --------------------------------------------------------

    #[test]
    fn test_aggregate_window_is_inclusive_and_group_scoped() {
        let daily = vec![
            DailyAggregate::new(date(7, 1), "COAST", 10.0),
            DailyAggregate::new(date(7, 2), "COAST", 20.0),
            DailyAggregate::new(date(7, 3), "COAST", 30.0),
            DailyAggregate::new(date(7, 2), "EAST", 999.0),
        ];
        let avg = aggregate_window(&daily, "COAST", date(7, 1), date(7, 2), Reducer::Mean);
        assert_eq!(avg, Some(15.0));
        let none = aggregate_window(&daily, "COAST", date(8, 1), date(8, 5), Reducer::Mean);
        assert_eq!(none, None);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let a = aggregate(&[coast_series()], Granularity::Day, Reducer::Mean, None).unwrap();
        let b = aggregate(&[coast_series()], Granularity::Day, Reducer::Mean, None).unwrap();
        assert_eq!(a, b);
    }
}
