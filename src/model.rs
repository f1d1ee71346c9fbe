//! Core data types for the ERCOT load and weather analytics engine.
//!
//! This module defines the shared domain model imported by all other modules.
//! It contains no analysis logic and performs no I/O, only types, their
//! construction-time invariants, and the error enum every computation returns.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Observation types
// ---------------------------------------------------------------------------

/// A single hourly measurement, e.g. one `hour_end` load reading in MW or
/// one zone temperature reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Ordered hourly readings of one measured quantity for one group
/// (an ERCOT region, a weather zone, ...).
///
/// Timestamps are strictly increasing and every value is finite. Both are
/// checked once in [`ObservationSeries::new`]; the series is immutable after
/// that.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationSeries {
    group_key: String,
    observations: Vec<Observation>,
}

impl ObservationSeries {
    pub fn new(group_key: impl Into<String>, observations: Vec<Observation>) -> Result<Self> {
        let group_key = group_key.into();

        if let Some(bad) = observations.iter().find(|o| !o.value.is_finite()) {
            return Err(AnalyticsError::invalid(
                "observations",
                format!("non-finite value at {} for '{}'", bad.timestamp, group_key),
            ));
        }

        if let Some(pair) = observations
            .windows(2)
            .find(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(AnalyticsError::invalid(
                "observations",
                format!(
                    "timestamps must be strictly increasing for '{}' ({} followed by {})",
                    group_key, pair[0].timestamp, pair[1].timestamp
                ),
            ));
        }

        Ok(Self {
            group_key,
            observations,
        })
    }

    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// One reduced value per (period, group).
///
/// At day granularity `day` is the UTC calendar date; at month granularity
/// it is the first day of the UTC month. `count` is the number of hourly
/// observations that were reduced into `value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAggregate {
    pub day: NaiveDate,
    pub group_key: String,
    pub value: f64,
    pub count: usize,
}

impl DailyAggregate {
    pub fn new(day: NaiveDate, group_key: impl Into<String>, value: f64) -> Self {
        Self {
            day,
            group_key: group_key.into(),
            value,
            count: 1,
        }
    }
}

/// Month-granularity aggregates share the daily record shape.
pub type MonthlyAggregate = DailyAggregate;

/// Mean and sample standard deviation of the daily values in one period
/// of one group.
///
/// `sample_stddev` uses Bessel's correction and is `None` when fewer than
/// two days fall in the period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStats {
    pub month: NaiveDate,
    pub group_key: String,
    pub n: usize,
    pub mean: f64,
    pub sample_stddev: Option<f64>,
}

// ---------------------------------------------------------------------------
// Derived records
// ---------------------------------------------------------------------------

/// A maximal run of consecutive calendar days satisfying a predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Streak {
    pub group_key: String,
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
    pub length: usize,
    /// Maximum daily value observed inside the run.
    pub peak_value: f64,
    /// Secondary metric aggregated over `[start_day, end_day]`, if attached.
    pub aux_value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    High,
    Low,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierLabel {
    pub day: NaiveDate,
    pub group_key: String,
    pub value: f64,
    pub classification: Classification,
}

/// One timestamp of a forecast comparison. Either side may be missing when
/// the other series has no reading at that hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPair {
    pub timestamp: DateTime<Utc>,
    pub group_key: String,
    pub actual: Option<f64>,
    pub expected: Option<f64>,
}

impl ForecastPair {
    /// Both values, when both are present.
    pub fn complete(&self) -> Option<(f64, f64)> {
        match (self.actual, self.expected) {
            (Some(a), Some(e)) => Some((a, e)),
            _ => None,
        }
    }
}

/// Forecast accuracy for one group.
///
/// `mape_pct` is `None` when every compared actual is zero; `r2` is `None`
/// when the actual series is constant. Neither is ever replaced by a number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyMetrics {
    pub group_key: String,
    pub n: usize,
    pub mse: f64,
    pub mae: f64,
    pub mape_pct: Option<f64>,
    pub r2: Option<f64>,
}

impl AccuracyMetrics {
    pub fn rmse(&self) -> f64 {
        self.mse.sqrt()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by the analytical core. Every error aborts the single
/// computation call that raised it; nothing partial is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// No observations were supplied at all.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A parameter lies outside its documented domain.
    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Fewer observations than the requested statistic needs.
    #[error("Insufficient data: required {required}, got {got}")]
    InsufficientData { required: usize, got: usize },
}

impl AnalyticsError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        AnalyticsError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
