//! Consecutive-day streak detection.
//!
//! A streak is a maximal run of calendar days whose daily value satisfies a
//! predicate. Days are never assumed to be dense: a missing date breaks the
//! run exactly like a failing day does.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::analysis::aggregate::{aggregate_window, Reducer};
use crate::logging::Component;
use crate::model::{AnalyticsError, DailyAggregate, Result, Streak};

// ---------------------------------------------------------------------------
// Threshold predicates
// ---------------------------------------------------------------------------

/// A threshold comparison usable as a streak predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// `value >= limit`
    AtLeast(f64),
    /// `value > limit`
    Above(f64),
    /// `value <= limit`
    AtMost(f64),
    /// `value < limit`
    Below(f64),
}

impl Threshold {
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Threshold::AtLeast(limit) => value >= limit,
            Threshold::Above(limit) => value > limit,
            Threshold::AtMost(limit) => value <= limit,
            Threshold::Below(limit) => value < limit,
        }
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Run under construction while scanning.
struct OpenRun {
    start: NaiveDate,
    end: NaiveDate,
    length: usize,
    peak: f64,
}

impl OpenRun {
    fn start(day: NaiveDate, value: f64) -> Self {
        Self {
            start: day,
            end: day,
            length: 1,
            peak: value,
        }
    }

    fn extends_to(&self, day: NaiveDate) -> bool {
        self.end + Duration::days(1) == day
    }

    fn push(&mut self, day: NaiveDate, value: f64) {
        self.end = day;
        self.length += 1;
        self.peak = self.peak.max(value);
    }
}

/// Finds the maximal runs of consecutive days of one group whose value
/// satisfies `predicate`, keeping those at least `min_length` days long.
///
/// Input order does not matter; rows are scanned in ascending day order.
/// Output is ascending by `start_day`. `aux_value` is left empty, see
/// [`attach_aux`].
///
/// # Errors
/// - `InvalidParameter` if `min_length` is zero, if rows belong to more than
///   one group, or if a day appears twice.
pub fn detect_streaks<P>(
    daily_values: &[DailyAggregate],
    predicate: P,
    min_length: usize,
) -> Result<Vec<Streak>>
where
    P: Fn(f64) -> bool,
{
    if min_length == 0 {
        return Err(AnalyticsError::invalid("min_length", "must be at least 1"));
    }
    let Some(first) = daily_values.first() else {
        return Ok(Vec::new());
    };
    let group_key = first.group_key.as_str();
    if let Some(other) = daily_values.iter().find(|d| d.group_key != group_key) {
        return Err(AnalyticsError::invalid(
            "daily_values",
            format!(
                "streaks are detected per group; got '{}' and '{}'",
                group_key, other.group_key
            ),
        ));
    }

    let mut ordered: Vec<&DailyAggregate> = daily_values.iter().collect();
    ordered.sort_by_key(|d| d.day);
    if let Some(pair) = ordered.windows(2).find(|w| w[0].day == w[1].day) {
        return Err(AnalyticsError::invalid(
            "daily_values",
            format!("duplicate day {} for '{}'", pair[0].day, group_key),
        ));
    }

    let mut streaks = Vec::new();
    let mut close = |run: OpenRun| {
        if run.length >= min_length {
            streaks.push(Streak {
                group_key: group_key.to_string(),
                start_day: run.start,
                end_day: run.end,
                length: run.length,
                peak_value: run.peak,
                aux_value: None,
            });
        }
    };

    let mut current: Option<OpenRun> = None;
    for row in ordered {
        if !predicate(row.value) {
            if let Some(run) = current.take() {
                close(run);
            }
            continue;
        }
        let extends = current.as_ref().is_some_and(|run| run.extends_to(row.day));
        if extends {
            if let Some(run) = current.as_mut() {
                run.push(row.day, row.value);
            }
        } else if let Some(run) = current.replace(OpenRun::start(row.day, row.value)) {
            // gap in the calendar
            close(run);
        }
    }
    if let Some(run) = current.take() {
        close(run);
    }

    debug!(
        component = %Component::Streaks,
        group = group_key,
        days = daily_values.len(),
        streaks = streaks.len(),
        "detected streaks"
    );

    Ok(streaks)
}

/// Fills each streak's `aux_value` with `reducer` applied to the secondary
/// daily metric of the same group inside `[start_day, end_day]`.
///
/// Streaks whose window holds no secondary data keep `aux_value = None`.
pub fn attach_aux(streaks: Vec<Streak>, aux_daily: &[DailyAggregate], reducer: Reducer) -> Vec<Streak> {
    streaks
        .into_iter()
        .map(|streak| {
            let aux_value = aggregate_window(
                aux_daily,
                &streak.group_key,
                streak.start_day,
                streak.end_day,
                reducer,
            );
            Streak { aux_value, ..streak }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
