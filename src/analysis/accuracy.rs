//! Forecast accuracy metrics: MSE, MAE, MAPE and R².
//!
//! Only pairs where both the actual and the expected value are present take
//! part in any metric. Statistics that are mathematically undefined for the
//! filtered pairs (MAPE with all-zero actuals, R² with a constant actual
//! series) are reported as `None`.

use std::collections::BTreeMap;

use tracing::debug;

use crate::analysis::stats::is_constant;
use crate::logging::Component;
use crate::model::{AccuracyMetrics, AnalyticsError, ForecastPair, ObservationSeries, Result};

/// Full outer join of an actual and an expected series on timestamp.
///
/// Timestamps present on only one side yield a pair with the other side
/// missing. Pairs are labelled with the actual series' group key and are
/// returned in timestamp order.
pub fn pair_forecasts(actual: &ObservationSeries, expected: &ObservationSeries) -> Vec<ForecastPair> {
    let group_key = actual.group_key();
    let mut pairs = Vec::with_capacity(actual.len().max(expected.len()));
    let mut a = actual.observations().iter().peekable();
    let mut e = expected.observations().iter().peekable();

    // Both sides are strictly increasing, so a merge walk is enough.
    loop {
        let next_actual = a.peek().map(|o| o.timestamp);
        let next_expected = e.peek().map(|o| o.timestamp);
        let (timestamp, actual_value, expected_value) = match (next_actual, next_expected) {
            (None, None) => break,
            (Some(x), None) => (x, a.next().map(|o| o.value), None),
            (None, Some(y)) => (y, None, e.next().map(|o| o.value)),
            (Some(x), Some(y)) if x < y => (x, a.next().map(|o| o.value), None),
            (Some(x), Some(y)) if y < x => (y, None, e.next().map(|o| o.value)),
            (Some(x), Some(_)) => (x, a.next().map(|o| o.value), e.next().map(|o| o.value)),
        };
        pairs.push(ForecastPair {
            timestamp,
            group_key: group_key.to_string(),
            actual: actual_value,
            expected: expected_value,
        });
    }

    pairs
}

/// Computes accuracy metrics over the complete pairs of a single group.
///
/// # Errors
/// - `InsufficientData` when no pair has both values present.
/// - `InvalidParameter` when the pairs span more than one group.
pub fn compute_accuracy(pairs: &[ForecastPair]) -> Result<AccuracyMetrics> {
    let group_key = pairs.first().map(|p| p.group_key.clone()).unwrap_or_default();
    if let Some(other) = pairs.iter().find(|p| p.group_key != group_key) {
        return Err(AnalyticsError::invalid(
            "pairs",
            format!(
                "accuracy is computed per group; got '{}' and '{}'",
                group_key, other.group_key
            ),
        ));
    }

    let complete: Vec<(f64, f64)> = pairs.iter().filter_map(ForecastPair::complete).collect();
    let n = complete.len();
    if n == 0 {
        return Err(AnalyticsError::InsufficientData { required: 1, got: 0 });
    }
    let count = n as f64;

    let ss_res: f64 = complete.iter().map(|(a, e)| (a - e).powi(2)).sum();
    let mse = ss_res / count;
    let mae = complete.iter().map(|(a, e)| (a - e).abs()).sum::<f64>() / count;

    let ratios: Vec<f64> = complete
        .iter()
        .filter(|(a, _)| *a != 0.0)
        .map(|(a, e)| (a - e).abs() / a.abs())
        .collect();
    let mape_pct = if ratios.is_empty() {
        None
    } else {
        Some(100.0 * ratios.iter().sum::<f64>() / ratios.len() as f64)
    };

    let actuals: Vec<f64> = complete.iter().map(|(a, _)| *a).collect();
    // Constant actuals: R² undefined. Checked on the values, not on ss_tot.
    let r2 = if is_constant(&actuals) {
        None
    } else {
        let mean_actual = actuals.iter().sum::<f64>() / count;
        let ss_tot: f64 = actuals.iter().map(|a| (a - mean_actual).powi(2)).sum();
        Some(1.0 - ss_res / ss_tot)
    };

    debug!(
        component = %Component::Accuracy,
        group = group_key.as_str(),
        n,
        skipped = pairs.len() - n,
        "computed forecast accuracy"
    );

    Ok(AccuracyMetrics {
        group_key,
        n,
        mse,
        mae,
        mape_pct,
        r2,
    })
}

/// Runs [`compute_accuracy`] for every group present in `pairs`, returning
/// each group's outcome in group order. A group without complete pairs
/// reports its `InsufficientData` error instead of zeros.
pub fn accuracy_by_group(pairs: &[ForecastPair]) -> Vec<(String, Result<AccuracyMetrics>)> {
    let mut groups: BTreeMap<&str, Vec<ForecastPair>> = BTreeMap::new();
    for pair in pairs {
        groups.entry(pair.group_key.as_str()).or_default().push(pair.clone());
    }
    groups
        .into_iter()
        .map(|(key, group)| (key.to_string(), compute_accuracy(&group)))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
