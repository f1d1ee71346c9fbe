//! Small descriptive-statistics helpers shared by the analysis components.

use crate::model::{AnalyticsError, Result};

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation with Bessel's correction (n − 1 denominator).
///
/// Fails with `InsufficientData` when fewer than two values are supplied.
/// A constant slice yields exactly `0.0`, whatever rounding the mean picks up.
pub fn sample_stddev(values: &[f64]) -> Result<f64> {
    let n = values.len();
    if n < 2 {
        return Err(AnalyticsError::InsufficientData { required: 2, got: n });
    }
    if is_constant(values) {
        return Ok(0.0);
    }

    let mu = values.iter().sum::<f64>() / n as f64;
    let sum_sq = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>();
    Ok((sum_sq / (n - 1) as f64).sqrt())
}

/// True when every value equals the first. Empty slices count as constant.
pub fn is_constant(values: &[f64]) -> bool {
    values.first().is_none_or(|first| values.iter().all(|v| v == first))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_mean_basic() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), Some(3.0));
    }

    #[test]
    fn test_sample_stddev_uses_bessel_correction() {
        // Values 2,4,4,4,5,5,7,9: sum of squared deviations = 32.
        // Population sigma would be 2.0; sample sigma is sqrt(32 / 7).
        let sd = sample_stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - (32.0f64 / 7.0).sqrt()).abs() < 1e-12, "got {}", sd);
    }

    #[test]
    fn test_sample_stddev_needs_two_values() {
        assert_eq!(
            sample_stddev(&[42.0]),
            Err(AnalyticsError::InsufficientData { required: 2, got: 1 })
        );
    }

    #[test]
    fn test_sample_stddev_of_constant_series_is_zero() {
        assert_eq!(sample_stddev(&[3.0, 3.0, 3.0]), Ok(0.0));
    }

    #[test]
    fn test_sample_stddev_of_unrepresentable_constant_is_exactly_zero() {
        // 0.11 and 0.1 have no exact binary form; the mean drifts by an ULP.
        for (value, n) in [(0.11, 13), (0.1, 3), (40123.7, 7)] {
            let values = vec![value; n];
            assert_eq!(sample_stddev(&values), Ok(0.0), "value {} repeated {} times", value, n);
        }
    }

    #[test]
    fn test_is_constant() {
        assert!(is_constant(&[]));
        assert!(is_constant(&[0.1, 0.1]));
        assert!(!is_constant(&[0.1, 0.1000001]));
    }
}
