//! Hourly zone weather readings.
//!
//! The caller supplies one `WeatherObservation` per zone and hour, already
//! typed. Any measurement may be missing (sensor outage, station without
//! that instrument); missing values are skipped, never treated as zero.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::aggregate::{aggregate, Granularity, Reducer};
use crate::model::{AnalyticsError, DailyAggregate, Observation, ObservationSeries, Result};
use crate::regions::zone_codes;

// ============================================================================
// Observation types
// ============================================================================

/// One hourly weather reading for a zone.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    pub zone_code: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub temp_f: Option<f64>,
    pub relative_humidity_pct: Option<f64>,
    pub precip_mm: Option<f64>,
    pub wind_kmh: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub cloud_cover_pct: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherMetric {
    TemperatureF,
    RelativeHumidity,
    Precipitation,
    Wind,
    Pressure,
    CloudCover,
}

impl WeatherMetric {
    pub fn value_of(self, obs: &WeatherObservation) -> Option<f64> {
        match self {
            WeatherMetric::TemperatureF => obs.temp_f,
            WeatherMetric::RelativeHumidity => obs.relative_humidity_pct,
            WeatherMetric::Precipitation => obs.precip_mm,
            WeatherMetric::Wind => obs.wind_kmh,
            WeatherMetric::Pressure => obs.pressure_hpa,
            WeatherMetric::CloudCover => obs.cloud_cover_pct,
        }
    }

    /// How hourly readings collapse into one daily value. Precipitation is
    /// accumulated, everything else averaged.
    pub fn daily_reducer(self) -> Reducer {
        match self {
            WeatherMetric::Precipitation => Reducer::Sum,
            _ => Reducer::Mean,
        }
    }
}

/// System-wide daily weather: each field is the mean across zones of the
/// zones' daily values. `None` when no zone reported that metric that day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyWeather {
    pub day: NaiveDate,
    pub temp_c: Option<f64>,
    pub rh_pct: Option<f64>,
    pub precip_mm: Option<f64>,
    pub wind_kmh: Option<f64>,
    pub pressure_hpa: Option<f64>,
    pub cloud_cover_pct: Option<f64>,
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

// ============================================================================
// Series construction
// ============================================================================

/// Builds one series per zone for a single metric, skipping hours where the
/// metric is missing. Zones with no value at all are omitted.
pub fn metric_series(
    observations: &[WeatherObservation],
    metric: WeatherMetric,
) -> Result<BTreeMap<String, ObservationSeries>> {
    let mut by_zone: BTreeMap<&str, Vec<Observation>> = BTreeMap::new();
    for obs in observations {
        if let Some(value) = metric.value_of(obs) {
            by_zone
                .entry(obs.zone_code.as_str())
                .or_default()
                .push(Observation::new(obs.timestamp, value));
        }
    }

    by_zone
        .into_iter()
        .map(|(zone, mut readings)| {
            readings.sort_by_key(|o| o.timestamp);
            ObservationSeries::new(zone, readings).map(|s| (zone.to_string(), s))
        })
        .collect()
}

/// Daily values of one metric per zone, using the metric's own reducer.
///
/// A metric nobody reported yields an empty vector.
pub fn daily_metric(
    observations: &[WeatherObservation],
    metric: WeatherMetric,
) -> Result<Vec<DailyAggregate>> {
    let series: Vec<ObservationSeries> = metric_series(observations, metric)?.into_values().collect();
    match aggregate(&series, Granularity::Day, metric.daily_reducer(), None) {
        Err(AnalyticsError::EmptyInput(_)) => Ok(Vec::new()),
        other => other,
    }
}

/// Collapses zone-level hourly readings into one system-wide record per day.
///
/// Only the registered weather zones take part; readings filed under the
/// system total or an unknown code are ignored. Fails with `EmptyInput` when
/// no observations are supplied.
pub fn daily_weather(observations: &[WeatherObservation]) -> Result<Vec<DailyWeather>> {
    if observations.is_empty() {
        return Err(AnalyticsError::EmptyInput("no weather observations".to_string()));
    }

    let zones = zone_codes();
    let in_zones: Vec<WeatherObservation> = observations
        .iter()
        .filter(|o| zones.iter().any(|z| *z == o.zone_code))
        .cloned()
        .collect();

    let mut days: BTreeMap<NaiveDate, DailyWeather> = BTreeMap::new();
    let metrics = [
        WeatherMetric::TemperatureF,
        WeatherMetric::RelativeHumidity,
        WeatherMetric::Precipitation,
        WeatherMetric::Wind,
        WeatherMetric::Pressure,
        WeatherMetric::CloudCover,
    ];

    for metric in metrics {
        let mut per_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for row in daily_metric(&in_zones, metric)? {
            per_day.entry(row.day).or_default().push(row.value);
        }
        for (day, values) in per_day {
            let Some(zone_mean) = Reducer::Mean.apply(&values) else {
                continue;
            };
            let record = days.entry(day).or_insert_with(|| DailyWeather {
                day,
                temp_c: None,
                rh_pct: None,
                precip_mm: None,
                wind_kmh: None,
                pressure_hpa: None,
                cloud_cover_pct: None,
            });
            match metric {
                WeatherMetric::TemperatureF => record.temp_c = Some(fahrenheit_to_celsius(zone_mean)),
                WeatherMetric::RelativeHumidity => record.rh_pct = Some(zone_mean),
                WeatherMetric::Precipitation => record.precip_mm = Some(zone_mean),
                WeatherMetric::Wind => record.wind_kmh = Some(zone_mean),
                WeatherMetric::Pressure => record.pressure_hpa = Some(zone_mean),
                WeatherMetric::CloudCover => record.cloud_cover_pct = Some(zone_mean),
            }
        }
    }

    Ok(days.into_values().collect())
}

// ============================================================================
// Precipitation helpers
// ============================================================================

/// A day counts as rainy when its accumulated precipitation exceeds
/// `rainy_day_mm`.
pub fn is_rainy(daily_precip_mm: f64, rainy_day_mm: f64) -> bool {
    daily_precip_mm > rainy_day_mm
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn obs(zone: &str, day: u32, hour: u32) -> WeatherObservation {
        WeatherObservation {
            zone_code: zone.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap(),
            temp_f: None,
            relative_humidity_pct: None,
            precip_mm: None,
            wind_kmh: None,
            pressure_hpa: None,
            cloud_cover_pct: None,
        }
    }

    #[test]
    fn test_is_rainy_is_strict() {
        assert!(is_rainy(0.3, 0.0));
        assert!(!is_rainy(0.0, 0.0));
    }

    #[test]
    fn test_metric_series_per_zone_and_sorted() {
        let mut late = obs("WEST", 1, 5);
        late.temp_f = Some(90.0);
        let mut early = obs("WEST", 1, 1);
        early.temp_f = Some(80.0);
        let mut coast = obs("COAST", 1, 1);
        coast.temp_f = Some(85.0);
        let mut dry = obs("EAST", 1, 1);
        dry.precip_mm = Some(0.0);

        let series = metric_series(&[late, early, coast, dry], WeatherMetric::TemperatureF).unwrap();
        assert_eq!(series.len(), 2, "EAST reported no temperature");
        let west: Vec<f64> = series["WEST"].observations().iter().map(|o| o.value).collect();
        assert_eq!(west, vec![80.0, 90.0]);
    }

    #[test]
    fn test_daily_weather_averages_zones_and_sums_precip() {
        let mut a = obs("COAST", 1, 0);
        a.temp_f = Some(50.0);
        a.precip_mm = Some(1.0);
        let mut b = obs("COAST", 1, 12);
        b.temp_f = Some(68.0);
        b.precip_mm = Some(2.0);
        let mut c = obs("WEST", 1, 0);
        c.temp_f = Some(59.0);
        c.precip_mm = Some(5.0);

        let days = daily_weather(&[a, b, c]).unwrap();
        assert_eq!(days.len(), 1);
        // COAST mean 59°F, WEST 59°F => 15°C
        assert_eq!(days[0].temp_c, Some(15.0));
        // COAST sum 3 mm, WEST 5 mm => 4 mm
        assert_eq!(days[0].precip_mm, Some(4.0));
        assert_eq!(days[0].wind_kmh, None, "nobody reported wind");
    }

    #[test]
    fn test_daily_weather_ignores_non_zone_codes() {
        let mut coast = obs("COAST", 1, 0);
        coast.temp_f = Some(50.0);
        let mut total = obs("ERCOT", 1, 0);
        total.temp_f = Some(212.0);
        let mut typo = obs("COASTAL", 1, 0);
        typo.temp_f = Some(212.0);

        let days = daily_weather(&[coast, total, typo]).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].temp_c, Some(10.0), "only COAST counts toward the system mean");
    }

    #[test]
    fn test_daily_weather_requires_observations() {
        assert!(matches!(daily_weather(&[]), Err(AnalyticsError::EmptyInput(_))));
    }
}
