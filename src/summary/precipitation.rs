//! Rainy-day versus dry-day load comparison per zone.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::stats::mean;
use crate::ingest::weather::is_rainy;
use crate::model::{AnalyticsError, DailyAggregate, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrecipitationImpact {
    pub zone_code: String,
    pub rainy_day: bool,
    pub avg_load_mw: f64,
    pub num_days: usize,
}

/// Average daily load on rainy and on dry days for each zone.
///
/// Only days with both a load value and a precipitation value for the zone
/// are counted. A zone gets a rainy row and a dry row when it has such
/// days; a side with zero days is omitted rather than reported as 0 MW.
/// Ordered by zone, rainy row first.
pub fn precipitation_impact(
    daily_load: &[DailyAggregate],
    daily_precip: &[DailyAggregate],
    rainy_day_mm: f64,
) -> Result<Vec<PrecipitationImpact>> {
    if !rainy_day_mm.is_finite() || rainy_day_mm < 0.0 {
        return Err(AnalyticsError::invalid(
            "rainy_day_mm",
            format!("must be a non-negative number, got {}", rainy_day_mm),
        ));
    }

    let precip: BTreeMap<(&str, NaiveDate), f64> = daily_precip
        .iter()
        .map(|p| ((p.group_key.as_str(), p.day), p.value))
        .collect();

    // zone -> (rainy loads, dry loads)
    let mut zones: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for load in daily_load {
        let Some(&mm) = precip.get(&(load.group_key.as_str(), load.day)) else {
            continue;
        };
        let (rainy, dry) = zones.entry(load.group_key.as_str()).or_default();
        if is_rainy(mm, rainy_day_mm) {
            rainy.push(load.value);
        } else {
            dry.push(load.value);
        }
    }

    let mut rows = Vec::new();
    for (zone, (rainy, dry)) in zones {
        for (rainy_day, loads) in [(true, rainy), (false, dry)] {
            if let Some(avg_load_mw) = mean(&loads) {
                rows.push(PrecipitationImpact {
                    zone_code: zone.to_string(),
                    rainy_day,
                    avg_load_mw,
                    num_days: loads.len(),
                });
            }
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sep(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 9, d).unwrap()
    }

    #[test]
    fn test_rainy_and_dry_averages() {
        let load = vec![
            DailyAggregate::new(sep(1), "SOUTH_C", 100.0),
            DailyAggregate::new(sep(2), "SOUTH_C", 200.0),
            DailyAggregate::new(sep(3), "SOUTH_C", 300.0),
            DailyAggregate::new(sep(4), "SOUTH_C", 999.0), // no precip record
        ];
        let precip = vec![
            DailyAggregate::new(sep(1), "SOUTH_C", 12.0),
            DailyAggregate::new(sep(2), "SOUTH_C", 0.0),
            DailyAggregate::new(sep(3), "SOUTH_C", 0.0),
        ];
        let rows = precipitation_impact(&load, &precip, 0.0).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].rainy_day);
        assert_eq!((rows[0].avg_load_mw, rows[0].num_days), (100.0, 1));
        assert!(!rows[1].rainy_day);
        assert_eq!((rows[1].avg_load_mw, rows[1].num_days), (250.0, 2));
    }

    #[test]
    fn test_zone_without_rain_has_only_dry_row() {
        let load = vec![DailyAggregate::new(sep(1), "FAR_WEST", 50.0)];
        let precip = vec![DailyAggregate::new(sep(1), "FAR_WEST", 0.0)];
        let rows = precipitation_impact(&load, &precip, 0.0).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].rainy_day);
    }

    #[test]
    fn test_negative_rain_threshold_rejected() {
        assert!(precipitation_impact(&[], &[], -1.0).is_err());
    }
}
