//! Hourly regional load rows.
//!
//! The load table is wide: one row per `hour_end` with a MW column per
//! region. The engine works on one series per region, so this module only
//! reshapes already-typed rows. It never parses dates or talks to storage.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::model::{AnalyticsError, Observation, ObservationSeries, Result};
use crate::regions::REGION_REGISTRY;

/// One row of the hourly load table, in MW.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyLoadRow {
    pub hour_end: DateTime<Utc>,
    pub coast: f64,
    pub east: f64,
    pub far_west: f64,
    pub north: f64,
    pub north_c: f64,
    pub southern: f64,
    pub south_c: f64,
    pub west: f64,
    pub ercot: f64,
}

impl HourlyLoadRow {
    /// Load for a region code from the registry, or `None` for an unknown code.
    pub fn load_for(&self, code: &str) -> Option<f64> {
        let value = match code {
            "COAST" => self.coast,
            "EAST" => self.east,
            "FAR_WEST" => self.far_west,
            "NORTH" => self.north,
            "NORTH_C" => self.north_c,
            "SOUTHERN" => self.southern,
            "SOUTH_C" => self.south_c,
            "WEST" => self.west,
            "ERCOT" => self.ercot,
            _ => return None,
        };
        Some(value)
    }
}

/// Splits wide load rows into one series per registered region, keyed by
/// region code.
///
/// Rows may arrive in any order; they are sorted by `hour_end`. Two rows for
/// the same hour are rejected.
pub fn series_by_region(rows: &[HourlyLoadRow]) -> Result<BTreeMap<String, ObservationSeries>> {
    if rows.is_empty() {
        return Err(AnalyticsError::EmptyInput("no hourly load rows".to_string()));
    }

    let mut ordered: Vec<&HourlyLoadRow> = rows.iter().collect();
    ordered.sort_by_key(|r| r.hour_end);

    let mut series = BTreeMap::new();
    for region in REGION_REGISTRY {
        let observations = ordered
            .iter()
            .filter_map(|row| row.load_for(region.code).map(|v| Observation::new(row.hour_end, v)))
            .collect();
        series.insert(
            region.code.to_string(),
            ObservationSeries::new(region.code, observations)?,
        );
    }
    Ok(series)
}
