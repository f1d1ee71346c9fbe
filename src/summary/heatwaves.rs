//! Heatwave streaks: consecutive days whose maximum temperature reaches a
//! limit, with the average daily peak load over each streak.

use tracing::{debug, warn};

use crate::analysis::aggregate::{partition_by_group, Reducer};
use crate::analysis::streaks::{attach_aux, detect_streaks, Threshold};
use crate::logging::Component;
use crate::model::{DailyAggregate, Result, Streak};

/// Heatwave streaks for every zone in `max_temp_daily`.
///
/// `max_temp_daily` holds daily maximum temperature (°F) per zone and
/// `peak_load_daily` daily peak load (MW) per zone; each streak's
/// `aux_value` is the mean daily peak load over the streak, `None` when the
/// zone has no load data in that window. Output is ordered by
/// `(zone, start_day)`.
pub fn heatwave_streaks(
    max_temp_daily: &[DailyAggregate],
    peak_load_daily: &[DailyAggregate],
    min_temp_f: f64,
    min_days: usize,
) -> Result<Vec<Streak>> {
    let threshold = Threshold::AtLeast(min_temp_f);
    let zones = partition_by_group(max_temp_daily);
    let total = zones.len();

    let mut streaks = Vec::new();
    for (zone, days) in zones {
        let found = detect_streaks(&days, |t| threshold.matches(t), min_days).inspect_err(|e| {
            warn!(component = %Component::Summary, zone = zone.as_str(), error = %e, "heatwave detection failed");
        })?;
        streaks.extend(attach_aux(found, peak_load_daily, Reducer::Mean));
    }

    debug!(
        component = %Component::Summary,
        zones = total,
        streaks = streaks.len(),
        min_temp_f,
        min_days,
        "heatwave streaks"
    );
    Ok(streaks)
}
