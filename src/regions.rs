//! ERCOT region registry.
//!
//! Defines the canonical list of load regions (the eight ERCOT weather
//! zones plus the system-wide total) that appear as columns of the hourly
//! load table and as group keys throughout the engine. All other modules
//! should reference region codes from here rather than hardcoding them.

// ---------------------------------------------------------------------------
// Region metadata
// ---------------------------------------------------------------------------

/// Metadata for a single ERCOT load region.
pub struct Region {
    /// Group key used throughout the engine, e.g. `"FAR_WEST"`.
    pub code: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// `false` only for the system-wide total.
    pub is_weather_zone: bool,
}

/// System-wide total load column.
pub const SYSTEM_TOTAL: &str = "ERCOT";

/// All load regions, in the column order of the hourly load table.
pub static REGION_REGISTRY: &[Region] = &[
    Region { code: "COAST", name: "Coast", is_weather_zone: true },
    Region { code: "EAST", name: "East", is_weather_zone: true },
    Region { code: "FAR_WEST", name: "Far West", is_weather_zone: true },
    Region { code: "NORTH", name: "North", is_weather_zone: true },
    Region { code: "NORTH_C", name: "North Central", is_weather_zone: true },
    Region { code: "SOUTHERN", name: "Southern", is_weather_zone: true },
    Region { code: "SOUTH_C", name: "South Central", is_weather_zone: true },
    Region { code: "WEST", name: "West", is_weather_zone: true },
    Region { code: SYSTEM_TOTAL, name: "ERCOT system total", is_weather_zone: false },
];

/// Codes of every region, system total included.
pub fn all_region_codes() -> Vec<&'static str> {
    REGION_REGISTRY.iter().map(|r| r.code).collect()
}

/// Codes of the eight weather zones (system total excluded).
pub fn zone_codes() -> Vec<&'static str> {
    REGION_REGISTRY
        .iter()
        .filter(|r| r.is_weather_zone)
        .map(|r| r.code)
        .collect()
}

/// Looks up a region by code. Returns `None` if not found.
pub fn find_region(code: &str) -> Option<&'static Region> {
    REGION_REGISTRY.iter().find(|r| r.code == code)
}

pub fn is_known_region(code: &str) -> bool {
    find_region(code).is_some()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_codes_are_upper_snake_case() {
        for region in REGION_REGISTRY {
            assert!(
                region
                    .code
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c == '_'),
                "region code '{}' should be upper snake case",
                region.code
            );
        }
    }

    #[test]
    fn test_no_duplicate_region_codes() {
        let mut seen = std::collections::HashSet::new();
        for region in REGION_REGISTRY {
            assert!(
                seen.insert(region.code),
                "duplicate region code '{}' found in REGION_REGISTRY",
                region.code
            );
        }
    }

    #[test]
    fn test_eight_weather_zones_plus_total() {
        assert_eq!(zone_codes().len(), 8);
        assert_eq!(all_region_codes().len(), 9);
        assert!(!zone_codes().contains(&SYSTEM_TOTAL));
    }

    #[test]
    fn test_find_region_returns_correct_entry() {
        let region = find_region("FAR_WEST").expect("Far West should be in registry");
        assert_eq!(region.name, "Far West");
        assert!(find_region("NOWHERE").is_none());
        assert!(is_known_region("ERCOT"));
    }
}
