//! Analysis parameter files.
//!
//! Every report parameter is spelled out in a TOML file; nothing falls back
//! to a built-in default, so the same file always produces the same output.
//!
//! ```toml
//! regions = ["COAST", "NORTH_C"]
//!
//! [heatwave]
//! min_temp_f = 100.0
//! min_days = 3
//!
//! [extreme_heat]
//! percentile = 99.0
//!
//! [outliers]
//! std_dev_threshold = 3.0
//! period = "month"
//!
//! [precipitation]
//! rainy_day_mm = 0.0
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::analysis::outliers::Period;
use crate::logging::Component;
use crate::model::AnalyticsError;
use crate::regions::{all_region_codes, is_known_region};

/// Environment variable naming the parameter file.
pub const CONFIG_ENV_VAR: &str = "ERCOT_ANALYTICS_CONFIG";

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Group keys to restrict every report to. `None` keeps all regions.
    pub regions: Option<Vec<String>>,
    pub heatwave: HeatwaveConfig,
    pub extreme_heat: ExtremeHeatConfig,
    pub outliers: OutlierConfig,
    pub precipitation: PrecipitationConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeatwaveConfig {
    pub min_temp_f: f64,
    pub min_days: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtremeHeatConfig {
    pub percentile: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutlierConfig {
    pub std_dev_threshold: f64,
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrecipitationConfig {
    pub rainy_day_mm: f64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error(transparent)]
    Invalid(#[from] AnalyticsError),
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl AnalysisConfig {
    /// Checks every parameter against the domain the reports accept.
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if let Some(regions) = &self.regions {
            if let Some(unknown) = regions.iter().find(|r| !is_known_region(r)) {
                return Err(AnalyticsError::invalid(
                    "regions",
                    format!(
                        "unknown region '{}' (expected one of {})",
                        unknown,
                        all_region_codes().join(", ")
                    ),
                ));
            }
        }

        if !self.heatwave.min_temp_f.is_finite() {
            return Err(AnalyticsError::invalid("heatwave.min_temp_f", "must be finite"));
        }
        if self.heatwave.min_days < 1 {
            return Err(AnalyticsError::invalid("heatwave.min_days", "must be at least 1"));
        }

        let p = self.extreme_heat.percentile;
        if !(0.0..=100.0).contains(&p) {
            return Err(AnalyticsError::invalid(
                "extreme_heat.percentile",
                format!("must lie in [0, 100], got {}", p),
            ));
        }

        let k = self.outliers.std_dev_threshold;
        if !(1.0..=5.0).contains(&k) {
            return Err(AnalyticsError::invalid(
                "outliers.std_dev_threshold",
                format!("must lie in [1, 5], got {}", k),
            ));
        }

        let mm = self.precipitation.rainy_day_mm;
        if !mm.is_finite() || mm < 0.0 {
            return Err(AnalyticsError::invalid(
                "precipitation.rainy_day_mm",
                format!("must be a non-negative number, got {}", mm),
            ));
        }

        Ok(())
    }

    /// The region restriction as borrowed keys, ready for
    /// `analysis::aggregate::aggregate`.
    pub fn region_keys(&self) -> Option<Vec<&str>> {
        self.regions
            .as_ref()
            .map(|r| r.iter().map(String::as_str).collect())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses and validates a configuration from TOML text.
pub fn parse_config(text: &str) -> Result<AnalysisConfig, ConfigError> {
    let config: AnalysisConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Reads, parses and validates a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<AnalysisConfig, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = parse_config(&text)?;
    info!(
        component = %Component::Config,
        path = %path.display(),
        "loaded analysis config"
    );
    Ok(config)
}

/// Loads `.env` (if present), then the file named by
/// `ERCOT_ANALYTICS_CONFIG`.
pub fn load_config_from_env() -> Result<AnalysisConfig, ConfigError> {
    dotenv::dotenv().ok();
    let path = std::env::var(CONFIG_ENV_VAR).map_err(|_| ConfigError::MissingEnv(CONFIG_ENV_VAR))?;
    load_config(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
        regions = ["COAST", "WEST"]

        [heatwave]
        min_temp_f = 100.0
        min_days = 3

        [extreme_heat]
        percentile = 99.0

        [outliers]
        std_dev_threshold = 3.0
        period = "month"

        [precipitation]
        rainy_day_mm = 0.0
    "#;

    #[test]
    fn test_valid_config_parses() {
        let config = parse_config(VALID).expect("sample config should be valid");
        assert_eq!(config.heatwave.min_days, 3);
        assert_eq!(config.outliers.period, Period::Month);
        assert_eq!(config.region_keys(), Some(vec!["COAST", "WEST"]));
    }

    #[test]
    fn test_missing_section_is_a_parse_error() {
        let text = VALID.replace("[precipitation]\n        rainy_day_mm = 0.0", "");
        assert!(matches!(parse_config(&text), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_field_is_a_parse_error() {
        let text = VALID.replace("percentile = 99.0", "percentile = 99.0\n        pct = 1");
        assert!(matches!(parse_config(&text), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_percentile_out_of_range_rejected() {
        let text = VALID.replace("percentile = 99.0", "percentile = 101.0");
        assert!(matches!(
            parse_config(&text),
            Err(ConfigError::Invalid(AnalyticsError::InvalidParameter { .. }))
        ));
    }

    #[test]
    fn test_std_dev_threshold_bounds() {
        for bad in ["0.5", "5.5", "0.0"] {
            let text = VALID.replace("std_dev_threshold = 3.0", &format!("std_dev_threshold = {}", bad));
            assert!(parse_config(&text).is_err(), "k = {} must be rejected", bad);
        }
        let edge = VALID.replace("std_dev_threshold = 3.0", "std_dev_threshold = 5.0");
        assert!(parse_config(&edge).is_ok());
    }

    #[test]
    fn test_unknown_region_rejected() {
        let text = VALID.replace("\"WEST\"", "\"ATLANTIS\"");
        let err = parse_config(&text).unwrap_err();
        assert!(err.to_string().contains("ATLANTIS"), "got: {}", err);
        assert!(err.to_string().contains("FAR_WEST, NORTH"), "valid codes are listed: {}", err);
    }

    #[test]
    fn test_zero_min_days_rejected() {
        let text = VALID.replace("min_days = 3", "min_days = 0");
        assert!(parse_config(&text).is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            load_config("./does-not-exist.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
