//! Structured logging for the analytics engine.
//!
//! Computations emit `tracing` events tagged with the component that raised
//! them. This module owns the subscriber setup (console plus an optional
//! append-mode log file) and a few helpers for run-level summaries.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`.
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// The part of the engine an event comes from. Recorded as the
/// `component` field on every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Aggregator,
    Streaks,
    Outliers,
    Percentile,
    Accuracy,
    Summary,
    Config,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Aggregator => write!(f, "AGG"),
            Component::Streaks => write!(f, "STREAK"),
            Component::Outliers => write!(f, "OUTLIER"),
            Component::Percentile => write!(f, "PCTL"),
            Component::Accuracy => write!(f, "ACC"),
            Component::Summary => write!(f, "SUMMARY"),
            Component::Config => write!(f, "CFG"),
        }
    }
}

// ---------------------------------------------------------------------------
// Subscriber setup
// ---------------------------------------------------------------------------

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `min_level` when set. With
/// `console_timestamps` off the console output drops the time column, which
/// keeps interactive runs readable. A `log_file` is opened in append mode and
/// receives plain (non-ANSI) lines.
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place.
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.directive()));

    let timed_console = console_timestamps.then(|| tracing_fmt::layer().with_target(false));
    let plain_console =
        (!console_timestamps).then(|| tracing_fmt::layer().without_time().with_target(false));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(timed_console)
        .with(plain_console)
        .with(file_layer)
        .try_init();

    if installed.is_err() {
        warn!(component = %Component::Config, "logger already initialised, keeping existing subscriber");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Run summaries
// ---------------------------------------------------------------------------

/// Severity a per-group run summary is logged at.
pub fn summary_level(succeeded: usize, failed: usize) -> LogLevel {
    if failed == 0 {
        LogLevel::Info
    } else if succeeded == 0 {
        LogLevel::Error
    } else {
        LogLevel::Warning
    }
}

/// Logs how many groups of a multi-group computation succeeded.
pub fn log_run_summary(component: Component, total: usize, succeeded: usize, failed: usize) {
    let message = format!(
        "Run complete: {}/{} groups successful, {} failed",
        succeeded, total, failed
    );

    match summary_level(succeeded, failed) {
        LogLevel::Info | LogLevel::Debug => info!(component = %component, "{}", message),
        LogLevel::Warning => warn!(component = %component, "{}", message),
        LogLevel::Error => error!(component = %component, "{}", message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_component_tags() {
        assert_eq!(Component::Streaks.to_string(), "STREAK");
        assert_eq!(Component::Percentile.to_string(), "PCTL");
    }

    #[test]
    fn test_summary_level_classification() {
        assert_eq!(summary_level(8, 0), LogLevel::Info);
        assert_eq!(summary_level(0, 8), LogLevel::Error);
        assert_eq!(summary_level(5, 3), LogLevel::Warning);
    }

    #[test]
    fn test_init_logger_twice_is_harmless() {
        init_logger(LogLevel::Debug, None, false).expect("console-only init cannot fail");
        init_logger(LogLevel::Error, None, true).expect("second init is a no-op");
        log_run_summary(Component::Summary, 2, 1, 1);
    }
}
