/// Structured logging for record generation
///
/// Provides context-rich logging with data source and site identifiers on
/// top of the `log` facade. The binary embedding this crate decides where
/// records go; `init_logger` installs `env_logger` for the common case.

use std::fmt;

use log::Level;

const LOG_TARGET: &str = "sw_record";

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

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Aquarius time-series server.
    Aquarius,
    /// SIMs station documentation service.
    Sims,
    /// Local reconciliation and derived metrics.
    Analysis,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Aquarius => write!(f, "AQ"),
            DataSource::Sims => write!(f, "SIMS"),
            DataSource::Analysis => write!(f, "ANALYSIS"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - e.g. a site with no published timeseries
    Expected,
    /// Unexpected failure - indicates service degradation or a payload change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Install `env_logger` with `min_level` as the default filter.
///
/// `RUST_LOG` still takes precedence when set. Calling this twice is harmless;
/// the second installation attempt is ignored.
pub fn init_logger(min_level: LogLevel, console_timestamps: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(min_level.into());
    builder.parse_default_env();
    if !console_timestamps {
        builder.format_timestamp(None);
    }
    let _ = builder.try_init();
}

fn format_entry(source: DataSource, site_id: Option<&str>, message: &str) -> String {
    let site_part = site_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
    format!("{}{}: {}", source, site_part, message)
}

fn emit(level: Level, source: DataSource, site_id: Option<&str>, message: &str) {
    log::log!(target: LOG_TARGET, level, "{}", format_entry(source, site_id, message));
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Log a general informational message
pub fn info(source: DataSource, site_id: Option<&str>, message: &str) {
    emit(Level::Info, source, site_id, message);
}

/// Log a warning message
pub fn warn(source: DataSource, site_id: Option<&str>, message: &str) {
    emit(Level::Warn, source, site_id, message);
}

/// Log an error message
pub fn error(source: DataSource, site_id: Option<&str>, message: &str) {
    emit(Level::Error, source, site_id, message);
}

/// Log a debug message
pub fn debug(source: DataSource, site_id: Option<&str>, message: &str) {
    emit(Level::Debug, source, site_id, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify an Aquarius request failure from its rendered error message.
pub fn classify_aquarius_failure(error_message: &str) -> FailureType {
    if error_message.starts_with("Site not found")
        || error_message.starts_with("No data available")
    {
        FailureType::Expected
    } else if error_message.starts_with("HTTP error")
        || error_message.starts_with("Request failed")
        || error_message.starts_with("Parse error")
    {
        FailureType::Unexpected
    } else {
        FailureType::Unknown
    }
}

/// Log an Aquarius failure with automatic classification
pub fn log_aquarius_failure(site_id: Option<&str>, operation: &str, err: &dyn std::error::Error) {
    let error_msg = err.to_string();
    let failure_type = classify_aquarius_failure(&error_msg);

    let message = format!("{} failed [{}]: {}", operation, failure_type, error_msg);

    match failure_type {
        FailureType::Expected => debug(DataSource::Aquarius, site_id, &message),
        FailureType::Unexpected => error(DataSource::Aquarius, site_id, &message),
        FailureType::Unknown => warn(DataSource::Aquarius, site_id, &message),
    }
}

// ---------------------------------------------------------------------------
// Run Summary Logging
// ---------------------------------------------------------------------------

/// Log the outcome of a record-gathering pass for a site.
pub fn log_gather_summary(site_no: &str, timeseries: usize, visits: usize, warnings: usize) {
    let message = format!(
        "Record data gathered: {} timeseries, {} field visits, {} warnings",
        timeseries, visits, warnings
    );

    if warnings == 0 {
        info(DataSource::System, Some(site_no), &message);
    } else {
        warn(DataSource::System, Some(site_no), &message);
    }
}
