//! Logging configuration and initialization.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Standard tracing filter (e.g., `info`, `race_harness=debug`)
//! - `LOG_FORMAT`: Output format - `pretty` (default) or `compact`
//! - `LOG_TIMESTAMPS`: Timestamp format - `local` (default), `utc`, or `none`
//!
//! Per-worker start and finish events are logged at `debug`, so
//! `RUST_LOG=race_harness=debug` shows the interleaving of workers.

use std::env;

use tracing_subscriber::fmt::time::{ChronoLocal, ChronoUtc};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-field format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl LogFormat {
    /// Parse format from string
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Timestamp format for log entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampFormat {
    /// Local time with timezone (default)
    #[default]
    Local,
    /// UTC time (ISO 8601)
    Utc,
    /// No timestamps
    None,
}

impl TimestampFormat {
    /// Parse format from string
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "utc" => TimestampFormat::Utc,
            "none" | "off" => TimestampFormat::None,
            _ => TimestampFormat::Local,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output format
    pub format: LogFormat,
    /// Timestamp format
    pub timestamps: TimestampFormat,
    /// Default log level filter
    pub default_level: String,
    /// Include source file location
    pub include_location: bool,
    /// Include thread IDs
    pub include_thread_ids: bool,
    /// Include thread names (`worker-<id>`)
    pub include_thread_names: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            timestamps: TimestampFormat::Local,
            default_level: "info".to_string(),
            include_location: false,
            include_thread_ids: false,
            include_thread_names: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables
    ///
    /// Reads:
    /// - `LOG_FORMAT`: pretty or compact
    /// - `LOG_TIMESTAMPS`: local, utc, or none
    /// - `LOG_LEVEL`: default log level (fallback if RUST_LOG not set)
    /// - `LOG_LOCATION`: true/false for file:line info
    /// - `LOG_THREAD_IDS`: true/false for thread IDs
    pub fn from_env() -> Self {
        Self {
            format: env::var("LOG_FORMAT")
                .map(|s| LogFormat::from_str(&s))
                .unwrap_or_default(),
            timestamps: env::var("LOG_TIMESTAMPS")
                .map(|s| TimestampFormat::from_str(&s))
                .unwrap_or_default(),
            default_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            include_location: env::var("LOG_LOCATION")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(false),
            include_thread_ids: env::var("LOG_THREAD_IDS")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(false),
            include_thread_names: true,
        }
    }
}

/// Initialize logging with the given configuration
///
/// Logs go to stderr so that reports on stdout stay clean.
///
/// # Errors
///
/// Returns an error if the subscriber cannot be initialized (e.g., already set)
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let compact = config.format == LogFormat::Compact;

    match (config.timestamps, compact) {
        (TimestampFormat::Local, false) => {
            let timer = ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f %z".to_string());
            registry.with(build_fmt_layer(&config).with_timer(timer)).try_init()?;
        }
        (TimestampFormat::Local, true) => {
            let timer = ChronoLocal::new("%H:%M:%S%.3f".to_string());
            registry
                .with(build_fmt_layer(&config).compact().with_timer(timer))
                .try_init()?;
        }
        (TimestampFormat::Utc, false) => {
            let timer = ChronoUtc::new("%Y-%m-%dT%H:%M:%S%.3fZ".to_string());
            registry.with(build_fmt_layer(&config).with_timer(timer)).try_init()?;
        }
        (TimestampFormat::Utc, true) => {
            let timer = ChronoUtc::new("%H:%M:%S%.3fZ".to_string());
            registry
                .with(build_fmt_layer(&config).compact().with_timer(timer))
                .try_init()?;
        }
        (TimestampFormat::None, false) => {
            registry.with(build_fmt_layer(&config).without_time()).try_init()?;
        }
        (TimestampFormat::None, true) => {
            registry
                .with(build_fmt_layer(&config).compact().without_time())
                .try_init()?;
        }
    }

    Ok(())
}

/// Build the fmt layer with common settings
fn build_fmt_layer<S>(
    config: &LogConfig,
) -> fmt::Layer<S, fmt::format::DefaultFields, fmt::format::Format<fmt::format::Full>, fn() -> std::io::Stderr>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr as fn() -> std::io::Stderr)
        .with_target(false)
        .with_thread_ids(config.include_thread_ids)
        .with_thread_names(config.include_thread_names)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_level(true)
        .with_ansi(atty::is(atty::Stream::Stderr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!(LogFormat::from_str("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::from_str("COMPACT"), LogFormat::Compact);
        assert_eq!(LogFormat::from_str("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("unknown"), LogFormat::Pretty);
    }

    #[test]
    fn test_timestamp_format_from_str() {
        assert_eq!(TimestampFormat::from_str("utc"), TimestampFormat::Utc);
        assert_eq!(TimestampFormat::from_str("UTC"), TimestampFormat::Utc);
        assert_eq!(TimestampFormat::from_str("local"), TimestampFormat::Local);
        assert_eq!(TimestampFormat::from_str("none"), TimestampFormat::None);
        assert_eq!(TimestampFormat::from_str("off"), TimestampFormat::None);
    }

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.timestamps, TimestampFormat::Local);
        assert_eq!(config.default_level, "info");
        assert!(config.include_thread_names);
        assert!(!config.include_thread_ids);
    }
}
