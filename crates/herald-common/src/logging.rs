//! Structured logging setup.

use crate::{FrameworkError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Console output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable output.
    #[default]
    Compact,
    /// Multi-line output with colours.
    Pretty,
    /// Newline-delimited JSON.
    Json,
}

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "herald_core=debug"). `RUST_LOG` wins
    /// when set.
    pub level: String,
    /// Console output format.
    pub format: LogFormat,
    /// Optional file to additionally write logs to, rotated daily.
    pub file: Option<PathBuf>,
    /// Whether to log span open/close events.
    pub include_spans: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            file: None,
            include_spans: false,
        }
    }
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(level)
        .map_err(|e| FrameworkError::config_with_source(format!("Invalid log filter `{level}`"), e))
}

/// Initialize the global tracing subscriber.
///
/// The returned guard flushes the log file on drop and must be held for the
/// lifetime of the program when file output is enabled.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(&config.level)?;

    let span_events = if config.include_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), PathBuf::from);
            let file_name = path
                .file_name()
                .ok_or_else(|| FrameworkError::config("Log file path has no file name"))?;

            let appender = tracing_appender::rolling::daily(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_span_events(span_events.clone());

            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let compact = (config.format == LogFormat::Compact).then(|| {
        fmt::layer()
            .compact()
            .with_target(true)
            .with_span_events(span_events.clone())
    });

    let pretty = (config.format == LogFormat::Pretty).then(|| {
        fmt::layer()
            .pretty()
            .with_thread_names(true)
            .with_span_events(span_events.clone())
    });

    let json = (config.format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_current_span(config.include_spans)
            .with_span_events(span_events.clone())
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(compact)
        .with(pretty)
        .with(json)
        .with(file_layer)
        .try_init()
        .map_err(|e| FrameworkError::config_with_source("Failed to install the tracing subscriber", e))?;

    Ok(guard)
}

/// Initialize logging for development (pretty, debug level)
pub fn init_dev_logging() -> Result<Option<WorkerGuard>> {
    init_logging(&LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Pretty,
        ..LoggingConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.file.is_none());
        assert!(!config.include_spans);
    }

    #[test]
    fn test_config_deserializes_partial_input() {
        let config: LoggingConfig =
            serde_json::from_str(r#"{ "format": "json", "file": "logs/herald.log" }"#).unwrap();

        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
        assert_eq!(config.file, Some(PathBuf::from("logs/herald.log")));
    }
}
