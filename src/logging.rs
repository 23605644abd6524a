//! Logging setup
//!
//! `RUST_LOG` takes precedence over the configured level so individual
//! modules can be traced without changing the command line.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as subscriber_fmt, EnvFilter};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", tracing::Level::from(*self).as_str().to_lowercase())
    }
}

/// Output format of the log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact single-line output
    #[default]
    Plain,
    /// One JSON object per event
    Json,
    /// Multi-line human-readable output
    Pretty,
}

fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

/// Install the global subscriber. Logs go to stderr so stdout stays
/// reserved for certificates and verdicts.
pub fn init_logging(level: LogLevel, format: LogFormat) {
    let filter = env_filter(level);

    match format {
        LogFormat::Json => {
            let layer = subscriber_fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Pretty => {
            let layer = subscriber_fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Plain => {
            let layer = subscriber_fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }
}
