//! Logging setup.
//!
//! `RUST_LOG` wins when set; otherwise the `[logging]` section picks the level
//! for the storefront crates. Output always goes to stderr so stdout stays
//! clean for `--json` command output.

use std::io::IsTerminal;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::AppError;

/// Crates whose events are enabled by the configured level.
const LOG_TARGETS: [&str; 6] = [
    "store_commerce",
    "store_data",
    "store_cache",
    "store_i18n",
    "store_app",
    "storefront",
];

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console format (default).
    #[default]
    Human,
    /// One JSON object per event.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "pretty" => Ok(LogFormat::Human),
            "json" | "jsonl" => Ok(LogFormat::Json),
            _ => Err(format!("unknown log format: {}", s)),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Minimum level for storefront events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// One step more verbose, for `--verbose`.
    pub fn louder(self) -> Self {
        match self {
            LogLevel::Trace | LogLevel::Debug => LogLevel::Trace,
            LogLevel::Info => LogLevel::Debug,
            LogLevel::Warn => LogLevel::Info,
            LogLevel::Error => LogLevel::Warn,
            LogLevel::Off => LogLevel::Error,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "quiet" => Ok(LogLevel::Off),
            _ => Err(format!("unknown log level: {}", s)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        };
        f.write_str(s)
    }
}

/// Filter directives for `level`, e.g. `store_commerce=debug,store_data=debug,...`.
pub fn default_directives(level: LogLevel) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber.
///
/// Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<(), AppError> {
    let level = if verbose {
        config.level.louder()
    } else {
        config.level
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let result = match config.format {
        LogFormat::Human => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(std::io::stderr().is_terminal()),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .try_init(),
    };

    result.map_err(|e| AppError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_and_level() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("human".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert!("xml".parse::<LogFormat>().is_err());

        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_verbose_is_one_step_louder() {
        assert_eq!(LogLevel::Info.louder(), LogLevel::Debug);
        assert_eq!(LogLevel::Trace.louder(), LogLevel::Trace);
        assert_eq!(LogLevel::Off.louder(), LogLevel::Error);
    }

    #[test]
    fn test_default_directives() {
        let directives = default_directives(LogLevel::Debug);
        assert!(directives.starts_with("store_commerce=debug,"));
        assert!(directives.ends_with("storefront=debug"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config, false);
        let second = init_logging(&config, false);
        assert!(matches!(second, Err(AppError::Logging(_))));
    }
}
