//! Logging configuration for the browser console subscriber.

use serde::Deserialize;

/// Default filter when none is configured.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Output format selection for console logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    Json,
    /// Human-readable lines.
    Pretty,
}

impl LogFormat {
    /// Choose a sensible default for the current build.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::infer()
    }
}

/// Console logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`info`, `trellis_ui=debug`, ...).
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            format: LogFormat::infer(),
        }
    }
}

/// Browser console method a record is written with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleMethod {
    /// `console.debug`
    Debug,
    /// `console.log`
    Log,
    /// `console.warn`
    Warn,
    /// `console.error`
    Error,
}

/// Map a tracing level onto the console method that shows it best.
#[must_use]
pub fn console_method(level: &tracing::Level) -> ConsoleMethod {
    match *level {
        tracing::Level::ERROR => ConsoleMethod::Error,
        tracing::Level::WARN => ConsoleMethod::Warn,
        tracing::Level::INFO => ConsoleMethod::Log,
        _ => ConsoleMethod::Debug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config: LoggingConfig = serde_json::from_str(r#"{"format":"json"}"#).expect("config");
        assert_eq!(config.level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(LoggingConfig::default().format, LogFormat::infer());
    }

    #[test]
    fn levels_map_to_console_methods() {
        assert_eq!(console_method(&tracing::Level::ERROR), ConsoleMethod::Error);
        assert_eq!(console_method(&tracing::Level::WARN), ConsoleMethod::Warn);
        assert_eq!(console_method(&tracing::Level::INFO), ConsoleMethod::Log);
        assert_eq!(console_method(&tracing::Level::TRACE), ConsoleMethod::Debug);
    }
}
