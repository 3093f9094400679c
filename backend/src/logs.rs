//! Pipeline diagnostics.
//!
//! Every stage reports what it did (rows dropped, groups built, cells skipped)
//! through the `log_*` functions below. Entries go to stderr so stdout stays
//! reserved for command output, and they are silent unless `BUDGET_PIVOT_LOG`
//! asks for them: a successful run prints only its confirmation line.
//!
//! ```text
//! BUDGET_PIVOT_LOG=info     # everything
//! BUDGET_PIVOT_LOG=warning  # warnings and errors
//! BUDGET_PIVOT_LOG=error    # errors only
//! BUDGET_PIVOT_LOG=off      # nothing (default)
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable selecting the minimum level shown.
pub const LOG_ENV_VAR: &str = "BUDGET_PIVOT_LOG";

/// Log level for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn rank(self) -> u8 {
        match self {
            LogLevel::Info | LogLevel::Success => 1,
            LogLevel::Warning => 2,
            LogLevel::Error => 3,
        }
    }
}

/// Threshold that hides every level.
const RANK_OFF: u8 = 4;

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Optional indentation level (for nested logs)
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Render the entry the way it is printed.
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        let indent = "   ".repeat(self.indent as usize);
        format!("{}{} {}", indent, prefix, self.message)
    }
}

/// Parse a `BUDGET_PIVOT_LOG` value into a threshold rank.
///
/// Unknown values fall back to silence.
pub fn parse_threshold(value: &str) -> u8 {
    match value.trim().to_lowercase().as_str() {
        "info" | "debug" | "all" => LogLevel::Info.rank(),
        "warning" | "warn" => LogLevel::Warning.rank(),
        "error" => LogLevel::Error.rank(),
        _ => RANK_OFF,
    }
}

/// Global logger
pub static LOGGER: Lazy<Logger> = Lazy::new(Logger::from_env);

/// Writes log entries at or above a minimum level to stderr
pub struct Logger {
    min_rank: AtomicU8,
}

impl Logger {
    /// Logger that shows nothing until a threshold is set.
    pub fn new() -> Self {
        Self { min_rank: AtomicU8::new(RANK_OFF) }
    }

    /// Logger configured from `BUDGET_PIVOT_LOG`.
    pub fn from_env() -> Self {
        let logger = Self::new();
        if let Ok(value) = std::env::var(LOG_ENV_VAR) {
            logger.min_rank.store(parse_threshold(&value), Ordering::Relaxed);
        }
        logger
    }

    /// Change the minimum level shown.
    pub fn set_threshold(&self, rank: u8) {
        self.min_rank.store(rank, Ordering::Relaxed);
    }

    /// Whether an entry of this level would be printed.
    pub fn enabled(&self, level: LogLevel) -> bool {
        level.rank() >= self.min_rank.load(Ordering::Relaxed)
    }

    /// Print an entry if its level passes the threshold
    pub fn log(&self, entry: LogEntry) {
        if self.enabled(entry.level) {
            eprintln!("{}", entry.render());
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    LOGGER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOGGER.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOGGER.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOGGER.log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOGGER.log(LogEntry::info(msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("info"), 1);
        assert_eq!(parse_threshold(" WARN "), 2);
        assert_eq!(parse_threshold("error"), 3);
        assert_eq!(parse_threshold("off"), RANK_OFF);
        assert_eq!(parse_threshold("verbose-ish"), RANK_OFF);
    }

    #[test]
    fn test_default_logger_is_silent() {
        let logger = Logger::new();
        assert!(!logger.enabled(LogLevel::Error));
    }

    #[test]
    fn test_threshold_filters_levels() {
        let logger = Logger::new();
        logger.set_threshold(parse_threshold("warning"));
        assert!(!logger.enabled(LogLevel::Info));
        assert!(!logger.enabled(LogLevel::Success));
        assert!(logger.enabled(LogLevel::Warning));
        assert!(logger.enabled(LogLevel::Error));
    }

    #[test]
    fn test_render_indent_and_prefix() {
        let entry = LogEntry::success("3 groups").with_indent(1);
        assert_eq!(entry.render(), "      ✓ 3 groups");
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let json = serde_json::to_value(LogEntry::warning("x")).unwrap();
        assert_eq!(json["level"], "warning");
        assert_eq!(json["indent"], 0);
    }
}
