//! Log level definitions
//!
//! Levels are plain numbers with a handful of named constants. Anything
//! between two named levels works as a finer-grained threshold set in code,
//! e.g. `LogLevel::threshold(15)` lets INFO through but not DEBUG.

use super::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "LevelSpec", into = "LevelSpec")]
pub struct LogLevel(u16);

/// Named levels in ascending order.
const NAMED_LEVELS: [(LogLevel, &str); 7] = [
    (LogLevel::TRACE, "TRACE"),
    (LogLevel::DEBUG, "DEBUG"),
    (LogLevel::INFO, "INFO"),
    (LogLevel::WARN, "WARN"),
    (LogLevel::ERROR, "ERROR"),
    (LogLevel::FATAL, "FATAL"),
    (LogLevel::OFF, "OFF"),
];

impl LogLevel {
    pub const TRACE: LogLevel = LogLevel(0);
    pub const DEBUG: LogLevel = LogLevel(10);
    pub const INFO: LogLevel = LogLevel(20);
    pub const WARN: LogLevel = LogLevel(30);
    pub const ERROR: LogLevel = LogLevel(40);
    pub const FATAL: LogLevel = LogLevel(50);
    /// Filter-only maximum. Nothing is ever logged at this severity.
    pub const OFF: LogLevel = LogLevel(1000);

    /// Level used by a root logger that never had one assigned
    pub const DEFAULT: LogLevel = LogLevel::ERROR;

    /// Build an ad-hoc threshold between the named levels.
    ///
    /// Accepts `0..=1000`; anything above `OFF` is rejected.
    ///
    /// ```
    /// use bit_log::LogLevel;
    ///
    /// let fine = LogLevel::threshold(12).unwrap();
    /// assert!(LogLevel::DEBUG < fine && fine < LogLevel::INFO);
    /// assert!(LogLevel::threshold(12345).is_err());
    /// ```
    pub fn threshold(value: u32) -> Result<Self> {
        if value > u32::from(Self::OFF.0) {
            return Err(LoggerError::invalid_level(value));
        }
        Ok(LogLevel(value as u16))
    }

    pub const fn value(self) -> u16 {
        self.0
    }

    /// True if this is one of the seven named levels
    pub fn is_named(self) -> bool {
        NAMED_LEVELS.iter().any(|(level, _)| *level == self)
    }

    /// Name of the highest named level that is not above this one.
    ///
    /// ```
    /// use bit_log::LogLevel;
    ///
    /// assert_eq!(LogLevel::WARN.name(), "WARN");
    /// assert_eq!(LogLevel::threshold(12).unwrap().name(), "DEBUG");
    /// ```
    pub fn name(self) -> &'static str {
        NAMED_LEVELS
            .iter()
            .rev()
            .find(|(level, _)| self >= *level)
            .map(|(_, name)| *name)
            .unwrap_or("TRACE")
    }

    /// Strict conversion: only the named levels are accepted.
    pub fn from_number(value: i64) -> Result<Self> {
        NAMED_LEVELS
            .iter()
            .find(|(level, _)| i64::from(level.0) == value)
            .map(|(level, _)| *level)
            .ok_or_else(|| LoggerError::invalid_level(value))
    }

    pub fn color(self) -> colored::Color {
        use colored::Color::*;
        match self.name() {
            "TRACE" => BrightBlack,
            "DEBUG" => White,
            "INFO" => BrightGreen,
            "WARN" => BrightYellow,
            "ERROR" => BrightRed,
            _ => BrightMagenta,
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_named() {
            f.write_str(self.name())
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        NAMED_LEVELS
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(level, _)| *level)
            .ok_or_else(|| LoggerError::invalid_level(s))
    }
}

/// A level as written in a configuration: a name or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelSpec {
    Number(i64),
    Name(String),
}

impl LevelSpec {
    /// Resolve to a named level, rejecting everything else.
    pub fn to_level(&self) -> Result<LogLevel> {
        match self {
            LevelSpec::Name(name) => name.parse(),
            LevelSpec::Number(value) => LogLevel::from_number(*value),
        }
    }
}

/// Convert a configured level to its canonical value.
///
/// ```
/// use bit_log::{to_level, LevelSpec, LogLevel};
///
/// assert_eq!(to_level(&"ERROR".into()).unwrap(), LogLevel::ERROR);
/// assert_eq!(to_level(&LevelSpec::Number(30)).unwrap(), LogLevel::WARN);
/// assert!(to_level(&"bogus".into()).is_err());
/// ```
pub fn to_level(spec: &LevelSpec) -> Result<LogLevel> {
    spec.to_level()
}

impl fmt::Display for LevelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelSpec::Name(name) => f.write_str(name),
            LevelSpec::Number(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for LevelSpec {
    fn from(name: &str) -> Self {
        LevelSpec::Name(name.to_string())
    }
}

impl From<String> for LevelSpec {
    fn from(name: String) -> Self {
        LevelSpec::Name(name)
    }
}

impl From<i64> for LevelSpec {
    fn from(value: i64) -> Self {
        LevelSpec::Number(value)
    }
}

impl From<LogLevel> for LevelSpec {
    fn from(level: LogLevel) -> Self {
        if level.is_named() {
            LevelSpec::Name(level.name().to_string())
        } else {
            LevelSpec::Number(i64::from(level.0))
        }
    }
}

impl TryFrom<LevelSpec> for LogLevel {
    type Error = LoggerError;

    fn try_from(spec: LevelSpec) -> Result<Self> {
        spec.to_level()
    }
}
