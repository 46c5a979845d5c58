//! Declarative logging configuration
//!
//! A [`LoggingConfig`] names appenders, the root logger setup and per-logger
//! setups. It can be built in code or loaded from JSON:
//!
//! ```
//! use bit_log::core::LoggingConfig;
//!
//! let config = LoggingConfig::from_json(r#"{
//!     "appender": { "CONSOLE": { "ctor": "ConsoleAppender", "colored": true } },
//!     "root": { "level": "INFO", "appender": ["CONSOLE"] },
//!     "logger": { "db": { "level": "DEBUG", "includeCallSite": true } }
//! }"#).unwrap();
//! assert_eq!(config.logger["db"].include_call_site, Some(true));
//! ```

use super::appender::Appender;
use super::error::{LoggerError, Result};
use super::formatter::format_any;
use super::log_level::{LevelSpec, LogLevel};
use super::value::{ClassDescriptor, Record, Value};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub type AppenderBuilder = Arc<dyn Fn() -> Result<Box<dyn Appender>> + Send + Sync>;

/// A named way to construct an appender instance.
#[derive(Clone)]
pub struct AppenderFactory {
    name: String,
    build: AppenderBuilder,
}

impl AppenderFactory {
    pub fn new<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Appender>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            build: Arc::new(build),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build(&self) -> Result<Box<dyn Appender>> {
        (self.build)()
    }
}

impl fmt::Debug for AppenderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppenderFactory").field("name", &self.name).finish()
    }
}

/// How to construct an appender: a registered kind name or a factory.
#[derive(Debug, Clone)]
pub enum AppenderCtor {
    Kind(String),
    Factory(AppenderFactory),
}

impl AppenderCtor {
    pub fn name(&self) -> &str {
        match self {
            AppenderCtor::Kind(kind) => kind,
            AppenderCtor::Factory(factory) => factory.name(),
        }
    }
}

impl From<&str> for AppenderCtor {
    fn from(kind: &str) -> Self {
        AppenderCtor::Kind(kind.to_string())
    }
}

impl From<String> for AppenderCtor {
    fn from(kind: String) -> Self {
        AppenderCtor::Kind(kind)
    }
}

impl From<AppenderFactory> for AppenderCtor {
    fn from(factory: AppenderFactory) -> Self {
        AppenderCtor::Factory(factory)
    }
}

impl<'de> Deserialize<'de> for AppenderCtor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(AppenderCtor::Kind)
    }
}

/// One entry of the appender section.
///
/// Every key besides `ctor` and `level` is an option handed to
/// [`Appender::set_option`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppenderConfig {
    #[serde(default)]
    pub ctor: Option<AppenderCtor>,
    #[serde(default)]
    pub level: Option<LevelSpec>,
    #[serde(flatten)]
    pub options: BTreeMap<String, serde_json::Value>,
}

impl AppenderConfig {
    #[must_use]
    pub fn new(ctor: impl Into<AppenderCtor>) -> Self {
        Self {
            ctor: Some(ctor.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn level(mut self, level: impl Into<LevelSpec>) -> Self {
        self.level = Some(level.into());
        self
    }

    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// The entry as a formattable value, constructor shown as a class
    pub fn to_value(&self) -> Value {
        let mut record = Record::new();
        if let Some(ctor) = &self.ctor {
            record = record.field("ctor", ClassDescriptor::new(ctor.name()));
        }
        if let Some(level) = &self.level {
            let level = match level {
                LevelSpec::Number(n) => Value::from(*n),
                LevelSpec::Name(name) => Value::from(name.as_str()),
            };
            record = record.field("level", level);
        }
        for (key, value) in &self.options {
            record = record.field(key.as_str(), Value::from(value));
        }
        Value::object(record)
    }

    /// Single-line rendering used in configuration errors
    pub fn render(&self) -> String {
        format_any(&self.to_value(), false, false).unwrap_or_else(|_| format!("{:?}", self))
    }
}

/// Setup of one logger. An absent appender list detaches every appender.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerConfig {
    #[serde(default)]
    pub level: Option<LevelSpec>,
    #[serde(default)]
    pub include_call_site: Option<bool>,
    #[serde(default)]
    pub appender: Option<Vec<String>>,
}

impl LoggerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn level(mut self, level: impl Into<LevelSpec>) -> Self {
        self.level = Some(level.into());
        self
    }

    #[must_use]
    pub fn include_call_site(mut self, include: bool) -> Self {
        self.include_call_site = Some(include);
        self
    }

    #[must_use]
    pub fn appenders<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.appender = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub appender: BTreeMap<String, AppenderConfig>,
    #[serde(default)]
    pub root: Option<LoggerConfig>,
    #[serde(default)]
    pub logger: BTreeMap<String, LoggerConfig>,
}

impl LoggingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// A `CONSOLE` console appender on the root logger at INFO
    #[must_use]
    pub fn console_default() -> Self {
        Self::new()
            .appender("CONSOLE", AppenderConfig::new("ConsoleAppender"))
            .root(LoggerConfig::new().level(LogLevel::INFO).appenders(["CONSOLE"]))
    }

    #[must_use]
    pub fn appender(mut self, name: impl Into<String>, config: AppenderConfig) -> Self {
        self.appender.insert(name.into(), config);
        self
    }

    #[must_use]
    pub fn root(mut self, config: LoggerConfig) -> Self {
        self.root = Some(config);
        self
    }

    #[must_use]
    pub fn logger(mut self, name: impl Into<String>, config: LoggerConfig) -> Self {
        self.logger.insert(name.into(), config);
        self
    }

    /// Check every level in the configuration.
    pub fn validate_levels(&self) -> Result<()> {
        let appender_levels = self.appender.values().filter_map(|c| c.level.as_ref());
        let logger_levels = self
            .root
            .iter()
            .chain(self.logger.values())
            .filter_map(|c| c.level.as_ref());

        for spec in appender_levels.chain(logger_levels) {
            spec.to_level()?;
        }
        Ok(())
    }
}

impl TryFrom<&str> for LoggingConfig {
    type Error = LoggerError;

    fn try_from(json: &str) -> Result<Self> {
        Self::from_json(json)
    }
}
