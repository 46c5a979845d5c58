//! Appender trait for log output destinations

use super::error::{LoggerError, Result};
use super::formatter::{paint, truncate_or_extend, truncate_or_extend_left};
use super::log_event::LogEvent;
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use async_trait::async_trait;

/// Width of the logger name column in the line prefix
pub const LOGGER_NAME_WIDTH: usize = 20;
/// Width of the call-site path in the line prefix
pub const CALL_SITE_PATH_WIDTH: usize = 50;

/// An output sink, registered under a name and shared by every logger that
/// lists that name.
///
/// `handle` runs on the dispatcher, detached from the log call. It must not
/// log through the hierarchy itself; errors it returns are reported to the
/// dispatcher's error sink.
///
/// # Example
///
/// ```
/// use bit_log::core::{Appender, LogEvent, LogLevel, Result};
/// use async_trait::async_trait;
///
/// struct Discard {
///     level: Option<LogLevel>,
/// }
///
/// #[async_trait]
/// impl Appender for Discard {
///     fn kind(&self) -> &str {
///         "Discard"
///     }
///
///     fn level(&self) -> Option<LogLevel> {
///         self.level
///     }
///
///     fn set_level(&mut self, level: Option<LogLevel>) {
///         self.level = level;
///     }
///
///     async fn handle(&self, _event: &LogEvent) -> Result<()> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Appender: Send + Sync {
    /// Type name used in configuration and diagnostics
    fn kind(&self) -> &str;

    fn level(&self) -> Option<LogLevel>;

    fn set_level(&mut self, level: Option<LogLevel>);

    /// Cheap, side-effect-free check whether `handle` would output the event
    fn will_handle(&self, event: &LogEvent) -> bool {
        self.level().map_or(true, |threshold| event.level >= threshold)
    }

    async fn handle(&self, event: &LogEvent) -> Result<()>;

    /// Apply one configuration property. Unknown keys are rejected.
    fn set_option(&mut self, key: &str, _value: &serde_json::Value) -> Result<()> {
        Err(LoggerError::unknown_option(self.kind(), key))
    }

    /// Release held resources. Never called by the loggers themselves.
    fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// State and helpers shared by the bundled appenders.
#[derive(Debug, Clone, Default)]
pub struct AppenderBase {
    pub level: Option<LogLevel>,
    pub colored: bool,
    pub pretty: bool,
    pub timestamp_format: TimestampFormat,
}

impl AppenderBase {
    pub fn new(level: Option<LogLevel>) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn will_handle(&self, event: &LogEvent) -> bool {
        self.level.map_or(true, |threshold| event.level >= threshold)
    }

    /// `timestamp level [logger name] (file:line:column):`
    pub fn format_prefix(&self, event: &LogEvent) -> String {
        let level = format!("{:>5}", event.level.name());
        let level = if self.colored {
            paint(level, event.level.color())
        } else {
            level
        };
        let name = truncate_or_extend(&event.logger_name, LOGGER_NAME_WIDTH);
        let timestamp = self.timestamp_format.format(&event.timestamp);

        let call_site = event
            .call_site
            .as_ref()
            .map(|site| {
                format!(
                    " ({}:{:>4}:{:>2})",
                    truncate_or_extend_left(&site.file, CALL_SITE_PATH_WIDTH),
                    site.line,
                    site.column
                )
            })
            .unwrap_or_default();

        format!("{} {} [{}]{}:", timestamp, level, name, call_site)
    }

    pub fn render_payload(&self, event: &LogEvent) -> Result<String> {
        event.payload.render(self.pretty, self.colored)
    }

    /// Prefix and payload as one line, without a line terminator
    pub fn format_line(&self, event: &LogEvent) -> Result<String> {
        Ok(format!(
            "{} {}",
            self.format_prefix(event),
            self.render_payload(event)?
        ))
    }

    /// Apply one of the common options. Returns `Ok(false)` for keys it does
    /// not know so the caller can try its own.
    pub fn set_option(&mut self, appender: &str, key: &str, value: &serde_json::Value) -> Result<bool> {
        match key {
            "colored" => self.colored = bool_option(appender, key, value)?,
            "pretty" => self.pretty = bool_option(appender, key, value)?,
            "timestampFormat" => {
                let format: TimestampFormat = serde_json::from_value(value.clone())
                    .map_err(|e| LoggerError::invalid_option(appender, key, e.to_string()))?;
                if !format.is_valid() {
                    return Err(LoggerError::invalid_option(
                        appender,
                        key,
                        format!("unsupported strftime format {}", value),
                    ));
                }
                self.timestamp_format = format;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

pub fn bool_option(appender: &str, key: &str, value: &serde_json::Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| LoggerError::invalid_option(appender, key, format!("expected a boolean, got {}", value)))
}

pub fn string_option(appender: &str, key: &str, value: &serde_json::Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| LoggerError::invalid_option(appender, key, format!("expected a string, got {}", value)))
}
