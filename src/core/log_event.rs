//! Log event structure

use super::formatter::format_any;
use super::log_level::LogLevel;
use super::error::Result;
use super::value::Value;
use chrono::{DateTime, Utc};
use std::fmt;
use std::panic::Location;

/// Where a log call was made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl From<&Location<'_>> for CallSite {
    fn from(location: &Location<'_>) -> Self {
        Self {
            file: location.file().to_string(),
            line: location.line(),
            column: location.column(),
        }
    }
}

/// What an event carries once it reaches the appenders.
#[derive(Debug, Clone)]
pub enum EventPayload {
    /// The arguments of the log call, rendered one by one
    Values(Vec<Value>),
    /// The result of a lazily built message, printed verbatim
    Message(String),
}

impl EventPayload {
    /// Render for output: values are formatted and joined with a space.
    pub fn render(&self, pretty: bool, colored: bool) -> Result<String> {
        match self {
            EventPayload::Message(message) => Ok(message.clone()),
            EventPayload::Values(values) => Ok(values
                .iter()
                .map(|value| format_any(value, pretty, colored))
                .collect::<Result<Vec<_>>>()?
                .join(" ")),
        }
    }
}

/// The argument of a severity method, before the level gate.
pub enum Payload {
    Values(Vec<Value>),
    Lazy(Box<dyn FnOnce() -> String + Send>),
}

impl Payload {
    /// Turn into an event payload, running a lazy message builder.
    pub(crate) fn resolve(self) -> EventPayload {
        match self {
            Payload::Values(values) => EventPayload::Values(values),
            Payload::Lazy(build) => EventPayload::Message(build()),
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Values(values) => f.debug_tuple("Values").field(values).finish(),
            Payload::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// A message builder that only runs if the event passes the level gate.
///
/// ```
/// use bit_log::{lazy, LoggingContext, LogLevel};
///
/// let ctx = LoggingContext::new();
/// let log = ctx.use_logger_at("db", LogLevel::INFO);
/// log.debug(lazy(|| unreachable!("never built below INFO")));
/// ```
pub struct Lazy<F>(F);

pub fn lazy<F>(build: F) -> Lazy<F>
where
    F: FnOnce() -> String + Send + 'static,
{
    Lazy(build)
}

impl<F> From<Lazy<F>> for Payload
where
    F: FnOnce() -> String + Send + 'static,
{
    fn from(lazy: Lazy<F>) -> Self {
        Payload::Lazy(Box::new(lazy.0))
    }
}

impl From<Vec<Value>> for Payload {
    fn from(values: Vec<Value>) -> Self {
        Payload::Values(values)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Values(vec![value])
    }
}

impl From<&str> for Payload {
    fn from(message: &str) -> Self {
        Payload::Values(vec![Value::from(message)])
    }
}

impl From<String> for Payload {
    fn from(message: String) -> Self {
        Payload::Values(vec![Value::Str(message)])
    }
}

/// One logging call. Shared read-only between the appenders that take it.
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: LogLevel,
    pub logger_name: String,
    pub payload: EventPayload,
    pub timestamp: DateTime<Utc>,
    pub call_site: Option<CallSite>,
}

impl LogEvent {
    pub fn new(level: LogLevel, logger_name: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            level,
            logger_name: logger_name.into(),
            payload,
            timestamp: Utc::now(),
            call_site: None,
        }
    }

    pub fn with_call_site(mut self, call_site: CallSite) -> Self {
        self.call_site = Some(call_site);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values;

    #[test]
    fn test_payload_render() {
        let payload = EventPayload::Values(values!["count:", 3, vec![1, 2]]);
        assert_eq!(payload.render(false, false).unwrap(), "count: 3 [ 1, 2 ]");

        let payload = EventPayload::Message("built lazily".to_string());
        assert_eq!(payload.render(true, true).unwrap(), "built lazily");
    }

    #[test]
    fn test_lazy_payload_runs_on_resolve() {
        let payload: Payload = lazy(|| "late".to_string()).into();
        assert!(matches!(payload.resolve(), EventPayload::Message(m) if m == "late"));
    }

    #[test]
    fn test_call_site_from_location() {
        let site = CallSite::from(Location::caller());
        assert!(site.line > 0);
        assert!(!site.file.is_empty());
    }
}
