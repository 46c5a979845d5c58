//! Timestamp formatting utilities
//!
//! Events carry a UTC timestamp; appenders render it with one of these
//! formats. The default shows local time with its offset so the time zone
//! of the writing system is never ambiguous.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write;
use serde::{Deserialize, Serialize};

/// Timestamp format options
///
/// # Examples
///
/// ```
/// use bit_log::core::TimestampFormat;
/// use chrono::Utc;
///
/// let stamp = TimestampFormat::Iso8601.format(&Utc::now());
/// assert!(stamp.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Local time with offset: `2025-01-08T11:30:45.123+01:00`
    #[default]
    Iso8601Offset,

    /// UTC with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// RFC 3339 format: `2025-01-08T10:30:45.123456+00:00`
    Rfc3339,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format, rendered in local time
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601Offset => datetime
                .with_timezone(&Local)
                .format("%Y-%m-%dT%H:%M:%S%.3f%:z")
                .to_string(),
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => {
                let mut out = String::new();
                let local = datetime.with_timezone(&Local);
                if write!(out, "{}", local.format(format_str)).is_err() {
                    return TimestampFormat::Iso8601Offset.format(datetime);
                }
                out
            }
        }
    }

    /// Whether every specifier of a `Custom` format is understood by chrono
    pub fn is_valid(&self) -> bool {
        match self {
            TimestampFormat::Custom(format_str) => {
                !StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error))
            }
            _ => true,
        }
    }
}

/// `YYYY-MM-DD` of the local calendar day containing `datetime`
pub fn local_date(datetime: &DateTime<Utc>) -> String {
    datetime.with_timezone(&Local).format("%Y-%m-%d").to_string()
}
