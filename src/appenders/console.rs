//! Console appender implementation

use crate::core::appender::{bool_option, AppenderBase};
use crate::core::{Appender, AppenderFactory, LogEvent, LogLevel, Result, TimestampFormat};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Which standard stream a console line goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

/// Receives every formatted console line
pub type ConsoleWriter = Arc<dyn Fn(ConsoleStream, &str) + Send + Sync>;

fn std_writer() -> ConsoleWriter {
    Arc::new(|stream: ConsoleStream, line: &str| match stream {
        ConsoleStream::Stdout => println!("{}", line),
        ConsoleStream::Stderr => eprintln!("{}", line),
    })
}

/// Writes one `prefix payload` line per event to the terminal.
///
/// Plain output unless `colored` is set.
///
/// Options: `colored`, `pretty`, `timestampFormat`, `useSpecificMethods`
/// (also accepted as `useSpecificStreams`).
pub struct ConsoleAppender {
    base: AppenderBase,
    use_specific_streams: bool,
    writer: ConsoleWriter,
}

impl ConsoleAppender {
    pub const KIND: &'static str = "ConsoleAppender";

    pub fn new() -> Self {
        Self {
            base: AppenderBase::default(),
            use_specific_streams: false,
            writer: std_writer(),
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        let mut appender = Self::new();
        appender.base.colored = use_colors;
        appender
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.base.level = Some(level);
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.base.pretty = pretty;
        self
    }

    /// Set the timestamp format for this appender
    ///
    /// # Examples
    ///
    /// ```
    /// use bit_log::appenders::ConsoleAppender;
    /// use bit_log::TimestampFormat;
    ///
    /// let appender = ConsoleAppender::new()
    ///     .with_timestamp_format(TimestampFormat::Iso8601);
    /// ```
    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.base.timestamp_format = format;
        self
    }

    /// Route ERROR and above to stderr, everything else to stdout.
    /// Without this every line goes to stdout.
    #[must_use]
    pub fn with_specific_streams(mut self, enabled: bool) -> Self {
        self.use_specific_streams = enabled;
        self
    }

    /// Send lines somewhere other than the process streams.
    #[must_use]
    pub fn with_writer(mut self, writer: ConsoleWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn factory() -> AppenderFactory {
        AppenderFactory::new(Self::KIND, || Ok(Box::new(ConsoleAppender::new())))
    }

    pub fn stream_for(&self, level: LogLevel) -> ConsoleStream {
        if self.use_specific_streams && level >= LogLevel::ERROR {
            ConsoleStream::Stderr
        } else {
            ConsoleStream::Stdout
        }
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConsoleAppender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleAppender")
            .field("base", &self.base)
            .field("use_specific_streams", &self.use_specific_streams)
            .finish()
    }
}

#[async_trait]
impl Appender for ConsoleAppender {
    fn kind(&self) -> &str {
        Self::KIND
    }

    fn level(&self) -> Option<LogLevel> {
        self.base.level
    }

    fn set_level(&mut self, level: Option<LogLevel>) {
        self.base.level = level;
    }

    async fn handle(&self, event: &LogEvent) -> Result<()> {
        if !self.base.will_handle(event) {
            return Ok(());
        }
        let line = self.base.format_line(event)?;
        (self.writer)(self.stream_for(event.level), &line);
        Ok(())
    }

    fn set_option(&mut self, key: &str, value: &serde_json::Value) -> Result<()> {
        if key == "useSpecificMethods" || key == "useSpecificStreams" {
            self.use_specific_streams = bool_option(Self::KIND, key, value)?;
            return Ok(());
        }
        if self.base.set_option(Self::KIND, key, value)? {
            Ok(())
        } else {
            Err(crate::core::LoggerError::unknown_option(Self::KIND, key))
        }
    }
}
