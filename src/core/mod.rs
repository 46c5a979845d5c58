//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod formatter;
pub mod log_event;
pub mod log_level;
pub mod logger;
pub mod timestamp;
pub mod value;

pub use appender::{Appender, AppenderBase};
pub use config::{AppenderConfig, AppenderCtor, AppenderFactory, LoggerConfig, LoggingConfig};
pub use context::{
    configure_logging, reset_logging, use_logger, use_logger_at, LoggingContext, INTERNAL_LOGGER,
};
pub use dispatch::{default_error_sink, Dispatcher, ErrorSink, DEFAULT_SHUTDOWN_TIMEOUT};
pub use error::{LoggerError, Result};
pub use formatter::{format_any, CircularTracker};
pub use log_event::{lazy, CallSite, EventPayload, Lazy, LogEvent, Payload};
pub use log_level::{to_level, LevelSpec, LogLevel};
pub use logger::{Logger, ROOT_DISPLAY_NAME};
pub use timestamp::TimestampFormat;
pub use value::{ClassDescriptor, Describe, Field, FieldValue, FunctionDescriptor, Record, Value};
