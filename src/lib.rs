//! # bit_log
//!
//! Hierarchical logging: named loggers in a dot-separated tree, level
//! inheritance, shared appenders and a value formatter that copes with
//! cyclic data.
//!
//! ## Features
//!
//! - **Logger tree**: `a.b.c` inherits its level from `a.b`, `a`, then the root
//! - **Shared appenders**: registered once by name, attached to any number of loggers
//! - **Lazy messages**: closures and format macros only run when the level allows
//! - **Detached output**: appenders run on a background dispatcher, never blocking the caller
//!
//! ```
//! use bit_log::prelude::*;
//!
//! let ctx = LoggingContext::new();
//! ctx.configure(&LoggingConfig::console_default()).unwrap();
//!
//! let log = ctx.use_logger("app.http");
//! log.info(values!["listening on", 8080]);
//! log.debug(lazy(|| "not built at INFO".to_string()));
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, FileAppender};
    pub use crate::core::{
        configure_logging, lazy, use_logger, use_logger_at, Appender, AppenderConfig,
        AppenderFactory, LogEvent, LogLevel, Logger, LoggerConfig, LoggerError, LoggingConfig,
        LoggingContext, Record, Result, Value,
    };
    pub use crate::values;
}

pub use appenders::{ConsoleAppender, FileAppender};
pub use core::{
    configure_logging, format_any, lazy, reset_logging, to_level, use_logger, use_logger_at,
    Appender, AppenderConfig, AppenderCtor, AppenderFactory, ClassDescriptor, EventPayload,
    LevelSpec, LogEvent, LogLevel, Logger, LoggerConfig, LoggerError, LoggingConfig,
    LoggingContext, Payload, Record, Result, TimestampFormat, Value, DEFAULT_SHUTDOWN_TIMEOUT,
};
