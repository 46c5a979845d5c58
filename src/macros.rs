//! Logging macros for ergonomic log message formatting.
//!
//! The level macros work like `format!`, but the message is only built
//! when the logger's level lets the call through.
//!
//! # Examples
//!
//! ```
//! use bit_log::prelude::*;
//! use bit_log::info;
//!
//! let ctx = LoggingContext::with_defaults();
//! let logger = ctx.use_logger("server");
//!
//! info!(logger, "Server started");
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! ```

/// Log a formatted message at an explicit level.
///
/// # Examples
///
/// ```
/// # use bit_log::prelude::*;
/// # let ctx = LoggingContext::new();
/// # let logger = ctx.use_logger("app");
/// use bit_log::log;
/// log!(logger, LogLevel::INFO, "Simple message");
/// log!(logger, LogLevel::ERROR, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level = $level;
        if logger.should_log(level) {
            let message = ::std::format!($($arg)+);
            logger.log(level, $crate::lazy(move || message));
        }
    }};
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use bit_log::prelude::*;
/// # let ctx = LoggingContext::new();
/// # let logger = ctx.use_logger_at("app", LogLevel::TRACE);
/// use bit_log::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::TRACE, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::DEBUG, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use bit_log::prelude::*;
/// # let ctx = LoggingContext::new();
/// # let logger = ctx.use_logger("app");
/// use bit_log::info;
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::INFO, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::WARN, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use bit_log::prelude::*;
/// # let ctx = LoggingContext::new();
/// # let logger = ctx.use_logger("app");
/// use bit_log::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "HTTP error: {} {}", 404, "Not Found");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::ERROR, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::FATAL, $($arg)+)
    };
}

/// Build a multi-value payload; each argument is rendered on its own.
///
/// ```
/// # use bit_log::prelude::*;
/// # let ctx = LoggingContext::new();
/// # let logger = ctx.use_logger("app");
/// use bit_log::values;
/// logger.error(values!["request failed:", 503, vec!["retry", "later"]]);
/// ```
#[macro_export]
macro_rules! values {
    ($($value:expr),* $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),*]
    };
}
