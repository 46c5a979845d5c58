//! Error types for the logging system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// A level name or number that does not denote a log level
    #[error("not a valid LogLevel: '{value}'")]
    InvalidLevel { value: String },

    /// Appender configuration without a usable constructor
    #[error("illegal appender config {config}")]
    IllegalAppenderConfig { config: String },

    /// Appender constructor or option application failed
    #[error("illegal appender config {config}, error: {cause}")]
    AppenderConstruction { config: String, cause: String },

    /// Option key not recognized by the appender
    #[error("unknown option '{key}' for {appender}")]
    UnknownOption { appender: String, key: String },

    /// Option value of the wrong shape
    #[error("invalid value for option '{key}' of {appender}: {message}")]
    InvalidOption {
        appender: String,
        key: String,
        message: String,
    },

    /// The same identity was handed to the circular tracker twice
    #[error("object must not be added twice (ref{index})")]
    AlreadyTracked { index: usize },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File appender error with path
    #[error("File appender error for '{path}': {message}")]
    FileAppenderError { path: String, message: String },

    /// The dispatch runtime is not running
    #[error("appender dispatcher is unavailable")]
    DispatcherUnavailable,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an invalid level error naming the offending value
    pub fn invalid_level(value: impl ToString) -> Self {
        LoggerError::InvalidLevel {
            value: value.to_string(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn unknown_option(appender: impl Into<String>, key: impl Into<String>) -> Self {
        LoggerError::UnknownOption {
            appender: appender.into(),
            key: key.into(),
        }
    }

    pub fn invalid_option(
        appender: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LoggerError::InvalidOption {
            appender: appender.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a file appender error
    pub fn file_appender(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileAppenderError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
