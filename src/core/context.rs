//! Registry of loggers and appenders, and the configuration applier

use super::{
    appender::Appender,
    config::{AppenderConfig, AppenderCtor, AppenderFactory, LoggerConfig, LoggingConfig},
    dispatch::{panic_message, Dispatcher, ErrorSink},
    error::{LoggerError, Result},
    log_level::LogLevel,
    logger::Logger,
};
use crate::appenders::{ConsoleAppender, FileAppender};
use crate::{debug, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Name of the logger reporting configuration changes
pub const INTERNAL_LOGGER: &str = "bit.log";

/// Loggers, appenders and the dispatcher behind them.
///
/// Most programs use the process-wide instance through [`use_logger`] and
/// [`configure_logging`]; tests and embedders can hold their own.
///
/// # Example
///
/// ```
/// use bit_log::{LoggingContext, LoggingConfig, AppenderConfig, LoggerConfig};
///
/// let ctx = LoggingContext::new();
/// ctx.configure(
///     &LoggingConfig::new()
///         .appender("CONSOLE", AppenderConfig::new("ConsoleAppender"))
///         .root(LoggerConfig::new().level("INFO").appenders(["CONSOLE"])),
/// )
/// .unwrap();
///
/// let log = ctx.use_logger("app.db");
/// log.info("connected");
/// log.trace("not shown");
/// ```
pub struct LoggingContext {
    loggers: RwLock<HashMap<String, Arc<Logger>>>,
    appenders: RwLock<HashMap<String, Arc<dyn Appender>>>,
    kinds: RwLock<HashMap<String, AppenderFactory>>,
    dispatcher: Arc<Dispatcher>,
}

impl LoggingContext {
    /// Empty registries with the bundled appender kinds available
    #[must_use]
    pub fn new() -> Self {
        let ctx = Self {
            loggers: RwLock::new(HashMap::new()),
            appenders: RwLock::new(HashMap::new()),
            kinds: RwLock::new(HashMap::new()),
            dispatcher: Arc::new(Dispatcher::new()),
        };
        ctx.register_appender_kind(ConsoleAppender::factory());
        ctx.register_appender_kind(FileAppender::factory());
        ctx
    }

    /// A `CONSOLE` console appender attached to the root logger at INFO
    #[must_use]
    pub fn with_defaults() -> Self {
        let ctx = Self::new();
        let console: Arc<dyn Appender> = Arc::new(ConsoleAppender::new());
        ctx.appenders.write().insert("CONSOLE".to_string(), Arc::clone(&console));
        let root = ctx.root();
        root.set_level(LogLevel::INFO);
        root.add_appender("CONSOLE", console, false);
        ctx
    }

    pub fn global() -> &'static LoggingContext {
        static GLOBAL: OnceLock<LoggingContext> = OnceLock::new();
        GLOBAL.get_or_init(LoggingContext::new)
    }

    /// Make `factory` available as a `ctor` kind name in configurations.
    pub fn register_appender_kind(&self, factory: AppenderFactory) {
        self.kinds.write().insert(factory.name().to_string(), factory);
    }

    pub fn root(&self) -> Arc<Logger> {
        self.use_logger("")
    }

    /// The logger for `name`, created along with any missing ancestors.
    ///
    /// `""` and `"root"` both name the root logger.
    pub fn use_logger(&self, name: &str) -> Arc<Logger> {
        let name = if name == "root" { "" } else { name };
        if let Some(logger) = self.loggers.read().get(name) {
            return Arc::clone(logger);
        }
        let mut loggers = self.loggers.write();
        self.get_or_create(&mut loggers, name)
    }

    /// Like [`use_logger`](Self::use_logger), then set the logger's own level.
    pub fn use_logger_at(&self, name: &str, level: LogLevel) -> Arc<Logger> {
        let logger = self.use_logger(name);
        logger.set_level(level);
        logger
    }

    fn get_or_create(&self, loggers: &mut HashMap<String, Arc<Logger>>, name: &str) -> Arc<Logger> {
        if let Some(logger) = loggers.get(name) {
            return Arc::clone(logger);
        }
        let parent = if name.is_empty() {
            None
        } else {
            let parent_name = name.rfind('.').map_or("", |index| &name[..index]);
            Some(self.get_or_create(loggers, parent_name))
        };
        let logger = Arc::new(Logger::new(name, parent, Arc::clone(&self.dispatcher)));
        loggers.insert(name.to_string(), Arc::clone(&logger));
        logger
    }

    pub fn appender(&self, name: &str) -> Option<Arc<dyn Appender>> {
        self.appenders.read().get(name).cloned()
    }

    /// Names of all created loggers, sorted; the root is `""`
    pub fn logger_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn set_error_sink(&self, sink: ErrorSink) {
        self.dispatcher.set_error_sink(sink);
    }

    /// Wait for pending appender output. Returns `false` on timeout.
    pub fn flush(&self, timeout: Duration) -> bool {
        self.dispatcher.flush(timeout)
    }

    /// Forget every logger and appender. Appender kinds stay registered.
    ///
    /// Loggers handed out before keep working but are no longer reachable
    /// through this context.
    pub fn reset(&self) {
        self.loggers.write().clear();
        self.appenders.write().clear();
    }

    /// Apply a configuration.
    ///
    /// All levels are validated first; an invalid one fails the call
    /// before anything changes. Appender construction failures abort the
    /// call at the failing entry.
    pub fn configure(&self, config: &LoggingConfig) -> Result<()> {
        config.validate_levels()?;

        let log = self.use_logger(INTERNAL_LOGGER);
        debug!(log, "configure logging");

        if !config.appender.is_empty() {
            debug!(log, "configure appender");
            for (name, appender_config) in &config.appender {
                self.configure_appender(&log, name, appender_config)?;
            }
        }

        if let Some(root_config) = &config.root {
            debug!(log, "configure ROOT logger");
            self.configure_logger(&log, &self.root(), root_config)?;
        }

        if !config.logger.is_empty() {
            debug!(log, "configure logger");
            for (name, logger_config) in &config.logger {
                let logger = self.use_logger(name);
                self.configure_logger(&log, &logger, logger_config)?;
            }
        }

        Ok(())
    }

    fn configure_appender(&self, log: &Logger, name: &str, config: &AppenderConfig) -> Result<()> {
        let instance = self.build_appender(config)?;
        let previous = self
            .appenders
            .write()
            .insert(name.to_string(), Arc::clone(&instance));

        if previous.is_some() {
            debug!(log, "found existing appender: {}, search and replace it", name);
            for logger in self.loggers_snapshot() {
                if logger.has_appender(name) {
                    debug!(log, "Replace appender {} in logger {}", name, logger.display_name());
                    logger.add_appender(name, Arc::clone(&instance), true);
                }
            }
        }
        Ok(())
    }

    fn build_appender(&self, config: &AppenderConfig) -> Result<Arc<dyn Appender>> {
        let factory = match &config.ctor {
            Some(AppenderCtor::Factory(factory)) => factory.clone(),
            Some(AppenderCtor::Kind(kind)) => match self.kinds.read().get(kind) {
                Some(factory) => factory.clone(),
                None => {
                    return Err(LoggerError::IllegalAppenderConfig {
                        config: config.render(),
                    })
                }
            },
            None => {
                return Err(LoggerError::IllegalAppenderConfig {
                    config: config.render(),
                })
            }
        };

        let construct = || -> Result<Box<dyn Appender>> {
            let mut appender = factory.build()?;
            if let Some(level) = &config.level {
                appender.set_level(Some(level.to_level()?));
            }
            for (key, value) in &config.options {
                appender.set_option(key, value)?;
            }
            Ok(appender)
        };

        let cause = match std::panic::catch_unwind(AssertUnwindSafe(construct)) {
            Ok(Ok(appender)) => return Ok(Arc::from(appender)),
            Ok(Err(e)) => e.to_string(),
            Err(panic_info) => panic_message(&*panic_info),
        };
        Err(LoggerError::AppenderConstruction {
            config: config.render(),
            cause,
        })
    }

    fn configure_logger(&self, log: &Logger, logger: &Logger, config: &LoggerConfig) -> Result<()> {
        if let Some(spec) = &config.level {
            let level = spec.to_level()?;
            if logger.own_level() != Some(level) {
                debug!(
                    log,
                    "changing {} logger level from {} to {}",
                    logger.display_name(),
                    logger.level(),
                    level
                );
                logger.set_level(level);
            }
        }

        logger.set_include_call_site(config.include_call_site.unwrap_or(false));

        let wanted = config.appender.as_deref().unwrap_or_default();
        for name in wanted {
            match self.appender(name) {
                Some(appender) => {
                    if !logger.has_appender(name) {
                        debug!(
                            log,
                            "registering appender '{}' to logger '{}'",
                            name,
                            logger.display_name()
                        );
                        logger.add_appender(name.as_str(), appender, true);
                    }
                }
                None => warn!(
                    log,
                    "Appender named '{}' is not configured. Can't be used in logger '{}'",
                    name,
                    logger.display_name()
                ),
            }
        }

        for attached in logger.appender_names() {
            if !wanted.contains(&attached) {
                logger.remove_appender(&attached);
                debug!(
                    log,
                    "appender '{}' was removed from logger '{}'",
                    attached,
                    logger.display_name()
                );
            }
        }
        Ok(())
    }

    fn loggers_snapshot(&self) -> Vec<Arc<Logger>> {
        let mut loggers: Vec<Arc<Logger>> = self.loggers.read().values().cloned().collect();
        loggers.sort_by(|a, b| a.name().cmp(b.name()));
        loggers
    }
}

impl Default for LoggingContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Logger `name` from the process-wide context
pub fn use_logger(name: &str) -> Arc<Logger> {
    LoggingContext::global().use_logger(name)
}

pub fn use_logger_at(name: &str, level: LogLevel) -> Arc<Logger> {
    LoggingContext::global().use_logger_at(name, level)
}

/// Apply `config` to the process-wide context
pub fn configure_logging(config: &LoggingConfig) -> Result<()> {
    LoggingContext::global().configure(config)
}

pub fn reset_logging() {
    LoggingContext::global().reset();
}
