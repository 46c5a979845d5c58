//! Named logger nodes of the hierarchy

use super::{
    appender::Appender,
    dispatch::Dispatcher,
    log_event::{CallSite, LogEvent, Payload},
    log_level::LogLevel,
};
use parking_lot::RwLock;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Name shown for the root logger in diagnostics
pub const ROOT_DISPLAY_NAME: &str = "ROOT";

/// A node of the logger tree.
///
/// Loggers are created by a [`LoggingContext`](super::context::LoggingContext)
/// and live as long as it does. Level and call-site flag fall back to the
/// nearest ancestor that sets them; events nobody here wants to handle are
/// passed to the parent.
pub struct Logger {
    name: String,
    parent: Option<Arc<Logger>>,
    level: RwLock<Option<LogLevel>>,
    include_call_site: RwLock<Option<bool>>,
    appenders: RwLock<Vec<(String, Arc<dyn Appender>)>>,
    dispatcher: Arc<Dispatcher>,
}

impl Logger {
    #[must_use]
    pub fn new(name: impl Into<String>, parent: Option<Arc<Logger>>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            name: name.into(),
            parent,
            level: RwLock::new(None),
            include_call_site: RwLock::new(None),
            appenders: RwLock::new(Vec::new()),
            dispatcher,
        }
    }

    /// Full dotted name; empty for the root
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            ROOT_DISPLAY_NAME
        } else {
            &self.name
        }
    }

    pub fn parent(&self) -> Option<&Arc<Logger>> {
        self.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Effective level: own, else the nearest ancestor's, else the default
    pub fn level(&self) -> LogLevel {
        if let Some(level) = *self.level.read() {
            return level;
        }
        self.parent
            .as_ref()
            .map_or(LogLevel::DEFAULT, |parent| parent.level())
    }

    pub fn own_level(&self) -> Option<LogLevel> {
        *self.level.read()
    }

    pub fn set_level(&self, level: LogLevel) {
        *self.level.write() = Some(level);
    }

    /// Go back to inheriting the level
    pub fn clear_level(&self) {
        *self.level.write() = None;
    }

    pub fn include_call_site(&self) -> bool {
        if let Some(include) = *self.include_call_site.read() {
            return include;
        }
        self.parent
            .as_ref()
            .is_some_and(|parent| parent.include_call_site())
    }

    pub fn set_include_call_site(&self, include: bool) {
        *self.include_call_site.write() = Some(include);
    }

    #[inline]
    pub fn should_log(&self, level: LogLevel) -> bool {
        level >= self.level() && level < LogLevel::OFF
    }

    /// Attach `appender` under `name`.
    ///
    /// An existing entry is only replaced when `overwrite` is set, keeping
    /// its position. Returns whether the logger changed.
    pub fn add_appender(&self, name: impl Into<String>, appender: Arc<dyn Appender>, overwrite: bool) -> bool {
        let name = name.into();
        let mut appenders = self.appenders.write();
        match appenders.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) if overwrite => {
                entry.1 = appender;
                true
            }
            Some(_) => false,
            None => {
                appenders.push((name, appender));
                true
            }
        }
    }

    pub fn remove_appender(&self, name: &str) -> bool {
        let mut appenders = self.appenders.write();
        let before = appenders.len();
        appenders.retain(|(existing, _)| existing != name);
        appenders.len() != before
    }

    pub fn appender(&self, name: &str) -> Option<Arc<dyn Appender>> {
        self.appenders
            .read()
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, appender)| Arc::clone(appender))
    }

    pub fn has_appender(&self, name: &str) -> bool {
        self.appenders.read().iter().any(|(existing, _)| existing == name)
    }

    /// Attached appender names in registration order
    pub fn appender_names(&self) -> Vec<String> {
        self.appenders.read().iter().map(|(name, _)| name.clone()).collect()
    }

    /// Hand `event` to every own appender willing to take it.
    ///
    /// If none is, the parent gets the event instead. Returns whether any
    /// logger on the way handled it. The level of this logger is not
    /// consulted here.
    pub fn emit(&self, event: Arc<LogEvent>) -> bool {
        let appenders = self.appenders.read().clone();

        let mut handled = false;
        for (name, appender) in appenders {
            if appender.will_handle(&event) {
                self.dispatcher.dispatch(&name, appender, Arc::clone(&event));
                handled = true;
            }
        }

        if handled {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.emit(event),
            None => false,
        }
    }

    /// Log at an arbitrary level.
    ///
    /// Nothing is evaluated unless the level passes the gate; levels at or
    /// above [`LogLevel::OFF`] are never logged.
    #[track_caller]
    pub fn log(&self, level: LogLevel, payload: impl Into<Payload>) {
        if !self.should_log(level) {
            return;
        }

        let call_site = self
            .include_call_site()
            .then(|| CallSite::from(Location::caller()));

        let mut event = LogEvent::new(level, self.name.clone(), payload.into().resolve());
        event.call_site = call_site;

        self.emit(Arc::new(event));
    }

    #[track_caller]
    #[inline]
    pub fn trace(&self, payload: impl Into<Payload>) {
        self.log(LogLevel::TRACE, payload);
    }

    #[track_caller]
    #[inline]
    pub fn debug(&self, payload: impl Into<Payload>) {
        self.log(LogLevel::DEBUG, payload);
    }

    #[track_caller]
    #[inline]
    pub fn info(&self, payload: impl Into<Payload>) {
        self.log(LogLevel::INFO, payload);
    }

    #[track_caller]
    #[inline]
    pub fn warn(&self, payload: impl Into<Payload>) {
        self.log(LogLevel::WARN, payload);
    }

    #[track_caller]
    #[inline]
    pub fn error(&self, payload: impl Into<Payload>) {
        self.log(LogLevel::ERROR, payload);
    }

    #[track_caller]
    #[inline]
    pub fn fatal(&self, payload: impl Into<Payload>) {
        self.log(LogLevel::FATAL, payload);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &*self.level.read())
            .field("include_call_site", &*self.include_call_site.read())
            .field("appenders", &self.appender_names())
            .finish()
    }
}
