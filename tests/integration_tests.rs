//! Integration tests for the logger hierarchy
//!
//! These tests verify:
//! - Configuration end to end, from code and from JSON
//! - Appender replacement across loggers
//! - Appender reconciliation and missing-appender warnings
//! - Configuration errors
//! - Out-of-band reporting of appender failures
//! - Daily file output

use async_trait::async_trait;
use bit_log::appenders::{ConsoleAppender, ConsoleStream, FileAppender};
use bit_log::core::timestamp::local_date;
use bit_log::core::{EventPayload, LogEvent};
use bit_log::prelude::*;
use bit_log::{lazy, reset_logging, values, AppenderCtor};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

type Lines = Arc<Mutex<Vec<(ConsoleStream, String)>>>;

/// A context whose `ConsoleAppender` kind writes into a buffer
fn capturing_context() -> (LoggingContext, Lines) {
    let ctx = LoggingContext::new();
    let lines: Lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    ctx.register_appender_kind(AppenderFactory::new("ConsoleAppender", move || {
        let sink = Arc::clone(&sink);
        Ok(Box::new(ConsoleAppender::new().with_writer(Arc::new(
            move |stream: ConsoleStream, line: &str| sink.lock().push((stream, line.to_string())),
        ))))
    }));
    (ctx, lines)
}

fn texts(lines: &Lines) -> Vec<String> {
    lines.lock().iter().map(|(_, line)| line.clone()).collect()
}

/// Records every event it is handed
struct RecordingAppender {
    level: Option<LogLevel>,
    events: Arc<Mutex<Vec<LogEvent>>>,
}

#[async_trait]
impl Appender for RecordingAppender {
    fn kind(&self) -> &str {
        "RecordingAppender"
    }

    fn level(&self) -> Option<LogLevel> {
        self.level
    }

    fn set_level(&mut self, level: Option<LogLevel>) {
        self.level = level;
    }

    async fn handle(&self, event: &LogEvent) -> bit_log::Result<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

fn recording_factory(events: &Arc<Mutex<Vec<LogEvent>>>) -> AppenderFactory {
    let events = Arc::clone(events);
    AppenderFactory::new("RecordingAppender", move || {
        Ok(Box::new(RecordingAppender {
            level: None,
            events: Arc::clone(&events),
        }))
    })
}

#[test]
fn test_console_end_to_end() {
    let (ctx, lines) = capturing_context();
    ctx.configure(
        &LoggingConfig::new()
            .appender("CONSOLE", AppenderConfig::new("ConsoleAppender").option("colored", false))
            .root(LoggerConfig::new().appenders(["CONSOLE"]).level("INFO")),
    )
    .expect("configure");

    let logger = ctx.use_logger("a.b");
    logger.info("hello");
    logger.trace("ignored");
    assert!(ctx.flush(FLUSH_TIMEOUT));

    let lines = texts(&lines);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(" INFO [a.b"));
    assert!(lines[0].ends_with("]: hello"));
}

#[test]
fn test_config_from_json() {
    let (ctx, lines) = capturing_context();
    let config = LoggingConfig::from_json(
        r#"{
            "appender": {
                "CONSOLE": { "ctor": "ConsoleAppender", "colored": false, "level": "WARN" }
            },
            "root": { "level": "TRACE", "appender": ["CONSOLE"] },
            "logger": { "db": { "level": "ERROR" } }
        }"#,
    )
    .expect("parse");
    ctx.configure(&config).expect("configure");

    let db = ctx.use_logger("db.pool");
    assert_eq!(db.level(), LogLevel::ERROR);
    db.warn("filtered by the logger");
    db.error("shown");
    ctx.use_logger("web").info("filtered by the appender");
    assert!(ctx.flush(FLUSH_TIMEOUT));

    let lines = texts(&lines);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with("]: shown"));
}

#[test]
fn test_replacing_appender_updates_every_logger() {
    let ctx = LoggingContext::new();
    let first_events = Arc::new(Mutex::new(Vec::new()));
    let second_events = Arc::new(Mutex::new(Vec::new()));

    ctx.configure(
        &LoggingConfig::new()
            .appender("OUT", AppenderConfig::new(recording_factory(&first_events)))
            .logger("x", LoggerConfig::new().level("INFO").appenders(["OUT"]))
            .logger("y.z", LoggerConfig::new().level("INFO").appenders(["OUT"])),
    )
    .expect("first configure");
    let old = ctx.appender("OUT").expect("registered");

    ctx.configure(
        &LoggingConfig::new().appender("OUT", AppenderConfig::new(recording_factory(&second_events))),
    )
    .expect("second configure");
    let new = ctx.appender("OUT").expect("registered");
    assert!(!Arc::ptr_eq(&old, &new));

    for name in ["x", "y.z"] {
        let attached = ctx.use_logger(name).appender("OUT").expect("still attached");
        assert!(Arc::ptr_eq(&attached, &new), "{} kept the old instance", name);
    }

    ctx.use_logger("x").info("after reload");
    assert!(ctx.flush(FLUSH_TIMEOUT));
    assert!(first_events.lock().is_empty());
    assert_eq!(second_events.lock().len(), 1);
}

#[test]
fn test_reconcile_appender_lists() {
    let ctx = LoggingContext::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    ctx.configure(
        &LoggingConfig::new()
            .appender("A", AppenderConfig::new(recording_factory(&events)))
            .appender("B", AppenderConfig::new(recording_factory(&events)))
            .root(LoggerConfig::new().appenders(["A", "B"])),
    )
    .expect("configure");
    assert_eq!(ctx.root().appender_names(), vec!["A", "B"]);

    ctx.configure(&LoggingConfig::new().root(LoggerConfig::new().appenders(["B"])))
        .expect("configure");
    assert_eq!(ctx.root().appender_names(), vec!["B"]);

    ctx.configure(&LoggingConfig::new().root(LoggerConfig::new()))
        .expect("configure");
    assert!(ctx.root().appender_names().is_empty());
    assert!(ctx.appender("A").is_some());
}

#[test]
fn test_missing_appender_is_a_warning() {
    let (ctx, lines) = capturing_context();
    ctx.configure(
        &LoggingConfig::new()
            .appender("CONSOLE", AppenderConfig::new("ConsoleAppender").option("colored", false))
            .root(LoggerConfig::new().level("WARN").appenders(["CONSOLE", "MISSING"])),
    )
    .expect("a missing appender is not fatal");
    assert!(ctx.flush(FLUSH_TIMEOUT));

    assert_eq!(ctx.root().appender_names(), vec!["CONSOLE"]);
    let lines = texts(&lines);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(" WARN [bit.log"));
    assert!(lines[0]
        .ends_with("Appender named 'MISSING' is not configured. Can't be used in logger 'ROOT'"));
}

#[test]
fn test_internal_debug_messages() {
    let (ctx, lines) = capturing_context();
    ctx.configure(
        &LoggingConfig::new()
            .appender("CONSOLE", AppenderConfig::new("ConsoleAppender").option("colored", false))
            .root(LoggerConfig::new().level("DEBUG").appenders(["CONSOLE"])),
    )
    .expect("configure");
    ctx.configure(&LoggingConfig::new().root(LoggerConfig::new().level("INFO").appenders(["CONSOLE"])))
        .expect("configure");
    assert!(ctx.flush(FLUSH_TIMEOUT));

    let lines = texts(&lines);
    assert!(lines.iter().any(|l| l.ends_with("changing ROOT logger level from DEBUG to INFO")));
    assert!(lines.iter().all(|l| l.contains("[bit.log")));
}

#[test]
fn test_configuration_errors() {
    let ctx = LoggingContext::new();

    let err = ctx
        .configure(&LoggingConfig::new().appender(
            "X",
            AppenderConfig::default().option("someKey", 100).option("otherKey", "Hallo Welt"),
        ))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "illegal appender config { otherKey: 'Hallo Welt', someKey: 100 }"
    );

    let err = ctx
        .configure(&LoggingConfig::new().appender(
            "X",
            AppenderConfig::new("ConsoleAppender").option("bogus", 1),
        ))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "illegal appender config { ctor: [class ConsoleAppender], bogus: 1 }, \
         error: unknown option 'bogus' for ConsoleAppender"
    );

    let broken = AppenderFactory::new("Broken", || Err(LoggerError::other("no backend")));
    let err = ctx
        .configure(&LoggingConfig::new().appender("X", AppenderConfig::new(broken)))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "illegal appender config { ctor: [class Broken] }, error: no backend"
    );

    let err = ctx
        .configure(&LoggingConfig::new().root(LoggerConfig::new().level(12345_i64)))
        .unwrap_err();
    assert_eq!(err.to_string(), "not a valid LogLevel: '12345'");
    assert!(ctx.appender("X").is_none());
}

#[test]
fn test_panicking_factory_is_construction_error() {
    let ctx = LoggingContext::new();
    let factory = AppenderFactory::new("Panics", || panic!("constructor exploded"));
    let err = ctx
        .configure(&LoggingConfig::new().appender("P", AppenderConfig::new(factory)))
        .unwrap_err();
    assert!(matches!(err, LoggerError::AppenderConstruction { .. }));
    assert!(err.to_string().ends_with("error: constructor exploded"));
}

#[test]
fn test_appender_failure_reported_out_of_band() {
    let ctx = LoggingContext::new();
    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    ctx.set_error_sink(Arc::new(move |context: &str, error: &LoggerError| {
        sink.lock().push(format!("{}: {}", context, error));
    }));

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let missing = temp_dir.path().join("not-there");
    ctx.configure(
        &LoggingConfig::new()
            .appender(
                "FILE",
                AppenderConfig::new("FileAppender").option("filePath", missing.display().to_string()),
            )
            .root(LoggerConfig::new().level("INFO").appenders(["FILE"])),
    )
    .expect("configure");

    ctx.use_logger("app").error("goes nowhere");
    assert!(ctx.flush(FLUSH_TIMEOUT));

    let reports = reports.lock();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].starts_with("error in appender.handle of FILE: "));
    assert!(reports[0].contains("not created automatically"));
    assert!(!missing.exists());
}

#[test]
fn test_file_appender_through_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let ctx = LoggingContext::new();
    let config = serde_json::json!({
        "appender": {
            "FILE": {
                "ctor": "FileAppender",
                "filePath": temp_dir.path().display().to_string(),
                "baseName": "app"
            }
        },
        "root": { "level": "DEBUG", "appender": ["FILE"] }
    });
    ctx.configure(&LoggingConfig::from_json(&config.to_string()).expect("parse"))
        .expect("configure");

    let logger = ctx.use_logger("svc");
    for i in 0..20 {
        logger.info(values!["line", i]);
    }
    logger.trace("dropped");
    assert!(ctx.flush(FLUSH_TIMEOUT));

    let path = temp_dir
        .path()
        .join(format!("app-{}.log", local_date(&chrono::Utc::now())));
    let content = std::fs::read_to_string(&path).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 20);
    for (i, line) in lines.iter().enumerate() {
        assert!(line.ends_with(&format!("]: line {}", i)));
    }
}

#[test]
fn test_call_site_from_config() {
    let ctx = LoggingContext::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    ctx.configure(
        &LoggingConfig::new()
            .appender("OUT", AppenderConfig::new(recording_factory(&events)))
            .root(LoggerConfig::new().level("INFO").appenders(["OUT"]))
            .logger("traced", LoggerConfig::new().include_call_site(true)),
    )
    .expect("configure");

    ctx.use_logger("plain").info("no site");
    ctx.use_logger("traced.child").info("with site");
    assert!(ctx.flush(FLUSH_TIMEOUT));

    let events = events.lock();
    assert_eq!(events.len(), 2);
    assert!(events[0].call_site.is_none());
    let site = events[1].call_site.as_ref().expect("call site captured");
    assert!(site.file.ends_with("integration_tests.rs"));
}

#[test]
fn test_lazy_message_is_bare_string() {
    let ctx = LoggingContext::new();
    let events = Arc::new(Mutex::new(Vec::new()));
    ctx.configure(
        &LoggingConfig::new()
            .appender("OUT", AppenderConfig::new(recording_factory(&events)))
            .root(LoggerConfig::new().level("INFO").appenders(["OUT"])),
    )
    .expect("configure");

    let logger = ctx.use_logger("lazy");
    logger.debug(lazy(|| panic!("must not be built")));
    logger.info(lazy(|| format!("{} items", 3)));
    assert!(ctx.flush(FLUSH_TIMEOUT));

    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0].payload, EventPayload::Message(m) if m == "3 items"));
}

#[test]
fn test_cyclic_payload_is_rendered() {
    let (ctx, lines) = capturing_context();
    ctx.configure(
        &LoggingConfig::new()
            .appender("CONSOLE", AppenderConfig::new("ConsoleAppender").option("colored", false))
            .root(LoggerConfig::new().level("INFO").appenders(["CONSOLE"])),
    )
    .expect("configure");

    let node = Arc::new(Record::new().field("id", 1));
    node.set("self", Value::Object(node.clone()));
    ctx.use_logger("graph").info(values!["node:", Value::Object(node)]);
    assert!(ctx.flush(FLUSH_TIMEOUT));

    let lines = texts(&lines);
    assert!(lines[0].ends_with("]: node: <ref1>{ id: 1, self: [Circular ref1] }"));
}

#[test]
fn test_factory_ctor_name() {
    let ctor = AppenderCtor::from(FileAppender::factory());
    assert_eq!(ctor.name(), "FileAppender");
}

#[test]
fn test_global_context() {
    reset_logging();
    let events = Arc::new(Mutex::new(Vec::new()));
    configure_logging(
        &LoggingConfig::new()
            .appender("OUT", AppenderConfig::new(recording_factory(&events)))
            .root(LoggerConfig::new().level("INFO").appenders(["OUT"])),
    )
    .expect("configure");

    let logger = use_logger("global.test");
    assert!(Arc::ptr_eq(&logger, &LoggingContext::global().use_logger("global.test")));
    use_logger_at("global", LogLevel::WARN);
    logger.info("below WARN");
    logger.warn("shown");
    assert!(LoggingContext::global().flush(FLUSH_TIMEOUT));
    assert_eq!(events.lock().len(), 1);

    reset_logging();
    assert!(LoggingContext::global().appender("OUT").is_none());
}

#[test]
fn test_emit_without_handlers_returns_false() {
    let ctx = LoggingContext::new();
    let logger = ctx.use_logger("lonely.leaf");
    let event = Arc::new(LogEvent::new(
        LogLevel::FATAL,
        "lonely.leaf",
        EventPayload::Message("nobody listens".to_string()),
    ));
    assert!(!logger.emit(event));
}
