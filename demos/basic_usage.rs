//! Basic logger usage example
//!
//! Demonstrates the logger tree, level inheritance and lazy messages on the
//! console.
//!
//! Run with: cargo run --example basic_usage

use bit_log::prelude::*;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== bit_log - Basic Usage Example ===\n");

    let ctx = LoggingContext::new();
    ctx.configure(
        &LoggingConfig::new()
            .appender("CONSOLE", AppenderConfig::new(ConsoleAppender::KIND))
            .root(LoggerConfig::new().level("TRACE").appenders(["CONSOLE"])),
    )?;

    let log = ctx.use_logger("demo.basic");

    println!("1. Logging at different levels:");
    log.trace("This is a trace message");
    log.debug("This is a debug message");
    log.info("This is an info message");
    log.warn("This is a warning message");
    log.error("This is an error message");
    log.fatal("This is a fatal message");
    ctx.flush(Duration::from_secs(1));

    println!("\n2. Inheriting the level from an ancestor:");
    ctx.use_logger("demo").set_level(LogLevel::INFO);
    println!("   'demo' set to INFO - trace and debug won't show:");
    log.trace("Trace message (hidden)");
    log.debug(lazy(|| "Debug message (hidden, never built)".to_string()));
    log.info("Info message (visible)");
    log.warn(values!["Warning with values:", 42, true]);
    ctx.flush(Duration::from_secs(1));

    println!("\n3. Structured values:");
    let record = Record::new()
        .field("user", "alice")
        .field("roles", vec!["admin", "dev"]);
    bit_log::info!(log, "request from {}", "10.0.0.1");
    log.info(values!["session:", record]);
    ctx.flush(Duration::from_secs(1));

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
