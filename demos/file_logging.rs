//! File logging example
//!
//! Configures a daily file appender from JSON and writes to it from two
//! loggers that share it.
//!
//! Run with: cargo run --example file_logging

use bit_log::prelude::*;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== bit_log - File Logging Example ===\n");

    let dir = std::env::temp_dir().join("bit_log_demo");
    std::fs::create_dir_all(&dir)?;

    let json = serde_json::json!({
        "appender": {
            "FILE": {
                "ctor": "FileAppender",
                "filePath": dir.display().to_string(),
                "baseName": "demo",
                "colored": false
            }
        },
        "root": { "level": "DEBUG", "appender": ["FILE"] },
        "logger": {
            "demo.db": { "level": "WARN", "includeCallSite": true }
        }
    });

    let ctx = LoggingContext::new();
    ctx.configure(&LoggingConfig::from_json(&json.to_string())?)?;

    let http = ctx.use_logger("demo.http");
    let db = ctx.use_logger("demo.db");

    for i in 0..5 {
        http.info(values!["request", i, "served"]);
        db.info(values!["query", i, "(filtered at WARN)"]);
    }
    db.warn("slow query detected");

    if !ctx.flush(Duration::from_secs(5)) {
        println!("Timed out waiting for the file appender");
    }

    println!("Log files written to {}", dir.display());
    let mut entries = std::fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect::<Vec<_>>();
    entries.sort();
    for path in entries {
        println!("--- {} ---", path.display());
        print!("{}", std::fs::read_to_string(&path)?);
    }

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
