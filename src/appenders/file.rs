//! Daily file appender
//!
//! Uses tokio::fs for asynchronous file I/O. One file per local calendar
//! day: `<filePath>/<baseName>-<YYYY-MM-DD>.<extension>`.

use crate::core::appender::{string_option, AppenderBase};
use crate::core::timestamp::local_date;
use crate::core::{Appender, AppenderFactory, LogEvent, LogLevel, LoggerError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Appends `prefix payload` lines to a file per day.
///
/// The directory must exist; it is never created. Writes of one instance
/// complete in the order `handle` was called.
///
/// Options: `filePath`, `baseName`, `extension`, `colored`, `pretty`,
/// `timestampFormat`.
///
/// # Example
///
/// ```
/// use bit_log::appenders::FileAppender;
///
/// let appender = FileAppender::new()
///     .with_file_path("/var/log/myapp")
///     .with_base_name("server");
/// assert_eq!(appender.file_name_for("2024-05-08"), "server-2024-05-08.log");
/// ```
#[derive(Debug)]
pub struct FileAppender {
    base: AppenderBase,
    file_path: PathBuf,
    base_name: String,
    extension: String,
    write_lock: Mutex<()>,
}

impl FileAppender {
    pub const KIND: &'static str = "FileAppender";
    pub const DEFAULT_EXTENSION: &'static str = "log";

    pub fn new() -> Self {
        Self {
            base: AppenderBase::default(),
            file_path: std::env::temp_dir().join("bit.log"),
            base_name: String::new(),
            extension: Self::DEFAULT_EXTENSION.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.base.level = Some(level);
        self
    }

    #[must_use]
    pub fn with_file_path(mut self, path: impl AsRef<Path>) -> Self {
        self.file_path = path.as_ref().to_path_buf();
        self
    }

    #[must_use]
    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = base_name.into();
        self
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.base.pretty = pretty;
        self
    }

    pub fn factory() -> AppenderFactory {
        AppenderFactory::new(Self::KIND, || Ok(Box::new(FileAppender::new())))
    }

    /// Directory the daily files are written to
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn file_name_for(&self, date: &str) -> String {
        if self.base_name.is_empty() {
            format!("{}.{}", date, self.extension)
        } else {
            format!("{}-{}.{}", self.base_name, date, self.extension)
        }
    }

    /// Full path of the file for `date`, after checking the configuration
    pub async fn resolve_path(&self, date: &str) -> Result<PathBuf> {
        let dir = self.file_path.display().to_string();
        if self.file_path.as_os_str().is_empty() {
            return Err(not_configured(&dir, "filePath not given"));
        }
        match tokio::fs::metadata(&self.file_path).await {
            Ok(metadata) if metadata.is_dir() => {}
            _ => {
                return Err(not_configured(
                    &dir,
                    format!(
                        "filePath '{}' does not exist or is not accessible. \
                         For security reasons, the file path is not created automatically.",
                        dir
                    ),
                ))
            }
        }
        if self.base_name.is_empty() && date.is_empty() {
            return Err(not_configured(&dir, "either baseName or date must not be empty"));
        }
        if self.extension.is_empty() {
            return Err(not_configured(&dir, "extension must not be empty"));
        }

        let full_path = self.file_path.join(self.file_name_for(date));
        if let Ok(metadata) = tokio::fs::metadata(&full_path).await {
            if metadata.is_dir() {
                let shown = full_path.display().to_string();
                return Err(not_configured(&shown, format!("path '{}' is a directory.", shown)));
            }
        }
        Ok(full_path)
    }

    async fn write_event(&self, event: &LogEvent) -> Result<()> {
        let path = self.resolve_path(&local_date(&event.timestamp)).await?;
        let mut line = self.base.format_line(event)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| LoggerError::io_operation("opening log file", path.display().to_string(), e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| LoggerError::io_operation("writing log file", path.display().to_string(), e))?;
        file.flush().await.map_err(LoggerError::from)?;
        Ok(())
    }
}

fn not_configured(path: &str, message: impl AsRef<str>) -> LoggerError {
    LoggerError::file_appender(
        path,
        format!("FileAppender is not configured properly: {}", message.as_ref()),
    )
}

impl Default for FileAppender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Appender for FileAppender {
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
        let _guard = self.write_lock.lock().await;
        self.write_event(event).await
    }

    fn set_option(&mut self, key: &str, value: &serde_json::Value) -> Result<()> {
        match key {
            "filePath" => self.file_path = PathBuf::from(string_option(Self::KIND, key, value)?),
            "baseName" => self.base_name = string_option(Self::KIND, key, value)?,
            "extension" => self.extension = string_option(Self::KIND, key, value)?,
            _ => {
                if !self.base.set_option(Self::KIND, key, value)? {
                    return Err(LoggerError::unknown_option(Self::KIND, key));
                }
            }
        }
        Ok(())
    }
}
