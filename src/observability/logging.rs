//! Structured logging.
//!
//! # Responsibilities
//! - Append one `{time, level, message}` JSON record per event to the log file
//! - Mirror every record to the `tracing` subscriber for console output
//!
//! # Design Decisions
//! - JSON Lines: each record is written and flushed on its own, so the file
//!   is never rewritten and no history is held in memory
//! - Logging fails open; a write error becomes a `tracing` warning

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity of a [`LogRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Error,
}

/// One line of the structured log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

impl LogRecord {
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to open log file {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to write log record: {0}")]
    Write(#[from] io::Error),

    #[error("malformed log record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Append-only writer for the structured log stream.
#[derive(Debug)]
pub struct StructuredLogger {
    path: PathBuf,
    file: Mutex<File>,
}

impl StructuredLogger {
    /// Open (or create) the log file for appending.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LogError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LogError::Open {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LogError::Open {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Info, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Error, message.as_ref());
    }

    fn emit(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => tracing::info!(target: "catalog", "{}", message),
            LogLevel::Error => tracing::error!(target: "catalog", "{}", message),
        }

        if let Err(e) = self.append(&LogRecord::now(level, message)) {
            tracing::warn!(path = %self.path.display(), error = %e, "Dropped structured log record");
        }
    }

    /// Write a single record as one JSON line and flush it.
    pub fn append(&self, record: &LogRecord) -> Result<(), LogError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(&line)?;
        file.flush()?;
        Ok(())
    }
}

/// Parse a structured log file back into records. Blank lines are skipped.
pub fn read_records(path: &Path) -> Result<Vec<LogRecord>, LogError> {
    let file = File::open(path).map_err(|source| LogError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_record_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app_logs.jsonl");
        let logger = StructuredLogger::open(&path).unwrap();

        logger.info("Course catalog page rendered successfully");
        logger.error("Missing required fields: name");
        logger.info("third");

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].level, LogLevel::Info);
        assert_eq!(records[1].level, LogLevel::Error);
        assert_eq!(records[1].message, "Missing required fields: name");
        assert_eq!(records[2].message, "third");
    }

    #[test]
    fn test_reopen_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("app_logs.jsonl");

        StructuredLogger::open(&path).unwrap().info("first run");
        StructuredLogger::open(&path).unwrap().info("second run");

        let messages: Vec<_> = read_records(&path)
            .unwrap()
            .into_iter()
            .map(|r| r.message)
            .collect();
        assert_eq!(messages, vec!["first run", "second run"]);
    }

    #[test]
    fn test_record_wire_format() {
        let record = LogRecord {
            time: "2024-01-01T00:00:00.000Z".into(),
            level: LogLevel::Error,
            message: "boom".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"time": "2024-01-01T00:00:00.000Z", "level": "ERROR", "message": "boom"})
        );
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let record = LogRecord::now(LogLevel::Info, "x");
        assert!(chrono::DateTime::parse_from_rfc3339(&record.time).is_ok());
    }
}
