//! Append-only conversation log (JSONL).
//!
//! One line per exchange. The file is opened, written and closed on every
//! append; each record goes out in a single write so concurrent appenders never
//! interleave partial lines. Never rotated or truncated.

use crate::error::{ChatError, Result};
use crate::types::ConversationRecord;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Default log file name
pub const DEFAULT_LOG_FILE: &str = "conversations.log";

/// Destination for conversation records
pub trait ConversationSink: Send + Sync {
    fn append(&self, record: &ConversationRecord) -> Result<()>;
}

/// File-backed JSONL sink
#[derive(Debug, Clone)]
pub struct ConversationLogger {
    path: PathBuf,
}

impl ConversationLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConversationSink for ConversationLogger {
    fn append(&self, record: &ConversationRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        Ok(())
    }
}

/// Append without failing the caller; returns whether the record was written
pub fn safe_append(sink: &dyn ConversationSink, record: &ConversationRecord) -> bool {
    match sink.append(record) {
        Ok(()) => true,
        Err(e) => {
            warn!(
                "Failed to append conversation record for {}: {}. Log will be incomplete.",
                record.user_id, e
            );
            false
        }
    }
}

/// Read a conversation log back, skipping corrupt lines
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<ConversationRecord>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ConversationRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping corrupt log line {} in {}: {}", n + 1, path.display(), e),
        }
    }
    Ok(records)
}

/// In-memory sink for tests and dry runs
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<ConversationRecord>>,
    fail: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every append fails
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn records(&self) -> Vec<ConversationRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ConversationSink for MemorySink {
    fn append(&self, record: &ConversationRecord) -> Result<()> {
        if self.fail {
            return Err(ChatError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "memory sink configured to fail",
            )));
        }
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record.clone());
        Ok(())
    }
}
