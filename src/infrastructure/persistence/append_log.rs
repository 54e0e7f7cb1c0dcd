//! Append-only JSON-lines log backing the file store.
//!
//! Each line is one self-contained JSON object:
//!
//! ```text
//! {"id":"6f1c...","short_url":"AbCd1234","original_url":"https://example.com"}
//! ```
//!
//! The log is only ever appended to and read front to back; there is no
//! index, truncation or compaction.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;
use uuid::Uuid;

use crate::domain::entities::UrlRecord;
use crate::error::StoreError;

/// One persisted mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Absent in some older logs; decodes as the nil UUID.
    #[serde(default, alias = "uuid")]
    pub id: Uuid,
    pub short_url: String,
    pub original_url: String,
}

impl LogEntry {
    /// Builds an entry with a fresh identifier.
    pub fn from_record(record: &UrlRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            short_url: record.short_url.clone(),
            original_url: record.original_url.clone(),
        }
    }
}

/// Serializes entries into newline-terminated JSON lines.
pub fn encode_lines<'a>(
    records: impl IntoIterator<Item = &'a UrlRecord>,
) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    for record in records {
        serde_json::to_writer(&mut buf, &LogEntry::from_record(record))?;
        buf.push(b'\n');
    }
    Ok(buf)
}

/// Reads every entry of the log at `path`, in order.
///
/// A missing file yields no entries. Blank lines are skipped; any other line
/// that does not decode fails the whole read with [`StoreError::CorruptLog`].
pub async fn read_entries(path: &Path) -> Result<Vec<LogEntry>, StoreError> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut lines = BufReader::new(file).lines();
    let mut entries = Vec::new();
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let entry = serde_json::from_str::<LogEntry>(&line).map_err(|source| {
            StoreError::CorruptLog {
                line: line_no,
                source,
            }
        })?;
        entries.push(entry);
    }

    Ok(entries)
}

/// Append handle on the log file.
#[derive(Debug)]
pub struct AppendLog {
    path: PathBuf,
    file: File,
}

impl AppendLog {
    /// Opens `path` for appending, creating it if needed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self { path, file })
    }

    #[cfg(test)]
    pub(crate) fn from_file(path: PathBuf, file: File) -> Self {
        Self { path, file }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes already encoded lines and flushes them to the OS.
    ///
    /// On failure the file is cut back to its previous length so a partial
    /// write never leaves a fragment for the next append to extend.
    pub async fn append(&mut self, lines: &[u8]) -> Result<(), StoreError> {
        let committed = self.file.metadata().await?.len();

        if let Err(e) = self.write_lines(lines).await {
            self.rollback(committed).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn write_lines(&mut self, lines: &[u8]) -> std::io::Result<()> {
        self.file.write_all(lines).await?;
        self.file.flush().await
    }

    async fn rollback(&mut self, committed: u64) {
        if let Err(e) = self.file.set_len(committed).await {
            warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to discard partial log write"
            );
        }
    }
}
