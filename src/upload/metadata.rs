//! Append-only JSON metadata log.
//!
//! The log is a single pretty-printed JSON array. Every append reads the
//! whole array, pushes one entry and writes it back, all while holding the
//! store's lock so concurrent uploads cannot drop each other's entries.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;

use super::record::UploadedFileRecord;
use crate::Result;

/// Metadata log stored at a fixed path.
#[derive(Debug)]
pub struct MetadataStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl MetadataStore {
    /// Create a store backed by `path`. The file is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record and return the number of entries now in the log.
    ///
    /// A missing or empty log counts as empty. Unparsable content also
    /// counts as empty, after being moved aside to a `.corrupt-<timestamp>`
    /// file next to the log.
    pub async fn append(&self, record: &UploadedFileRecord) -> Result<usize> {
        let _guard = self.lock.lock().await;

        let mut entries = self.read_entries().await?;
        entries.push(serde_json::to_value(record)?);
        self.write_entries(&entries).await?;

        tracing::debug!(
            stored_name = %record.stored_name,
            total = entries.len(),
            "Appended upload metadata"
        );
        Ok(entries.len())
    }

    /// Read every record in upload order.
    ///
    /// Entries that do not have the record shape are skipped.
    pub async fn records(&self) -> Result<Vec<UploadedFileRecord>> {
        let _guard = self.lock.lock().await;

        let records: Vec<UploadedFileRecord> = self
            .read_entries()
            .await?
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();
        Ok(records)
    }

    async fn read_entries(&self) -> Result<Vec<Value>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<Value>>(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                let backup = self.quarantine().await?;
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    backup = %backup.display(),
                    "Metadata log is not a JSON array; starting a new one"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Move the current log aside so its content is not lost.
    async fn quarantine(&self) -> Result<PathBuf> {
        let suffix = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        let backup = self.sibling(&format!("corrupt-{suffix}"));
        fs::rename(&self.path, &backup).await?;
        Ok(backup)
    }

    async fn write_entries(&self, entries: &[Value]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.sibling("tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// `<log file name>.<suffix>` in the same directory as the log.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("metadata.json"));
        name.push(".");
        name.push(suffix);
        self.path.with_file_name(name)
    }
}
