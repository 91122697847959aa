//! Durable commit log
//!
//! Every accepted insertion is appended as one [`JournalRecord`]. Opening a
//! store replays the records through the normal insertion path, so derived
//! state (indices, relations) is never persisted.
//!
//! [`FileJournal`] writes JSON lines and calls `sync_data` after each
//! record; a record is committed once `append` returns. A failed append is
//! cut back off the file, and a torn final line left by a crash is dropped
//! on open.

use crate::error::JournalError;
use lineage_model::{Activity, ActivityCollection};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// One committed mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum JournalRecord {
    Activity(Activity),
    Collection(ActivityCollection),
}

/// Append-only record log
#[cfg_attr(test, mockall::automock)]
pub trait Journal: Send + Sync {
    /// Durably append `record`
    ///
    /// # Errors
    /// Returns [`JournalError`] when the record could not be committed
    fn append(&self, record: &JournalRecord) -> Result<(), JournalError>;

    /// Every committed record, oldest first
    ///
    /// # Errors
    /// Returns [`JournalError`] when the log cannot be read or a committed
    /// record is malformed
    fn replay(&self) -> Result<Vec<JournalRecord>, JournalError>;
}

/// Volatile journal for tests and throwaway stores
#[derive(Debug, Default)]
pub struct MemoryJournal {
    records: Mutex<Vec<JournalRecord>>,
}

impl MemoryJournal {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl Journal for MemoryJournal {
    fn append(&self, record: &JournalRecord) -> Result<(), JournalError> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn replay(&self) -> Result<Vec<JournalRecord>, JournalError> {
        Ok(self.records.lock().clone())
    }
}

/// JSON-lines journal on disk
#[derive(Debug)]
pub struct FileJournal {
    path: PathBuf,
    file: Mutex<JournalFile>,
}

/// Open handle plus the length of its committed prefix
#[derive(Debug)]
struct JournalFile {
    file: File,
    committed: u64,
}

impl JournalFile {
    /// Append one line; on failure the file is cut back to `committed`
    fn commit(&mut self, line: &[u8]) -> std::io::Result<()> {
        if self.file.metadata()?.len() != self.committed {
            self.file.set_len(self.committed)?;
        }

        let written = self
            .file
            .write_all(line)
            .and_then(|()| self.file.sync_data());
        if let Err(err) = written {
            if let Err(repair) = self.file.set_len(self.committed) {
                warn!(error = %repair, "could not drop failed journal append");
            }
            return Err(err);
        }

        self.committed += line.len() as u64;
        Ok(())
    }
}

impl FileJournal {
    /// Open or create the journal at `path`
    ///
    /// A trailing partial line is truncated away.
    ///
    /// # Errors
    /// Returns [`JournalError::Io`] if the file cannot be opened or repaired
    pub fn open(path: impl AsRef<Path>) -> Result<Self, JournalError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        let committed = contents
            .iter()
            .rposition(|&byte| byte == b'\n')
            .map_or(0, |pos| pos + 1);
        if committed < contents.len() {
            warn!(
                path = %path.display(),
                dropped_bytes = contents.len() - committed,
                "dropping torn journal tail"
            );
            file.set_len(committed as u64)?;
            file.sync_data()?;
        }

        Ok(Self {
            path,
            file: Mutex::new(JournalFile {
                file,
                committed: committed as u64,
            }),
        })
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Journal for FileJournal {
    fn append(&self, record: &JournalRecord) -> Result<(), JournalError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        self.file.lock().commit(&line)?;
        Ok(())
    }

    fn replay(&self) -> Result<Vec<JournalRecord>, JournalError> {
        let _guard = self.file.lock();
        let contents = std::fs::read_to_string(&self.path)?;

        let mut records = Vec::new();
        let mut lines = contents.split_inclusive('\n').peekable();
        while let Some(line) = lines.next() {
            let complete = line.ends_with('\n');
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(err) if !complete && lines.peek().is_none() => {
                    warn!(path = %self.path.display(), error = %err, "ignoring torn journal tail");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(records)
    }
}
