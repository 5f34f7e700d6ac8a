//! File-backed calculation log.

use crate::logsink::{LogEntry, LogSink, LogSinkError};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Log file used when none is configured
pub const DEFAULT_LOG_FILE: &str = "server_log.txt";

/// Appends log lines to a file on disk.
///
/// The file is opened in append mode on first use and the handle is cached
/// behind a mutex. Each entry is formatted into a single buffer and written
/// with one `write_all` while the lock is held, so lines from different
/// connections never mix. A failed write drops the cached handle; the next
/// append reopens the file.
#[derive(Debug)]
pub struct FileLogSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileLogSink {
    /// Creates a sink for `path`. Nothing is opened until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> std::io::Result<File> {
        OpenOptions::new().create(true).append(true).open(&self.path)
    }
}

impl LogSink for FileLogSink {
    fn append(&self, entry: &LogEntry) -> Result<(), LogSinkError> {
        let line = format!("{}\n", entry);
        let mut guard = self.file.lock().map_err(|_| LogSinkError::Poisoned)?;

        let mut file = match guard.take() {
            Some(file) => file,
            None => self.open()?,
        };

        file.write_all(line.as_bytes())?;
        file.flush()?;
        *guard = Some(file);
        Ok(())
    }
}
