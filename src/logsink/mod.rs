//! Calculation Log
//!
//! Every evaluated request is recorded as one timestamped line: who asked,
//! what they sent, and what they got back. Handlers only see the [`LogSink`]
//! trait, so the backing store can be a file, memory, or anything else that
//! can append a line atomically.
//!
//! ## Line Format
//!
//! ```text
//! [2026-10-17 14:03:11] Client: 127.0.0.1:50412 | Expression: 3*3 | Result: 9
//! ```
//!
//! ## Concurrency
//!
//! A sink is shared by every connection task behind an `Arc`. Implementations
//! must serialize appends so that each line is written completely before the
//! next one starts. No ordering across connections is promised.

pub mod file;
pub mod memory;

pub use file::{FileLogSink, DEFAULT_LOG_FILE};
pub use memory::MemoryLogSink;

use chrono::{DateTime, Local};
use std::fmt;
use std::net::SocketAddr;

/// Timestamp format used in log lines
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One request/response transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub peer: SocketAddr,
    pub expression: String,
    pub result: String,
}

impl LogEntry {
    /// Creates an entry stamped with the current local time.
    pub fn new(peer: SocketAddr, expression: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            peer,
            expression: expression.into(),
            result: result.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] Client: {} | Expression: {} | Result: {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.peer,
            Escaped(&self.expression),
            Escaped(&self.result)
        )
    }
}

/// Writes control characters as escapes so a field can never break the line.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            if c.is_control() {
                write!(f, "{}", c.escape_default())?;
            } else {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

/// Errors raised while appending to a sink.
#[derive(Debug, thiserror::Error)]
pub enum LogSinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A writer panicked while holding the sink lock
    #[error("log sink lock poisoned")]
    Poisoned,
}

/// Append-only destination for calculation records.
pub trait LogSink: Send + Sync {
    /// Appends one complete entry. Returns once the line is written.
    fn append(&self, entry: &LogEntry) -> Result<(), LogSinkError>;
}
