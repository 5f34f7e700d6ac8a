//! In-memory calculation log.

use crate::logsink::{LogEntry, LogSink, LogSinkError};
use std::sync::Mutex;

/// Keeps entries in a vector instead of writing them anywhere.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all entries in append order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogSink for MemoryLogSink {
    fn append(&self, entry: &LogEntry) -> Result<(), LogSinkError> {
        self.entries
            .lock()
            .map_err(|_| LogSinkError::Poisoned)?
            .push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_append_order() {
        let sink = MemoryLogSink::new();
        assert!(sink.is_empty());

        let peer = "127.0.0.1:1234".parse().unwrap();
        sink.append(&LogEntry::new(peer, "1+1", "2")).unwrap();
        sink.append(&LogEntry::new(peer, "2+a", "Error: Invalid characters detected"))
            .unwrap();

        let entries = sink.entries();
        assert_eq!(sink.len(), 2);
        assert_eq!(entries[0].expression, "1+1");
        assert_eq!(entries[1].result, "Error: Invalid characters detected");
    }
}
