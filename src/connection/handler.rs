//! Connection Handler Module
//!
//! This module handles individual client connections to the calculator.
//! Each client gets its own handler task that runs in a loop, reading one
//! expression per receive and writing back one result.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Read ≤1024 bytes        │ │──── 0 bytes / blank ──┐
//!    │  └───────────┬─────────────┘ │                       │
//!    │              ▼               │                       │
//!    │  ┌─────────────────────────┐ │                       │
//!    │  │ Evaluate expression     │ │                       │
//!    │  └───────────┬─────────────┘ │                       │
//!    │              ▼               │                       │
//!    │  ┌─────────────────────────┐ │                       │
//!    │  │ Append log entry        │ │                       │
//!    │  └───────────┬─────────────┘ │                       │
//!    │              ▼               │                       │
//!    │  ┌─────────────────────────┐ │                       │
//!    │  │ Send result             │ │──── I/O error ────────┤
//!    │  └───────────┬─────────────┘ │                       │
//!    │              ▼               │                       │
//!    │         [Loop back]          │                       │
//!    └──────────────────────────────┘                       │
//!        ┌──────────────────────────────────────────────────┘
//!        ▼
//! 4. Handler task ends, socket released
//! ```
//!
//! ## Framing
//!
//! There is none. Each read of up to [`READ_CHUNK_SIZE`] bytes is one
//! expression, and each response is written as-is with no delimiter. Longer
//! payloads are split across reads and treated as separate expressions.

use crate::eval::{evaluate, response_text};
use crate::logsink::{LogEntry, LogSink};
use bytes::{BufMut, BytesMut};
use std::net::SocketAddr;
use std::str::Utf8Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tokio::task;
use tracing::{debug, info, trace, warn};

/// Maximum bytes read for a single expression
pub const READ_CHUNK_SIZE: usize = 1024;

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total expressions evaluated
    pub requests_processed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn request_processed(&self) {
        self.requests_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
///
/// Owns the socket for its whole lifetime; nothing else reads from or writes
/// to it.
pub struct ConnectionHandler {
    /// The TCP stream for this connection
    stream: BufWriter<TcpStream>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for the current request
    buffer: BytesMut,

    /// Calculation log (shared)
    sink: Arc<dyn LogSink>,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl ConnectionHandler {
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The TCP stream for this connection
    /// * `addr` - The client's socket address
    /// * `sink` - Where each calculation is recorded
    /// * `stats` - Shared connection statistics
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        sink: Arc<dyn LogSink>,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(READ_CHUNK_SIZE),
            sink,
            stats,
        }
    }

    /// Runs the main connection loop.
    ///
    /// Reads expressions and sends back results until the client disconnects
    /// or an error occurs. Errors are logged here and returned for callers
    /// that care; they never affect other connections.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => {}
            Err(ConnectionError::IoError(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        info!(client = %self.addr, "Client disconnected");
        self.stats.connection_closed();
        result
    }

    /// The main read-evaluate-respond loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        while let Some(expression) = self.read_expression().await? {
            let response = self.process(&expression).await;
            self.send_response(&response).await?;
        }

        Ok(())
    }

    /// Reads one expression from the socket.
    ///
    /// Returns `None` when the peer closed the connection or sent only
    /// whitespace.
    async fn read_expression(&mut self) -> Result<Option<String>, ConnectionError> {
        self.buffer.clear();

        let n = {
            let mut chunk = (&mut self.buffer).limit(READ_CHUNK_SIZE);
            self.stream.get_mut().read_buf(&mut chunk).await?
        };

        if n == 0 {
            return Ok(None);
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        let expression = std::str::from_utf8(&self.buffer)?.trim();
        if expression.is_empty() {
            return Ok(None);
        }

        Ok(Some(expression.to_string()))
    }

    /// Evaluates an expression and records it, returning the response text.
    ///
    /// The sink may block on disk I/O, so the append runs on the blocking
    /// pool. It still completes before the response is sent.
    async fn process(&self, expression: &str) -> String {
        info!(client = %self.addr, expression, "Calculation");

        let response = response_text(&evaluate(expression));

        let entry = LogEntry::new(self.addr, expression, response.as_str());
        let sink = Arc::clone(&self.sink);
        match task::spawn_blocking(move || sink.append(&entry)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(client = %self.addr, error = %e, "Failed to record calculation"),
            Err(e) => warn!(client = %self.addr, error = %e, "Log append task failed"),
        }

        self.stats.request_processed();
        response
    }

    /// Sends a response to the client.
    async fn send_response(&mut self, response: &str) -> Result<(), ConnectionError> {
        let bytes = response.as_bytes();
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(bytes.len());
        info!(client = %self.addr, result = response, "Result");
        Ok(())
    }
}

/// Errors that can occur while handling a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Request bytes were not valid UTF-8
    #[error("invalid UTF-8 in request: {0}")]
    InvalidUtf8(#[from] Utf8Error),
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    sink: Arc<dyn LogSink>,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, sink, stats);
    // Already logged by `run`.
    let _ = handler.run().await;
}
