//! # NetCalc - A Remote Calculation Server
//!
//! NetCalc accepts TCP connections, reads arithmetic expressions sent as raw
//! text, evaluates them under a small fixed grammar, and writes the result
//! back on the same connection.
//!
//! ## Features
//!
//! - **Restricted Grammar**: Numbers, `+ - * /`, unary signs and parentheses.
//!   No names, no functions, nothing that reaches outside the expression.
//! - **Task per Connection**: Every client runs on its own Tokio task, so
//!   one failing client never disturbs another.
//! - **Calculation Log**: Every request is appended to a timestamped log.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                              NetCalc                                │
//! │                                                                     │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────────────────┐  │
//! │  │ TCP Server  │───>│ Connection  │───>│       Evaluator         │  │
//! │  │ (Listener)  │    │  Handler    │    │ lexer → parser → render │  │
//! │  └─────────────┘    └──────┬──────┘    └─────────────────────────┘  │
//! │                            │                                        │
//! │                            ▼                                        │
//! │                     ┌─────────────┐                                 │
//! │                     │  Log Sink   │  (shared, append-only)          │
//! │                     └─────────────┘                                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use netcalc::config::Config;
//! use netcalc::connection::ConnectionStats;
//! use netcalc::logsink::FileLogSink;
//! use netcalc::server;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let listener = server::bind(&config).await?;
//!     let sink = Arc::new(FileLogSink::new(&config.log_file));
//!     let stats = Arc::new(ConnectionStats::new());
//!
//!     server::accept_loop(listener, sink, stats).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Protocol
//!
//! The client sends an expression; the server answers with either the
//! rendered number or `Error: <reason>`. There is no framing: one read is
//! one request, one write is one response.
//!
//! ```text
//! client: 3*3        server: 9
//! client: 10/4       server: 2.5
//! client: 7/0        server: Error: Division by zero
//! ```
//!
//! ## Module Overview
//!
//! - [`eval`]: Expression validation, parsing, evaluation and rendering
//! - [`connection`]: Per-client request loop
//! - [`server`]: Listener setup and accept loop
//! - [`logsink`]: Calculation log
//! - [`config`]: Server settings and command-line parsing

pub mod config;
pub mod connection;
pub mod eval;
pub mod logsink;
pub mod server;

// Re-export commonly used types for convenience
pub use config::{Config, ConfigAction, ConfigError};
pub use connection::{handle_connection, ConnectionStats};
pub use eval::{evaluate, response_text, EvalError, Evaluation};
pub use logsink::{FileLogSink, LogEntry, LogSink, LogSinkError, MemoryLogSink};

/// The default port the server listens on
pub const DEFAULT_PORT: u16 = 5555;

/// The default host the server binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listen backlog
pub const MAX_CLIENTS: u32 = 10;

/// Version of NetCalc
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
