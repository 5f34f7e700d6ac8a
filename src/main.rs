//! NetCalc - A Remote Calculation Server
//!
//! This is the main entry point for the NetCalc server.
//! It parses the command line, binds the listener, and runs the accept loop
//! until Ctrl+C.

use netcalc::config::{Config, ConfigAction};
use netcalc::connection::ConnectionStats;
use netcalc::logsink::FileLogSink;
use netcalc::server;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn print_help() {
    println!(
        r#"
NetCalc - A Remote Calculation Server

USAGE:
    netcalc [OPTIONS]

OPTIONS:
    -h, --host <HOST>        Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>        Port to listen on (default: 5555)
    -b, --backlog <N>        Listen backlog hint (default: 10)
    -l, --log-file <PATH>    Calculation log file (default: server_log.txt)
    -v, --version            Print version information
        --help               Print this help message

EXAMPLES:
    netcalc                        # Start on 127.0.0.1:5555
    netcalc --port 6000            # Start on port 6000
    netcalc --host 0.0.0.0         # Listen on all interfaces

CONNECTING:
    Any TCP client works; send one expression, read one result:
    $ nc 127.0.0.1 5555
    2*(3+4)
    14
"#
    );
}

fn print_banner(config: &Config) {
    println!("{}", "=".repeat(60));
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║          CALCULATOR SERVER STARTED SUCCESSFULLY          ║");
    println!("║  Host: {:<50}║", config.host);
    println!("║  Port: {:<50}║", config.port);
    println!("║  Max Clients: {:<43}║", config.backlog);
    println!("║  Log File: {:<46}║", config.log_file.display());
    println!("║  {:<56}║", "Status: Ready to accept connections");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!("{}", "=".repeat(60));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = match Config::from_args(std::env::args().skip(1)) {
        Ok(ConfigAction::Run(config)) => config,
        Ok(ConfigAction::Help) => {
            print_help();
            return Ok(());
        }
        Ok(ConfigAction::Version) => {
            println!("NetCalc version {}", netcalc::VERSION);
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    // Bind the TCP listener; this is the only fatal failure
    let listener = match server::bind(&config).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(address = %config.bind_address(), error = %e, "Failed to start server");
            error!("Make sure port {} is not in use", config.port);
            std::process::exit(1);
        }
    };

    print_banner(&config);
    info!("Listening on {}", listener.local_addr()?);

    // Shared across all connections
    let sink = Arc::new(FileLogSink::new(&config.log_file));
    info!(path = %sink.path().display(), "Recording calculations");
    let stats = Arc::new(ConnectionStats::new());

    // Set up graceful shutdown
    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    server::run(listener, sink, Arc::clone(&stats), shutdown).await;

    info!(
        connections = stats
            .connections_accepted
            .load(std::sync::atomic::Ordering::Relaxed),
        requests = stats
            .requests_processed
            .load(std::sync::atomic::Ordering::Relaxed),
        "Server shutdown complete"
    );
    Ok(())
}
