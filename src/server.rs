//! Listener and dispatcher.
//!
//! Binds the listening socket and hands every accepted connection to its
//! own task. The accept loop never waits on a client; the only state shared
//! between connection tasks is the log sink and the statistics counters.

use crate::config::Config;
use crate::connection::{handle_connection, ConnectionStats};
use crate::logsink::LogSink;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{lookup_host, TcpListener, TcpSocket};
use tokio::time;
use tracing::{debug, error, info};

/// Binds a listener on the configured host and port.
///
/// Address reuse is enabled so a restarted server can rebind immediately.
/// `backlog` is only a hint to the OS; no connection limit is enforced here.
pub async fn bind(config: &Config) -> io::Result<TcpListener> {
    let mut last_err = None;

    for addr in lookup_host(config.bind_address()).await? {
        match bind_addr(addr, config.backlog) {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                debug!(%addr, error = %e, "Bind attempt failed");
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no address found for {}", config.bind_address()),
        )
    }))
}

fn bind_addr(addr: SocketAddr, backlog: u32) -> io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };

    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(backlog)
}

/// Main loop that accepts incoming connections
pub async fn accept_loop(
    listener: TcpListener,
    sink: Arc<dyn LogSink>,
    stats: Arc<ConnectionStats>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let sink = Arc::clone(&sink);
                let stats = Arc::clone(&stats);

                // Spawn a task to handle this connection
                tokio::spawn(async move {
                    handle_connection(stream, addr, sink, stats).await;
                });
            }
            Err(e) => accept_backoff(&e).await,
        }
    }
}

/// Pause after a failed accept before trying again
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Logs an accept failure and waits [`ACCEPT_BACKOFF`].
///
/// Errors such as `EMFILE` persist until a descriptor frees up.
async fn accept_backoff(e: &io::Error) {
    error!(error = %e, "Failed to accept connection");
    time::sleep(ACCEPT_BACKOFF).await;
}

/// Accepts connections until `shutdown` resolves.
///
/// Connections already in flight keep running on their own tasks.
pub async fn run<F>(
    listener: TcpListener,
    sink: Arc<dyn LogSink>,
    stats: Arc<ConnectionStats>,
    shutdown: F,
) where
    F: Future<Output = ()>,
{
    tokio::select! {
        _ = accept_loop(listener, sink, stats) => {}
        _ = shutdown => {
            info!("Shutdown signal received, no longer accepting connections");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logsink::MemoryLogSink;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;
    use tokio_test::{assert_err, assert_ok};

    fn local_config(port: u16) -> Config {
        Config {
            port,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let listener = assert_ok!(bind(&local_config(0)).await);
        let addr = listener.local_addr().unwrap();
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_bind_port_in_use_fails() {
        let first = bind(&local_config(0)).await.unwrap();
        let port = first.local_addr().unwrap().port();

        assert_err!(bind(&local_config(port)).await);
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let listener = bind(&local_config(0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let sink = Arc::new(MemoryLogSink::new());
        let stats = Arc::new(ConnectionStats::new());
        let (tx, rx) = oneshot::channel::<()>();

        let server = tokio::spawn(run(listener, sink.clone(), stats, async {
            let _ = rx.await;
        }));

        let mut client = TcpStream::connect(addr).await.unwrap();
        client.write_all(b"8/2").await.unwrap();
        let mut buf = [0u8; 16];
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"4");

        tx.send(()).unwrap();
        assert_ok!(server.await);

        // The in-flight connection outlives the accept loop.
        client.write_all(b"1+2").await.unwrap();
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"3");
        assert_eq!(sink.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_error_backs_off() {
        let err = io::Error::from_raw_os_error(24); // EMFILE
        let start = time::Instant::now();

        accept_backoff(&err).await;

        assert!(start.elapsed() >= ACCEPT_BACKOFF);
    }
}
