//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use trademark_proxy::config::ProxyConfig;
use trademark_proxy::http::HttpServer;
use trademark_proxy::lifecycle::Shutdown;

/// Start the proxy on an ephemeral port in front of `origin`.
///
/// Returns the proxy address and the handle that stops it.
pub async fn start_proxy(origin: &str, configure: impl FnOnce(&mut ProxyConfig)) -> (SocketAddr, Shutdown) {
    let mut config = ProxyConfig::default();
    config.upstream.origin = origin.to_string();
    configure(&mut config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Start a backend that answers every connection with `raw` and then
/// holds the socket open for `linger` before closing it.
///
/// Lets a test send a truncated body (short `linger`) or stall mid-body
/// (long `linger`).
#[allow(dead_code)]
pub async fn start_raw_backend(raw: &'static [u8], linger: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let _ = socket.write_all(raw).await;
                        let _ = socket.flush().await;
                        tokio::time::sleep(linger).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// A client that never reuses connections and ignores proxy env vars.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
