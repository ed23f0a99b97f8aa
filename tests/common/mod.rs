//! Shared utilities for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lattice_forwarder::config::schema::AssetConfig;
use lattice_forwarder::config::{UpstreamConfig, Variant};
use lattice_forwarder::{Forwarder, HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Request paths seen by a mock upstream, in arrival order.
#[derive(Clone, Default)]
pub struct Seen(Arc<Mutex<Vec<String>>>);

#[allow(dead_code)]
impl Seen {
    pub fn paths(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, path: String) {
        self.0.lock().unwrap().push(path);
    }
}

/// Start a mock upstream that returns a fixed 200 response.
#[allow(dead_code)]
pub async fn start_mock_upstream(body: &'static str) -> (SocketAddr, Seen) {
    start_programmable_upstream(move |_path| async move { (200, body.to_string()) }).await
}

/// Start a programmable mock upstream; `f` maps the request path to a status and body.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> (SocketAddr, Seen)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Seen::default();
    let f = Arc::new(f);

    let recorder = seen.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            let recorder = recorder.clone();
            tokio::spawn(async move {
                let Some(path) = read_request_path(&mut socket).await else {
                    return;
                };
                recorder.push(path.clone());

                let (status, body) = f(path).await;
                let status_text = match status {
                    200 => "200 OK",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            });
        }
    });

    (addr, seen)
}

/// Read the request head and return the request-target of its first line.
async fn read_request_path(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let head = String::from_utf8_lossy(&buf);
    head.lines()
        .next()?
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Resolve `variant` from the given variables instead of the process environment.
pub fn upstreams(variant: Variant, vars: &[(&'static str, String)]) -> UpstreamConfig {
    let vars = vars.to_vec();
    UpstreamConfig::resolve(variant, move |key| {
        vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone())
    })
    .unwrap()
}

/// Start a forwarder on an ephemeral port; returns its base URL.
pub async fn start_forwarder(config: UpstreamConfig, shutdown: &Shutdown) -> String {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let server = HttpServer::new(Forwarder::with_client(config, client), &AssetConfig::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    format!("http://{}", addr)
}

/// Test client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
