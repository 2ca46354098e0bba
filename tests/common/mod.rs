//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Start a programmable mock HTTP backend on an ephemeral port.
///
/// `f` is called once per request and returns the status code and body.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let f = Arc::new(f);
    start_backend(move || {
        let f = f.clone();
        async move {
            let (status, body) = f().await;
            let code = StatusCode::from_u16(status).expect("mock backend status out of range");
            format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                code.as_u16(),
                code.canonical_reason().unwrap_or(""),
                body.len(),
                body
            )
        }
    })
    .await
}

/// Start a backend that answers every request with `response` verbatim.
pub async fn start_raw_backend(response: &'static str) -> SocketAddr {
    start_backend(move || async move { response.to_string() }).await
}

async fn start_backend<F, Fut>(respond: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = String> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let respond = respond.clone();
            tokio::spawn(async move {
                // Drain the request head so closing the socket doesn't reset it.
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let response = respond().await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

static NEXT_FILE: AtomicU32 = AtomicU32::new(0);

/// A strategies file in the temp directory, removed on drop.
pub struct TempStrategies {
    path: PathBuf,
}

impl TempStrategies {
    pub fn new(content: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "strategies-{}-{}.json",
            std::process::id(),
            NEXT_FILE.fetch_add(1, Ordering::SeqCst)
        ));
        std::fs::write(&path, content).unwrap();
        Self { path }
    }

    pub fn write(&self, content: &str) {
        std::fs::write(&self.path, content).unwrap();
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

impl Drop for TempStrategies {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Poll `check` every 20ms until it returns true or `timeout` elapses.
pub async fn eventually<F: FnMut() -> bool>(timeout: Duration, mut check: F) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
