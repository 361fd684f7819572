//! Shared stub servers for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use proxy_probe::config::ProbeConfig;

/// One request seen by a stub backend.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub at: Instant,
    pub head: String,
}

impl SeenRequest {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }
}

pub type SeenRequests = Arc<Mutex<Vec<SeenRequest>>>;

/// Start a programmable backend on an ephemeral port.
///
/// The handler receives the zero-based request index and returns the status,
/// extra header lines, and body to send.
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, SeenRequests)
where
    F: Fn(usize) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, Vec<(String, String)>, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen: SeenRequests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let recorder = seen.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let recorder = recorder.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        let index = {
                            let mut seen = recorder.lock().unwrap();
                            seen.push(SeenRequest {
                                at: Instant::now(),
                                head,
                            });
                            seen.len() - 1
                        };

                        let (status, headers, body) = f(index).await;
                        let mut response = format!(
                            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                            status,
                            reason(status),
                            body.len()
                        );
                        for (name, value) in headers {
                            response.push_str(&format!("{}: {}\r\n", name, value));
                        }
                        response.push_str("\r\n");
                        response.push_str(&body);

                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, seen)
}

/// Start a backend that always answers with `status` and `body`.
pub async fn start_fixed_backend(status: u16, body: &'static str) -> (SocketAddr, SeenRequests) {
    start_programmable_backend(move |_| async move { (status, Vec::new(), body.to_string()) }).await
}

async fn read_head(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        407 => "Proxy Authentication Required",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

/// A file part received by the upload stub.
#[derive(Debug, Clone)]
pub struct ReceivedPart {
    pub field: String,
    pub file_name: String,
    pub size: usize,
}

#[derive(Clone)]
struct UploadState {
    status: StatusCode,
    requests: Arc<Mutex<usize>>,
    parts: Arc<Mutex<Vec<ReceivedPart>>>,
}

/// Upload endpoint stub: counts requests and records every multipart part.
pub struct UploadStub {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<usize>>,
    pub parts: Arc<Mutex<Vec<ReceivedPart>>>,
}

pub async fn start_upload_backend(status: u16) -> UploadStub {
    let state = UploadState {
        status: StatusCode::from_u16(status).unwrap(),
        requests: Arc::new(Mutex::new(0)),
        parts: Arc::new(Mutex::new(Vec::new())),
    };
    let requests = state.requests.clone();
    let parts = state.parts.clone();

    let app = Router::new().route("/", post(receive_upload)).with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    UploadStub {
        addr,
        requests,
        parts,
    }
}

async fn receive_upload(State(state): State<UploadState>, mut multipart: Multipart) -> (StatusCode, String) {
    *state.requests.lock().unwrap() += 1;

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let size = match field.bytes().await {
            Ok(bytes) => bytes.len(),
            Err(_) => return (StatusCode::BAD_REQUEST, "truncated part".into()),
        };
        state.parts.lock().unwrap().push(ReceivedPart {
            field: name,
            file_name,
            size,
        });
    }

    (state.status, format!("stored ({})", state.status.as_u16()))
}

/// Config tuned for fast tests: tiny backoff, short timeouts.
pub fn test_config() -> ProbeConfig {
    let mut config = ProbeConfig::default();
    config.retries.backoff_factor = 0.05;
    config.timeouts.connect_secs = 2;
    config.timeouts.request_secs = 5;
    config.timeouts.upload_secs = 5;
    config
}

/// Write `size` bytes to a fresh temp file.
pub fn temp_file(size: usize) -> PathBuf {
    let path = std::env::temp_dir().join(format!("proxy-probe-upload-{}.bin", uuid::Uuid::new_v4()));
    let contents: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, contents).unwrap();
    path
}

/// Open descriptors of this process pointing at `path`.
#[cfg(target_os = "linux")]
pub fn open_handles_to(path: &std::path::Path) -> usize {
    let target = std::fs::canonicalize(path).unwrap();
    std::fs::read_dir("/proc/self/fd")
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| std::fs::read_link(entry.path()).ok())
        .filter(|link| *link == target)
        .count()
}
