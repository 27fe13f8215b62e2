use log::{error, info, warn};
use std::io::{self, Read};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tiny_http::{Header, Request, Response};
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::error::{ApiError, RequestError, ServerError, handle_error};
use crate::navigate::WorkingDirectory;
use crate::protocol::{ApiResponse, dispatch};

/// Largest request body read into memory.
pub const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

pub struct Server {
    http: Arc<tiny_http::Server>,
    working_dir: Arc<Mutex<WorkingDirectory>>,
    config: Arc<AppConfig>,
    shutting_down: Arc<AtomicBool>,
}

impl Server {
    /// Opens (creating if needed) the working directory and binds the listener.
    pub fn new(config: AppConfig) -> Result<Self, ServerError> {
        let working_dir = WorkingDirectory::open(&config.dir, true)?;

        let addr = config.socket_addr();
        let http = tiny_http::Server::http(addr.as_str()).map_err(|e| {
            error!("Failed to bind to {addr}: {e}");
            ServerError::Bind {
                addr: addr.clone(),
                reason: e.to_string(),
            }
        })?;
        info!("Server bound to {addr}");

        Ok(Self {
            http: Arc::new(http),
            working_dir: Arc::new(Mutex::new(working_dir)),
            config: Arc::new(config),
            shutting_down: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address the listener is actually bound to (useful with port 0).
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.http.server_addr().to_ip()
    }

    /// Shared handle to the current working directory.
    pub fn working_dir(&self) -> Arc<Mutex<WorkingDirectory>> {
        Arc::clone(&self.working_dir)
    }

    pub async fn start(&self) {
        info!(
            "Starting RAX file server on {} (working directory {})",
            self.config.socket_addr(),
            self.config.dir.display()
        );

        loop {
            let http = Arc::clone(&self.http);
            match tokio::task::spawn_blocking(move || http.recv()).await {
                Ok(Ok(request)) => {
                    let working_dir = Arc::clone(&self.working_dir);
                    // One blocking task per request, off the accept loop
                    tokio::task::spawn_blocking(move || serve_request(request, &working_dir));
                }
                Ok(Err(e)) => {
                    if self.shutting_down.load(Ordering::SeqCst) {
                        break;
                    }
                    error!("Error accepting request: {e}");
                }
                Err(e) => {
                    error!("Accept task failed: {e}");
                    break;
                }
            }
        }

        info!("Server stopped accepting requests");
    }

    /// Stops the accept loop; requests already being served run to completion.
    pub fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::SeqCst);
        self.http.unblock();
    }
}

/// Reads one request, serves it under the working directory lock, and replies.
fn serve_request(mut request: Request, working_dir: &Mutex<WorkingDirectory>) {
    let method = request.method().clone();
    let url = request.url().to_string();
    let remote = request
        .remote_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let body = match read_body(request.as_reader(), MAX_BODY_BYTES) {
        Ok(body) => body,
        Err(e) => {
            warn!("Failed to read request body from {remote}: {e}");
            return;
        }
    };

    info!("Received from {remote}: {method} {url}");

    let response = match body {
        Some(body) => {
            let mut cwd = working_dir.blocking_lock();
            dispatch(&method, &url, &body, &mut cwd)
        }
        None => {
            let err = ApiError::from(RequestError::BodyTooLarge(MAX_BODY_BYTES));
            handle_error(&err);
            ApiResponse::error(&err)
        }
    };

    let status = response.status;
    if let Err(e) = request.respond(to_http_response(response)) {
        warn!("Failed to send response to {remote}: {e}");
        return;
    }

    info!("Responded to {remote}: {method} {url} -> {status}");
}

/// Reads at most `limit` bytes; `None` when the body is longer.
fn read_body<R: Read + ?Sized>(reader: &mut R, limit: u64) -> io::Result<Option<Vec<u8>>> {
    let mut body = Vec::new();
    reader.take(limit + 1).read_to_end(&mut body)?;
    if body.len() as u64 > limit {
        return Ok(None);
    }
    Ok(Some(body))
}

fn to_http_response(response: ApiResponse) -> Response<std::io::Cursor<Vec<u8>>> {
    let http_response = Response::from_data(response.body).with_status_code(response.status);
    match Header::from_bytes(&b"Content-Type"[..], response.content_type.as_bytes()) {
        Ok(header) => http_response.with_header(header),
        Err(()) => http_response,
    }
}
