//! Unified note-detection server.
//!
//! One listener serves both transports the original system split
//! across two processes:
//!
//! - `POST /api/detect-note` — multipart upload of an audio clip,
//!   answered with the detection JSON.
//! - WebSocket (any path, via `Upgrade: websocket`) — a persistent
//!   session speaking tagged JSON events:
//!
//!   ```json
//!   {"type": "ping"}
//!   {"type": "audio_chunk", "data": "<base64>", "filename": "clip.webm"}
//!   ```
//!
//!   answered with `{"type": "pong", ...}` / `{"type": "note_detected",
//!   ...}`. Raw binary frames are accepted as audio chunks too.
//!
//! Each connection is sniffed by reading the request head; WebSocket
//! upgrades are replayed into the tungstenite handshake, everything
//! else gets a plain HTTP exchange.

mod handler;
mod http;
mod sniff;
mod types;


use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;

pub use http::DETECT_PATH;
pub use types::{ClientEvent, ErrorBody, ServerEvent, PONG_MESSAGE};

/// Default port for the detection server.
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Run the detection server.
///
/// # Returns
/// Exit code: 0 on clean shutdown, 1 on error
pub fn run(host: &str, port: u16) -> Result<ExitCode> {
    // Build tokio runtime
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    rt.block_on(async move { run_server(host, port).await })
}

/// Run the server (async entry point).
async fn run_server(host: &str, port: u16) -> Result<ExitCode> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", host, port))?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    eprintln!("Note detection server listening on http://{}", addr);
    eprintln!("Press Ctrl+C to shutdown");

    // Create shutdown channel
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let shutdown_tx = Arc::new(shutdown_tx);

    // Set up SIGINT handler
    let shutdown_tx_clone = Arc::clone(&shutdown_tx);
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            eprintln!("\nShutting down...");
            let _ = shutdown_tx_clone.send(());
        }
    });

    let mut shutdown_rx = shutdown_tx.subscribe();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        let shutdown_rx = shutdown_tx.subscribe();
                        tokio::spawn(handle_connection(stream, peer_addr, shutdown_rx));
                    }
                    Err(e) => {
                        eprintln!("Accept error: {}", e);
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                eprintln!("Server shutdown complete");
                break;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Handle a single connection: sniff the request head, then speak
/// either WebSocket or plain HTTP.
async fn handle_connection(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    shutdown_rx: broadcast::Receiver<()>,
) {
    let (consumed, head_end) =
        match sniff::read_request_head(&mut stream, http::MAX_HEAD_BYTES).await {
            Ok(head) => head,
            Err(e) => {
                eprintln!("Bad request head from {}: {}", peer_addr, e);
                return;
            }
        };

    let request = match http::parse_request_head(&consumed[..head_end]) {
        Ok(request) => request,
        Err(reason) => {
            eprintln!("Malformed request from {}: {}", peer_addr, reason);
            let _ = http::write_response(&mut stream, 400, &http::error_json(&reason)).await;
            return;
        }
    };

    if request.is_websocket_upgrade() {
        eprintln!("New WebSocket connection from {}", peer_addr);
        serve_websocket(sniff::Rewind::new(consumed, stream), peer_addr, shutdown_rx).await;
    } else {
        let body_prefix = consumed[head_end..].to_vec();
        if let Err(e) = http::serve(stream, &request, body_prefix).await {
            eprintln!("HTTP error for {}: {}", peer_addr, e);
        }
    }
}

/// Handle a single WebSocket session.
async fn serve_websocket<S>(
    stream: S,
    peer_addr: SocketAddr,
    mut shutdown_rx: broadcast::Receiver<()>,
) where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed for {}: {}", peer_addr, e);
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg_opt = read.next() => {
                match msg_opt {
                    Some(Ok(msg)) => {
                        if let Some(response) = handler::process_message(msg).await {
                            if let Err(e) = write.send(Message::Text(response)).await {
                                eprintln!("Send error for {}: {}", peer_addr, e);
                                break;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        eprintln!("Receive error for {}: {}", peer_addr, e);
                        break;
                    }
                    None => {
                        // Connection closed
                        break;
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                // Server shutting down
                let _ = write.send(Message::Close(None)).await;
                break;
            }
        }
    }

    eprintln!("Connection closed: {}", peer_addr);
}
