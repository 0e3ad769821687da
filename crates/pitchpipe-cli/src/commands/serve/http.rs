//! Plain-HTTP handling for the detection server.
//!
//! Speaks just enough HTTP/1.1 for the single upload endpoint: one
//! request per connection, `Content-Length` bodies only, every response
//! closes the connection. Uploads arrive as `multipart/form-data` with
//! the clip in the `file` field (the shape browsers produce for a form
//! upload).

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use pitchpipe_audio::MAX_INPUT_BYTES;

use crate::analysis::detect_from_bytes;

use super::types::ErrorBody;

/// Upload endpoint path.
pub const DETECT_PATH: &str = "/api/detect-note";

/// Cap on the request head. Anything larger is not a detect request.
pub const MAX_HEAD_BYTES: usize = 16 * 1024;

/// A parsed request head.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method, e.g. `POST`.
    pub method: String,
    /// Request target, e.g. `/api/detect-note`.
    pub target: String,
    headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Declared body length, if present and parseable.
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length")?.trim().parse().ok()
    }

    /// Whether the client asked for the WebSocket handshake.
    pub fn is_websocket_upgrade(&self) -> bool {
        self.header("upgrade")
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("websocket"))
    }
}

/// Parse a request head (request line plus headers, excluding the
/// terminating blank line's trailing bytes).
pub fn parse_request_head(head: &[u8]) -> Result<HttpRequest, String> {
    let text =
        std::str::from_utf8(head).map_err(|_| "request head is not valid UTF-8".to_string())?;

    let mut lines = text.split("\r\n");
    let request_line = lines
        .next()
        .filter(|line| !line.is_empty())
        .ok_or_else(|| "empty request".to_string())?;

    let mut parts = request_line.split_whitespace();
    let method = parts.next().ok_or("missing method")?.to_string();
    let target = parts.next().ok_or("missing request target")?.to_string();
    let version = parts.next().ok_or("missing HTTP version")?;
    if !version.starts_with("HTTP/1.") {
        return Err(format!("unsupported protocol version: {}", version));
    }

    let mut headers = Vec::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| format!("malformed header line: {}", line))?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    Ok(HttpRequest {
        method,
        target,
        headers,
    })
}

/// Serve one HTTP exchange: read the body (if any), dispatch, write the
/// response, done. `body` starts as whatever the head sniffer
/// over-read.
pub async fn serve<S>(mut stream: S, request: &HttpRequest, mut body: Vec<u8>) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if request.method == "POST" {
        let content_length = match request.content_length() {
            Some(length) => length,
            None => {
                return write_response(
                    &mut stream,
                    400,
                    &error_json("missing or invalid Content-Length"),
                )
                .await;
            }
        };
        if content_length > MAX_INPUT_BYTES {
            return write_response(
                &mut stream,
                413,
                &error_json(&format!(
                    "payload too large: limit is {} bytes",
                    MAX_INPUT_BYTES
                )),
            )
            .await;
        }

        let mut chunk = [0u8; 8192];
        while body.len() < content_length {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return write_response(&mut stream, 400, &error_json("request body truncated"))
                    .await;
            }
            body.extend_from_slice(&chunk[..n]);
        }
        body.truncate(content_length);
    }

    let (status, response_body) = dispatch(request, &body);
    write_response(&mut stream, status, &response_body).await
}

/// Route a fully-read request to a `(status, JSON body)` pair.
pub fn dispatch(request: &HttpRequest, body: &[u8]) -> (u16, String) {
    match (request.method.as_str(), request.target.as_str()) {
        ("OPTIONS", DETECT_PATH) => (204, String::new()),
        ("POST", DETECT_PATH) => detect_response(request, body),
        (_, DETECT_PATH) => (405, error_json("method not allowed; POST an audio upload")),
        _ => (404, error_json("no such endpoint")),
    }
}

/// Handle the upload endpoint body: multipart extraction, then the
/// shared detection pipeline.
fn detect_response(request: &HttpRequest, body: &[u8]) -> (u16, String) {
    let boundary = match request.header("content-type").and_then(multipart_boundary) {
        Some(boundary) => boundary,
        None => {
            return (
                400,
                error_json("expected multipart/form-data with a boundary"),
            );
        }
    };

    let part = match extract_file_part(body, &boundary) {
        Some(part) => part,
        None => return (400, error_json("multipart field 'file' not found")),
    };

    let hint = part
        .filename
        .as_deref()
        .and_then(|name| std::path::Path::new(name).extension().and_then(|e| e.to_str()));

    match detect_from_bytes(&part.data, hint) {
        Ok(result) => {
            let json = serde_json::to_string(&result)
                .unwrap_or_else(|_| r#"{"note":"No note detected"}"#.to_string());
            (200, json)
        }
        Err(e) => {
            eprintln!("Detection failed for HTTP upload: {}", e);
            (500, error_json(&e.to_string()))
        }
    }
}

/// `{"error": ...}` body.
pub fn error_json(message: &str) -> String {
    serde_json::to_string(&ErrorBody::new(message))
        .unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string())
}

/// Write a complete response and flush. Every response allows
/// cross-origin callers, matching the original service.
pub async fn write_response<S>(stream: &mut S, status: u16, body: &str) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let mut response = format!("HTTP/1.1 {} {}\r\n", status, reason_phrase(status));
    response.push_str("Access-Control-Allow-Origin: *\r\n");
    if status == 204 {
        response.push_str("Access-Control-Allow-Methods: POST, OPTIONS\r\n");
        response.push_str("Access-Control-Allow-Headers: Content-Type\r\n");
    }
    if !body.is_empty() {
        response.push_str("Content-Type: application/json\r\n");
    }
    response.push_str(&format!("Content-Length: {}\r\n", body.len()));
    response.push_str("Connection: close\r\n\r\n");
    response.push_str(body);

    stream.write_all(response.as_bytes()).await?;
    stream.flush().await
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// One extracted multipart field.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    /// Raw field content.
    pub data: Vec<u8>,
    /// `filename` parameter of the Content-Disposition, if any.
    pub filename: Option<String>,
}

/// Pull the boundary parameter out of a `multipart/form-data`
/// Content-Type value.
pub fn multipart_boundary(content_type: &str) -> Option<String> {
    let mut parts = content_type.split(';');
    let kind = parts.next()?.trim();
    if !kind.eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }
    parts.find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("boundary")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

/// Extract the `file` field from a multipart/form-data body.
pub fn extract_file_part(body: &[u8], boundary: &str) -> Option<FilePart> {
    let delimiter = format!("--{}", boundary).into_bytes();
    let mut pos = find_subsequence(body, &delimiter, 0)?;

    loop {
        pos += delimiter.len();
        if body[pos..].starts_with(b"--") {
            return None; // closing delimiter, no match
        }
        if body[pos..].starts_with(b"\r\n") {
            pos += 2;
        }

        let headers_end = find_subsequence(body, b"\r\n\r\n", pos)?;
        let headers = String::from_utf8_lossy(&body[pos..headers_end]);
        let content_start = headers_end + 4;

        let next = find_subsequence(body, &delimiter, content_start)?;
        // Part content ends with a CRLF before the next delimiter
        let content_end = if next >= 2 && &body[next - 2..next] == b"\r\n" {
            next - 2
        } else {
            next
        };

        if let Some(disposition) = headers
            .lines()
            .find(|line| line.to_ascii_lowercase().starts_with("content-disposition"))
        {
            if disposition_param(disposition, "name").as_deref() == Some("file") {
                return Some(FilePart {
                    data: body[content_start..content_end].to_vec(),
                    filename: disposition_param(disposition, "filename"),
                });
            }
        }

        pos = next;
    }
}

/// Read one quoted parameter (`name`, `filename`) from a
/// Content-Disposition header line.
fn disposition_param(line: &str, param: &str) -> Option<String> {
    line.split(';').skip(1).find_map(|piece| {
        let (key, value) = piece.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case(param)
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

/// First occurrence of `needle` in `haystack` at or after `from`.
fn find_subsequence(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + from)
}
