//! WebSocket event handling for the detection server.

use base64::Engine;
use tokio_tungstenite::tungstenite::Message;

use pitchpipe_core::DetectionResult;

use crate::analysis::detect_from_bytes;

use super::types::{ClientEvent, ServerEvent};

/// Process a single WebSocket message and return a response.
/// `None` means no reply is owed.
pub async fn process_message(msg: Message) -> Option<String> {
    match msg {
        Message::Text(text) => handle_event(&text),
        // A binary frame is a raw audio chunk
        Message::Binary(data) => Some(detection_response(&data, None)),
        Message::Ping(_) | Message::Pong(_) => {
            // Handled automatically by tungstenite
            None
        }
        Message::Close(_) => None,
        Message::Frame(_) => None,
    }
}

/// Handle a tagged JSON event from the client.
fn handle_event(text: &str) -> Option<String> {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            // The protocol defines no error event; log and stay quiet.
            eprintln!("Ignoring unparseable client event: {}", e);
            return None;
        }
    };

    match event {
        ClientEvent::Ping => Some(serialize_event(&ServerEvent::pong())),
        ClientEvent::AudioChunk { data, filename } => {
            let bytes = match base64::engine::general_purpose::STANDARD.decode(&data) {
                Ok(bytes) => bytes,
                Err(e) => {
                    eprintln!("Audio chunk with invalid base64: {}", e);
                    return Some(serialize_event(&ServerEvent::note_detected(
                        DetectionResult::NotDetected,
                    )));
                }
            };
            let hint = filename.as_deref().and_then(|name| {
                std::path::Path::new(name)
                    .extension()
                    .and_then(|e| e.to_str())
            });
            Some(detection_response(&bytes, hint))
        }
    }
}

/// Run the detection pipeline and serialize the outcome. Failures are
/// logged and degrade to "No note detected" so the client always
/// receives a response.
fn detection_response(data: &[u8], extension_hint: Option<&str>) -> String {
    let result = match detect_from_bytes(data, extension_hint) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Detection failed on audio chunk: {}", e);
            DetectionResult::NotDetected
        }
    };
    serialize_event(&ServerEvent::note_detected(result))
}

fn serialize_event(event: &ServerEvent) -> String {
    serde_json::to_string(event).unwrap_or_else(|_| {
        r#"{"type":"note_detected","note":"No note detected"}"#.to_string()
    })
}
