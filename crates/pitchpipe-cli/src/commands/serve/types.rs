//! Wire types for the detection server.

use serde::{Deserialize, Serialize};

use pitchpipe_core::DetectionResult;

/// Payload of the `pong` reply.
pub const PONG_MESSAGE: &str = "Pong from server";

/// Client-to-server WebSocket events, tagged by `type`.
///
/// A raw binary frame is also accepted and treated as an `audio_chunk`
/// without the base64 envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Liveness probe. Any additional payload fields are ignored.
    Ping,
    /// One audio clip to analyze.
    AudioChunk {
        /// Base64-encoded audio container bytes.
        data: String,
        /// Optional client-side filename, used as a container probe
        /// hint.
        #[serde(default)]
        filename: Option<String>,
    },
}

/// Server-to-client WebSocket events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Reply to [`ClientEvent::Ping`].
    Pong {
        /// Fixed acknowledgement text.
        message: String,
    },
    /// Detection outcome for an audio chunk; payload fields match the
    /// HTTP response body.
    NoteDetected {
        #[serde(flatten)]
        result: DetectionResult,
    },
}

impl ServerEvent {
    /// The canonical `pong` reply.
    pub fn pong() -> Self {
        ServerEvent::Pong {
            message: PONG_MESSAGE.to_string(),
        }
    }

    /// Wrap a detection outcome.
    pub fn note_detected(result: DetectionResult) -> Self {
        ServerEvent::NoteDetected { result }
    }
}

/// Body shape of every HTTP error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable failure description.
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
