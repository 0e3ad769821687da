//! Shared detection pipeline.
//!
//! Decode, estimate, resolve: the one function every transport adapter
//! (HTTP upload, WebSocket chunk, `detect` command) calls. The original
//! service duplicated the note table across two servers; keeping the
//! pipeline here keeps the adapters thin.

use thiserror::Error;

use pitchpipe_audio::{decode_bytes, estimate_pitch, DecodeError, EstimationError};
use pitchpipe_core::{resolve, DetectionResult};

/// Failure in either half of the pipeline. "No reliable pitch" is not a
/// failure; it comes back as [`DetectionResult::NotDetected`].
#[derive(Debug, Error)]
pub enum DetectError {
    /// The payload could not be decoded to a waveform.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The decoded waveform could not be analyzed.
    #[error(transparent)]
    Estimation(#[from] EstimationError),
}

/// Decode an audio payload, estimate its dominant pitch, and resolve
/// the nearest note.
///
/// `extension_hint` narrows the container probe (e.g. `Some("webm")`
/// from an uploaded filename); pass `None` to sniff the bytes alone.
pub fn detect_from_bytes(
    data: &[u8],
    extension_hint: Option<&str>,
) -> Result<DetectionResult, DetectError> {
    let audio = decode_bytes(data, extension_hint)?;
    let frequency = estimate_pitch(&audio.samples, audio.sample_rate)?;
    Ok(resolve(frequency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_test_wav, sine};
    use pretty_assertions::assert_eq;

    #[test]
    fn sine_wav_resolves_to_concert_a() {
        let wav = create_test_wav(&sine(440.0, 0.5, 44100, 44100), 44100);
        let result = detect_from_bytes(&wav, Some("wav")).unwrap();
        assert_eq!(result.note(), Some("A4"));
    }

    #[test]
    fn middle_c_survives_the_full_pipeline() {
        let wav = create_test_wav(&sine(261.63, 0.5, 44100, 44100), 44100);
        let result = detect_from_bytes(&wav, Some("wav")).unwrap();
        assert_eq!(result.note(), Some("C4"));
    }

    #[test]
    fn silent_wav_detects_nothing() {
        let wav = create_test_wav(&vec![0.0; 44100], 44100);
        let result = detect_from_bytes(&wav, Some("wav")).unwrap();
        assert_eq!(result, DetectionResult::NotDetected);
    }

    #[test]
    fn garbage_payload_is_a_decode_error() {
        let err = detect_from_bytes(b"not audio at all", Some("webm")).unwrap_err();
        assert!(matches!(err, DetectError::Decode(_)));
    }
}
