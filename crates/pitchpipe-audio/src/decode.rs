//! Audio container decoding using symphonia.
//!
//! Decodes a compressed payload (WebM/Matroska, Ogg, WAV, FLAC, ...) to
//! mono f32 samples at the stream's native sample rate. The payload is
//! decoded from memory; nothing touches the filesystem, so per-request
//! cleanup is simply dropping the returned buffer.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::DecodeError;

/// Maximum payload size we'll attempt to decode (25 MB).
/// Keeps a single upload from holding the process hostage.
pub const MAX_INPUT_BYTES: usize = 25 * 1024 * 1024;

/// A decoded clip: mono samples plus the stream's sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Channel-averaged mono samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Native sample rate of the source stream in Hz.
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Clip duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Decode a compressed audio payload to a mono [`DecodedAudio`].
///
/// `extension_hint` narrows symphonia's format probe the same way a
/// file extension would (e.g. `Some("webm")` for a browser recording);
/// the probe still sniffs the actual bytes, so a wrong hint is
/// harmless.
pub fn decode_bytes(data: &[u8], extension_hint: Option<&str>) -> Result<DecodedAudio, DecodeError> {
    if data.len() > MAX_INPUT_BYTES {
        return Err(DecodeError::TooLarge {
            actual: data.len(),
            limit: MAX_INPUT_BYTES,
        });
    }

    let mss = MediaSourceStream::new(Box::new(Cursor::new(data.to_vec())), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension_hint {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| DecodeError::Unsupported {
            reason: format!("failed to probe format: {}", e),
        })?;

    let mut format = probed.format;

    // First decodable audio track wins
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::Malformed {
            reason: format!("failed to create decoder: {}", e),
        })?;

    let mut sample_rate = codec_params.sample_rate.unwrap_or(0);
    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break; // end of stream
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(DecodeError::Malformed {
                    reason: format!("failed to read packet: {}", e),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Skip corrupted frames, keep whatever decodes
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => {
                return Err(DecodeError::Malformed {
                    reason: format!("decode error: {}", e),
                });
            }
        };

        let spec = *decoded.spec();
        sample_rate = spec.rate;
        let channels = spec.channels.count().max(1);

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.frames() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend(to_mono(sample_buf.samples(), channels));
    }

    if samples.is_empty() || sample_rate == 0 {
        return Err(DecodeError::NoSamples);
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

/// Convert interleaved multi-channel audio to mono by averaging.
fn to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::test_fixtures::wav_bytes_mono_i16;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_wav_fixture() {
        let samples: Vec<f32> = (0..4410).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let wav = wav_bytes_mono_i16(&samples, 44100);

        let audio = decode_bytes(&wav, Some("wav")).unwrap();
        assert_eq!(audio.sample_rate, 44100);
        assert_eq!(audio.samples.len(), 4410);
        // 16-bit quantization allows ~1e-4 error
        assert!((audio.samples[100] - samples[100]).abs() < 1e-3);
    }

    #[test]
    fn decode_works_without_extension_hint() {
        let samples: Vec<f32> = (0..1024).map(|i| (i as f32 * 0.1).sin()).collect();
        let wav = wav_bytes_mono_i16(&samples, 22050);

        let audio = decode_bytes(&wav, None).unwrap();
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.samples.len(), 1024);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let err = decode_bytes(b"definitely not audio data", Some("webm")).unwrap_err();
        assert!(matches!(err, DecodeError::Unsupported { .. }));
    }

    #[test]
    fn oversized_payload_is_rejected_before_probing() {
        let data = vec![0u8; MAX_INPUT_BYTES + 1];
        let err = decode_bytes(&data, None).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::TooLarge {
                actual,
                limit: MAX_INPUT_BYTES,
            } if actual == MAX_INPUT_BYTES + 1
        ));
    }

    #[test]
    fn stereo_downmix_averages_channels() {
        // +0.5 on the left, -0.5 on the right averages to silence
        let left = 0.5f32;
        let right = -0.5f32;
        let mono = to_mono(&[left, right, left, right], 2);
        assert_eq!(mono, vec![0.0, 0.0]);
    }

    #[test]
    fn duration_reflects_sample_count() {
        let audio = DecodedAudio {
            samples: vec![0.0; 22050],
            sample_rate: 44100,
        };
        assert!((audio.duration_secs() - 0.5).abs() < 1e-9);
    }
}
