//! Error types for the audio layer.

use thiserror::Error;

/// Errors that can occur while decoding a compressed audio payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload exceeds the decode size cap.
    #[error("payload too large: {actual} bytes (limit {limit})")]
    TooLarge {
        /// Size of the rejected payload.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Container format not recognized by any registered reader.
    #[error("unsupported or unreadable container: {reason}")]
    Unsupported {
        /// Probe failure detail.
        reason: String,
    },

    /// Container parsed but holds no decodable audio track.
    #[error("no audio track found in container")]
    NoAudioTrack,

    /// Decoder could not be constructed or the stream is corrupt.
    #[error("malformed audio stream: {reason}")]
    Malformed {
        /// Decoder failure detail.
        reason: String,
    },

    /// Stream decoded to zero samples.
    #[error("audio stream contains no samples")]
    NoSamples,
}

/// Errors that can occur during pitch estimation.
#[derive(Debug, Error)]
pub enum EstimationError {
    /// Empty sample buffer.
    #[error("cannot estimate pitch of an empty signal")]
    EmptySignal,

    /// Sample rate of zero makes every frequency undefined.
    #[error("invalid sample rate: {rate}")]
    InvalidSampleRate {
        /// The invalid sample rate.
        rate: u32,
    },
}

/// Errors that can occur while writing a WAV file.
#[derive(Debug, Error)]
pub enum WavError {
    /// Nothing to write.
    #[error("refusing to write an empty WAV file")]
    Empty,

    /// Encoder-level failure.
    #[error("WAV encoding failed: {0}")]
    Encode(#[from] hound::Error),
}
