//! pitchpipe audio layer
//!
//! This crate wraps the external audio machinery the note resolver
//! depends on:
//!
//! - [`decode`] - compressed container (WebM, Ogg, WAV, ...) to mono
//!   f32 PCM, via symphonia. Decoding happens entirely in memory; no
//!   temp files are written.
//! - [`pitch`] - dominant-frequency estimation over the decoded
//!   waveform: an STFT salience scan whose strongest spectral peak is
//!   refined by parabolic interpolation.
//! - [`wav`] - 16-bit PCM WAV encoding for the `convert` command.
//!
//! None of the signal-processing math here is original: the FFT is
//! rustfft, the container parsing is symphonia, and the WAV encoder is
//! hound. "No reliable pitch" is reported as an estimate of `0.0`, not
//! an error; errors mean the input itself was unusable.

pub mod decode;
pub mod error;
pub mod pitch;
pub mod wav;

// Re-export main types at crate root
pub use decode::{decode_bytes, DecodedAudio, MAX_INPUT_BYTES};
pub use error::{DecodeError, EstimationError, WavError};
pub use pitch::estimate_pitch;
pub use wav::encode_wav;
