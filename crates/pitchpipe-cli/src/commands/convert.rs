//! Convert command implementation
//!
//! Decodes a compressed audio file (WebM, Ogg, MP3, ...) and writes it
//! back out as a 16-bit PCM mono WAV at the source sample rate.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use pitchpipe_audio::{decode_bytes, encode_wav};

/// Run the convert command
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(input_path: &str, output_path: &str) -> Result<ExitCode> {
    let data =
        fs::read(input_path).with_context(|| format!("Failed to read file: {}", input_path))?;
    let hint = Path::new(input_path).extension().and_then(|e| e.to_str());

    let audio =
        decode_bytes(&data, hint).map_err(|e| anyhow::anyhow!("Conversion failed: {}", e))?;
    let wav = encode_wav(&audio).map_err(|e| anyhow::anyhow!("WAV encoding failed: {}", e))?;

    fs::write(output_path, &wav)
        .with_context(|| format!("Failed to write to: {}", output_path))?;

    println!(
        "{} {} ({:.2}s @ {} Hz)",
        "Converted to:".green().bold(),
        output_path,
        audio.duration_secs(),
        audio.sample_rate
    );

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_test_wav, sine};

    #[test]
    fn converts_wav_to_wav() {
        let tmp = tempfile::tempdir().unwrap();
        let in_path = tmp.path().join("tone.wav");
        let out_path = tmp.path().join("out.wav");

        let wav = create_test_wav(&sine(440.0, 0.5, 22050, 22050), 22050);
        fs::write(&in_path, &wav).unwrap();

        run(in_path.to_str().unwrap(), out_path.to_str().unwrap()).unwrap();

        let written = fs::read(&out_path).unwrap();
        assert_eq!(&written[..4], b"RIFF");
        assert_eq!(&written[8..12], b"WAVE");
    }

    #[test]
    fn missing_input_is_an_error() {
        assert!(run("/nonexistent/clip.webm", "/tmp/out.wav").is_err());
    }

    #[test]
    fn garbage_input_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let in_path = tmp.path().join("bad.webm");
        fs::write(&in_path, b"not audio").unwrap();

        let err = run(in_path.to_str().unwrap(), "/tmp/out.wav").unwrap_err();
        assert!(err.to_string().contains("Conversion failed"));
    }
}
