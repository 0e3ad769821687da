//! Detect command implementation
//!
//! Decodes an audio file, estimates its dominant pitch, and prints the
//! nearest note.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use pitchpipe_core::DetectionResult;

use crate::analysis::detect_from_bytes;
use crate::commands::serve::ErrorBody;

/// Run the detect command
///
/// # Arguments
/// * `input_path` - Path to the audio file to analyze
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(input_path: &str, json_output: bool) -> Result<ExitCode> {
    let path = Path::new(input_path);
    let data =
        fs::read(path).with_context(|| format!("Failed to read file: {}", input_path))?;
    let hint = path.extension().and_then(|e| e.to_str());

    if json_output {
        // Same shape as the HTTP endpoint, success and failure alike
        match detect_from_bytes(&data, hint) {
            Ok(result) => {
                println!("{}", serde_json::to_string(&result)?);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                println!("{}", serde_json::to_string(&ErrorBody::new(e.to_string()))?);
                Ok(ExitCode::from(1))
            }
        }
    } else {
        println!("{} {}", "Analyzing:".cyan().bold(), input_path);

        let result = detect_from_bytes(&data, hint)
            .map_err(|e| anyhow::anyhow!("Detection failed: {}", e))?;

        match result {
            DetectionResult::Detected { note, frequency_hz } => {
                println!("{} {}", "Note:".green().bold(), note);
                println!("{} {:.2} Hz", "Frequency:".dimmed(), frequency_hz);
            }
            DetectionResult::NotDetected => {
                println!("{}", "No note detected".yellow());
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}
