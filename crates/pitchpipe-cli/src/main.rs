//! pitchpipe CLI - nearest-note detection for audio clips
//!
//! This binary provides commands for detecting the dominant musical
//! note in an audio file, converting audio to WAV, and running the
//! HTTP + WebSocket detection server.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

// Use modules from the library crate
use pitchpipe_cli::commands;

/// pitchpipe - map an audio clip to its nearest musical note
#[derive(Parser)]
#[command(name = "pitchpipe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the dominant note in an audio file
    Detect {
        /// Path to the input audio file (WebM, Ogg, WAV, MP3, ...)
        #[arg(short, long)]
        input: String,

        /// Output machine-readable JSON (the HTTP response shape)
        #[arg(long)]
        json: bool,
    },
    /// Convert an audio file to 16-bit PCM WAV
    Convert {
        /// Path to the input audio file
        #[arg(short, long)]
        input: String,

        /// Path of the WAV file to write
        #[arg(short, long)]
        output: String,
    },
    /// Run the HTTP + WebSocket note-detection server
    Serve {
        /// Bind address
        #[arg(long, default_value = commands::serve::DEFAULT_HOST)]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = commands::serve::DEFAULT_PORT)]
        port: u16,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Detect { input, json } => commands::detect::run(&input, json),
        Commands::Convert { input, output } => commands::convert::run(&input, &output),
        Commands::Serve { host, port } => commands::serve::run(&host, port),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_detect() {
        let cli = Cli::try_parse_from(["pitchpipe", "detect", "--input", "clip.webm", "--json"])
            .unwrap();
        match cli.command {
            Commands::Detect { input, json } => {
                assert_eq!(input, "clip.webm");
                assert!(json);
            }
            _ => panic!("expected detect command"),
        }
    }

    #[test]
    fn test_cli_parses_convert() {
        let cli = Cli::try_parse_from([
            "pitchpipe",
            "convert",
            "--input",
            "clip.webm",
            "--output",
            "clip.wav",
        ])
        .unwrap();
        match cli.command {
            Commands::Convert { input, output } => {
                assert_eq!(input, "clip.webm");
                assert_eq!(output, "clip.wav");
            }
            _ => panic!("expected convert command"),
        }
    }

    #[test]
    fn test_cli_parses_serve_defaults() {
        let cli = Cli::try_parse_from(["pitchpipe", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, commands::serve::DEFAULT_HOST);
                assert_eq!(port, commands::serve::DEFAULT_PORT);
            }
            _ => panic!("expected serve command"),
        }
    }

    #[test]
    fn test_cli_parses_serve_custom_bind() {
        let cli = Cli::try_parse_from(["pitchpipe", "serve", "--host", "0.0.0.0", "--port", "8080"])
            .unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, "0.0.0.0");
                assert_eq!(port, 8080);
            }
            _ => panic!("expected serve command"),
        }
    }
}
