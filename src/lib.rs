//! Local Transcript - extract a transcript from a local video or audio file
//!
//! Embedded subtitle tracks are preferred: they are pulled out with ffmpeg as SRT and
//! flattened into plain (or timestamped) lines. Files without subtitles fall back to
//! the OpenAI Whisper API on a small mono Opus rendition of the audio.

use std::path::PathBuf;

pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod transcribe;
pub mod utils;

pub use cli::Cli;
pub use config::Config;
pub use extractors::{MediaExtractor, SubtitleStream};
pub use output::CaptionEntry;
pub use transcribe::{Transcriber, TranscriptionPipeline, Transcript, TranscriptSource};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the transcript tool
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No embedded subtitles found and OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("Failed to extract subtitle track {track}: {details}")]
    SubtitleExtraction { track: usize, details: String },

    #[error("Failed to extract audio: {0}")]
    AudioExtraction(String),

    #[error(
        "Compressed audio ({:.1} MB) exceeds the {:.0} MB Whisper limit. Try a shorter file or lower bitrate.",
        utils::megabytes(*.size_bytes),
        utils::megabytes(*.limit_bytes)
    )]
    AudioTooLarge { size_bytes: u64, limit_bytes: u64 },

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
