use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "local-transcript",
    about = "Get a transcript from a local video/audio file",
    version,
    long_about = "Extracts a transcript from a local video or audio file. Embedded subtitle tracks are used when present; otherwise the audio is compressed and sent to the OpenAI Whisper API."
)]
pub struct Cli {
    /// Path to video or audio file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Include timestamps in output
    #[arg(short, long)]
    pub timestamps: bool,

    /// Subtitle track index to extract (clamped to the available tracks)
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub sub_track: usize,

    /// OpenAI API key, only needed when the file has no embedded subtitles
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Override the transcription API base URL
    #[arg(long, env = "OPENAI_BASE_URL", value_name = "URL")]
    pub api_base: Option<String>,

    /// Configuration file (YAML)
    #[arg(short, long, env = "LOCAL_TRANSCRIPT_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors, disable progress indicators
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Default tracing filter for the selected verbosity
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "local_transcript=debug"
        } else if self.quiet {
            "local_transcript=warn"
        } else {
            "local_transcript=info"
        }
    }

    /// API key with blank values treated as unset
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
