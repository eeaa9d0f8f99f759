use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::TranscriptError;

const MEGABYTE: u64 = 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whisper API settings
    pub whisper: WhisperConfig,

    /// Audio rendition uploaded for transcription
    pub audio: AudioConfig,

    /// External media tools
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhisperConfig {
    /// API base URL, `/audio/transcriptions` is appended
    pub api_base: String,

    /// Transcription model
    pub model: String,

    /// Upload ceiling in megabytes
    pub max_upload_mb: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Channel count
    pub channels: u8,

    /// ffmpeg audio encoder
    pub codec: String,

    /// Target bitrate, ffmpeg syntax (e.g. `32k`)
    pub bitrate: String,

    /// File name written inside the scratch directory
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "whisper-1".to_string(),
            max_upload_mb: 25,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            codec: "libopus".to_string(),
            bitrate: "32k".to_string(),
            file_name: "audio.ogg".to_string(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl WhisperConfig {
    /// Upload ceiling in bytes
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(MEGABYTE)
    }
}

impl Config {
    /// Load configuration from an explicit file, the user config file, or defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Loading configuration from {}", path.display());

        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML; an empty document yields defaults
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(content).context("Failed to parse config file")
    }

    /// Get configuration file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("local-transcript").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let api_base = Url::parse(&self.whisper.api_base).map_err(|e| {
            TranscriptError::Config(format!("api_base {:?}: {}", self.whisper.api_base, e))
        })?;

        if !matches!(api_base.scheme(), "http" | "https") {
            return Err(TranscriptError::Config("api_base must use HTTP or HTTPS".to_string()).into());
        }

        if self.whisper.max_upload_mb == 0 {
            return Err(TranscriptError::Config("max_upload_mb must be positive".to_string()).into());
        }

        if self.whisper.max_upload_mb.checked_mul(MEGABYTE).is_none() {
            return Err(TranscriptError::Config(format!(
                "max_upload_mb {} is too large",
                self.whisper.max_upload_mb
            ))
            .into());
        }

        if self.audio.sample_rate == 0 || self.audio.channels == 0 {
            return Err(TranscriptError::Config(
                "audio sample_rate and channels must be positive".to_string(),
            )
            .into());
        }

        if self.audio.file_name.trim().is_empty() {
            return Err(TranscriptError::Config("audio file_name must not be empty".to_string()).into());
        }

        Ok(())
    }

    /// Apply command-line overrides
    pub fn with_api_base(mut self, api_base: Option<&str>) -> Result<Self> {
        if let Some(api_base) = api_base {
            self.whisper.api_base = api_base.to_string();
            self.validate()?;
        }
        Ok(self)
    }
}
