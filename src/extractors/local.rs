use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

use super::{MediaExtractor, SubtitleStream};
use crate::config::{AudioConfig, Config, ToolsConfig};
use crate::{Result, TranscriptError};

/// Media extractor backed by the local ffprobe/ffmpeg binaries
pub struct LocalMediaExtractor {
    tools: ToolsConfig,
    audio: AudioConfig,
}

impl LocalMediaExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            tools: config.tools.clone(),
            audio: config.audio.clone(),
        }
    }

    async fn run_ffprobe(&self, path: &Path) -> std::io::Result<Output> {
        Command::new(&self.tools.ffprobe)
            .args([
                "-v", "quiet",
                "-print_format", "json",
                "-show_streams",
                "-select_streams", "s",
            ])
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
    }
}

#[async_trait]
impl MediaExtractor for LocalMediaExtractor {
    async fn probe_subtitle_streams(&self, path: &Path) -> Vec<SubtitleStream> {
        let output = match self.run_ffprobe(path).await {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!("Could not run {}: {}", self.tools.ffprobe, e);
                return Vec::new();
            }
        };

        if !output.status.success() {
            tracing::debug!("ffprobe exited with {}, assuming no subtitles", output.status);
            return Vec::new();
        }

        parse_stream_listing(&String::from_utf8_lossy(&output.stdout))
    }

    async fn extract_subtitles(&self, path: &Path, track: usize) -> Result<String> {
        tracing::debug!("Extracting subtitle track {} from {}", track, path.display());

        let stream_map = format!("0:s:{}", track);
        let output = Command::new(&self.tools.ffmpeg)
            .args(["-v", "error", "-i"])
            .arg(path)
            .args(["-map", stream_map.as_str(), "-f", "srt", "-"])
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.tools.ffmpeg))?;

        if !output.status.success() {
            return Err(TranscriptError::SubtitleExtraction {
                track,
                details: filter_ffmpeg_stderr(&String::from_utf8_lossy(&output.stderr)),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn extract_audio(&self, path: &Path, dest_dir: &Path) -> Result<PathBuf> {
        let audio_path = dest_dir.join(&self.audio.file_name);
        tracing::debug!("Compressing audio {} -> {}", path.display(), audio_path.display());

        let channels = self.audio.channels.to_string();
        let sample_rate = self.audio.sample_rate.to_string();

        let output = Command::new(&self.tools.ffmpeg)
            .args(["-v", "error", "-y", "-i"])
            .arg(path)
            .args([
                "-vn", // no video
                "-ac", channels.as_str(),
                "-ar", sample_rate.as_str(),
                "-c:a", self.audio.codec.as_str(),
                "-b:a", self.audio.bitrate.as_str(),
            ])
            .arg(&audio_path)
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.tools.ffmpeg))?;

        if !output.status.success() {
            return Err(TranscriptError::AudioExtraction(filter_ffmpeg_stderr(
                &String::from_utf8_lossy(&output.stderr),
            ))
            .into());
        }

        Ok(audio_path)
    }
}

/// Parse `ffprobe -print_format json -show_streams` output into subtitle streams.
///
/// Empty or malformed output is treated as "no subtitles".
pub fn parse_stream_listing(json: &str) -> Vec<SubtitleStream> {
    if json.trim().is_empty() {
        return Vec::new();
    }

    let info: serde_json::Value = match serde_json::from_str(json) {
        Ok(info) => info,
        Err(e) => {
            tracing::debug!("Unreadable ffprobe output: {}", e);
            return Vec::new();
        }
    };

    let Some(streams) = info["streams"].as_array() else {
        return Vec::new();
    };

    streams
        .iter()
        .enumerate()
        .map(|(position, stream)| {
            let tag = |name: &str| {
                stream["tags"][name]
                    .as_str()
                    .map(|value| value.to_string())
            };

            SubtitleStream {
                index: stream["index"]
                    .as_u64()
                    .map(|index| index as usize)
                    .unwrap_or(position),
                codec_name: stream["codec_name"]
                    .as_str()
                    .unwrap_or("unknown")
                    .to_string(),
                language: tag("language"),
                title: tag("title"),
            }
        })
        .collect()
}

/// Keep only the meaningful lines of ffmpeg's stderr
fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if meaningful.is_empty() {
        "ffmpeg exited with an error and no diagnostics".to_string()
    } else {
        meaningful.join("\n")
    }
}
