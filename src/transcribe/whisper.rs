use anyhow::Context;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::multipart::{Form, Part};
use std::path::Path;
use std::time::Duration;
use url::Url;

use super::processor::VerboseTranscription;
use super::Transcriber;
use crate::config::WhisperConfig;
use crate::{Result, TranscriptError};

/// OpenAI Whisper transcription client
pub struct WhisperClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
    show_progress: bool,
}

impl WhisperClient {
    pub fn new(api_key: &str, config: &WhisperConfig, show_progress: bool) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: transcription_endpoint(&config.api_base)?,
            api_key: api_key.to_string(),
            model: config.model.clone(),
            show_progress,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn spinner(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
            progress.set_style(style);
        }
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }
}

#[async_trait]
impl Transcriber for WhisperClient {
    async fn transcribe(&self, audio_path: &Path, with_timestamps: bool) -> Result<String> {
        let content = tokio::fs::read(audio_path)
            .await
            .with_context(|| format!("Failed to read {}", audio_path.display()))?;

        let file_name = audio_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.ogg".to_string());

        let response_format = if with_timestamps { "verbose_json" } else { "text" };

        let form = Form::new()
            .part(
                "file",
                Part::bytes(content)
                    .file_name(file_name)
                    .mime_str("audio/ogg")?,
            )
            .text("model", self.model.clone())
            .text("response_format", response_format);

        tracing::debug!("POST {} (response_format={})", self.endpoint, response_format);

        let progress = self.spinner();
        progress.set_message("Transcribing with Whisper...");

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await;

        progress.finish_and_clear();
        let response = response.context("Failed to reach the transcription API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscriptError::Transcription(format!("HTTP {}: {}", status, body.trim())).into());
        }

        if !with_timestamps {
            return response
                .text()
                .await
                .context("Failed to read transcription response");
        }

        let verbose: VerboseTranscription = response
            .json()
            .await
            .context("Failed to parse transcription response")?;

        tracing::debug!(
            "Received {} segment(s), language {:?}, duration {:?}s",
            verbose.segments.len(),
            verbose.language,
            verbose.duration
        );

        Ok(verbose.render_timestamped())
    }
}

/// Build `{api_base}/audio/transcriptions`
fn transcription_endpoint(api_base: &str) -> Result<Url> {
    let endpoint = format!("{}/audio/transcriptions", api_base.trim_end_matches('/'));
    Url::parse(&endpoint)
        .map_err(|e| TranscriptError::Config(format!("api_base {:?}: {}", api_base, e)).into())
}
