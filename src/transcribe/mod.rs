use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tempfile::TempDir;

use crate::extractors::{select_track, MediaExtractor};
use crate::output::parse_srt_transcript;
use crate::utils::{self, check_upload_size, format_file_size};
use crate::{Result, TranscriptError};

pub mod processor;
pub mod whisper;

pub use whisper::WhisperClient;

/// Speech-to-text service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file, either as plain text or as `[MM:SS]`-prefixed lines
    async fn transcribe(&self, audio_path: &Path, with_timestamps: bool) -> Result<String>;
}

/// Where a transcript came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranscriptSource {
    /// Embedded subtitle track `track` out of `available`
    Subtitles { track: usize, available: usize },
    /// Speech-to-text on the extracted audio
    Speech,
}

/// Finished transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub source: TranscriptSource,
}

/// Per-run options
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptOptions {
    pub with_timestamps: bool,
    pub sub_track: usize,
}

/// Subtitles-first transcript pipeline
pub struct TranscriptionPipeline<E, T> {
    extractor: E,
    transcriber: Option<T>,
    max_upload_bytes: u64,
}

impl<E, T> TranscriptionPipeline<E, T>
where
    E: MediaExtractor,
    T: Transcriber,
{
    /// Create a pipeline; without a transcriber only files with subtitles can be handled
    pub fn new(extractor: E, transcriber: Option<T>, max_upload_bytes: u64) -> Self {
        Self {
            extractor,
            transcriber,
            max_upload_bytes,
        }
    }

    /// Produce a transcript for a local media file
    pub async fn run(&self, input: &Path, options: TranscriptOptions) -> Result<Transcript> {
        let file_path = utils::resolve_input_path(input)?;

        let streams = self.extractor.probe_subtitle_streams(&file_path).await;
        if !streams.is_empty() {
            let track = select_track(options.sub_track, streams.len());
            tracing::info!(
                "Found {} subtitle track(s), extracting track {}...",
                streams.len(),
                track
            );

            let stream = &streams[track];
            tracing::debug!(
                "Track {}: stream #{} codec={} language={}",
                track,
                stream.index,
                stream.codec_name,
                stream.language.as_deref().unwrap_or("und")
            );
            if stream.is_bitmap() {
                tracing::warn!(
                    "Subtitle track {} is image-based ({}) and may not convert to text",
                    track,
                    stream.codec_name
                );
            }

            let srt = self.extractor.extract_subtitles(&file_path, track).await?;
            return Ok(Transcript {
                text: parse_srt_transcript(&srt, options.with_timestamps),
                source: TranscriptSource::Subtitles {
                    track,
                    available: streams.len(),
                },
            });
        }

        let transcriber = self
            .transcriber
            .as_ref()
            .ok_or(TranscriptError::MissingApiKey)?;

        tracing::info!("No embedded subtitles found, transcribing with Whisper API...");

        let scratch = TempDir::new().context("Failed to create temporary directory")?;
        let audio_path = self.extractor.extract_audio(&file_path, scratch.path()).await?;

        let size_bytes = fs_err::metadata(&audio_path)
            .context("Extracted audio is missing")?
            .len();
        tracing::info!(
            "Audio extracted ({}), sending to Whisper...",
            format_file_size(size_bytes)
        );
        check_upload_size(size_bytes, self.max_upload_bytes)?;

        let text = transcriber
            .transcribe(&audio_path, options.with_timestamps)
            .await?;

        Ok(Transcript {
            text,
            source: TranscriptSource::Speech,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{MockMediaExtractor, SubtitleStream};
    use mockall::predicate::eq;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    const LIMIT: u64 = 25 * 1024 * 1024;
    const SRT: &str = "1\n00:00:01,000 --> 00:00:03,000\nHello world\n\n";

    fn input_file() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.mkv");
        fs_err::write(&path, b"media").unwrap();
        (dir, path)
    }

    fn streams(count: usize) -> Vec<SubtitleStream> {
        (0..count)
            .map(|i| SubtitleStream {
                index: i + 2,
                codec_name: "subrip".to_string(),
                language: None,
                title: None,
            })
            .collect()
    }

    fn timestamps() -> TranscriptOptions {
        TranscriptOptions {
            with_timestamps: true,
            sub_track: 0,
        }
    }

    /// Extractor mock that writes an audio file of `size` bytes into the scratch dir
    fn audio_extractor(size: u64, seen_dir: Arc<Mutex<Option<PathBuf>>>) -> MockMediaExtractor {
        let mut extractor = MockMediaExtractor::new();
        extractor
            .expect_probe_subtitle_streams()
            .returning(|_| Vec::new());
        extractor.expect_extract_subtitles().never();
        extractor
            .expect_extract_audio()
            .times(1)
            .returning(move |_, dir| {
                *seen_dir.lock().unwrap() = Some(dir.to_path_buf());
                let path = dir.join("audio.ogg");
                let file = std::fs::File::create(&path)?;
                file.set_len(size)?;
                Ok(path)
            });
        extractor
    }

    #[tokio::test]
    async fn test_subtitles_skip_transcription() {
        let (_dir, path) = input_file();

        let mut extractor = MockMediaExtractor::new();
        extractor
            .expect_probe_subtitle_streams()
            .returning(|_| streams(1));
        extractor
            .expect_extract_subtitles()
            .with(mockall::predicate::always(), eq(0))
            .times(1)
            .returning(|_, _| Ok(SRT.to_string()));
        extractor.expect_extract_audio().never();

        let mut transcriber = MockTranscriber::new();
        transcriber.expect_transcribe().never();

        let pipeline = TranscriptionPipeline::new(extractor, Some(transcriber), LIMIT);
        let transcript = pipeline.run(&path, timestamps()).await.unwrap();

        assert_eq!(transcript.text, "[00:01] Hello world");
        assert_eq!(
            transcript.source,
            TranscriptSource::Subtitles {
                track: 0,
                available: 1
            }
        );
    }

    #[tokio::test]
    async fn test_requested_track_is_clamped() {
        let (_dir, path) = input_file();

        let mut extractor = MockMediaExtractor::new();
        extractor
            .expect_probe_subtitle_streams()
            .returning(|_| streams(2));
        extractor
            .expect_extract_subtitles()
            .with(mockall::predicate::always(), eq(1))
            .times(1)
            .returning(|_, _| Ok(SRT.to_string()));

        let pipeline = TranscriptionPipeline::<_, MockTranscriber>::new(extractor, None, LIMIT);
        let options = TranscriptOptions {
            with_timestamps: false,
            sub_track: 7,
        };
        let transcript = pipeline.run(&path, options).await.unwrap();

        assert_eq!(transcript.text, "Hello world");
        assert_eq!(
            transcript.source,
            TranscriptSource::Subtitles {
                track: 1,
                available: 2
            }
        );
    }

    #[tokio::test]
    async fn test_subtitle_failure_does_not_fall_back() {
        let (_dir, path) = input_file();

        let mut extractor = MockMediaExtractor::new();
        extractor
            .expect_probe_subtitle_streams()
            .returning(|_| streams(1));
        extractor.expect_extract_subtitles().returning(|_, track| {
            Err(TranscriptError::SubtitleExtraction {
                track,
                details: "boom".to_string(),
            }
            .into())
        });
        extractor.expect_extract_audio().never();

        let mut transcriber = MockTranscriber::new();
        transcriber.expect_transcribe().never();

        let pipeline = TranscriptionPipeline::new(extractor, Some(transcriber), LIMIT);
        let err = pipeline.run(&path, timestamps()).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TranscriptError>(),
            Some(TranscriptError::SubtitleExtraction { track: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_audio_extraction() {
        let (_dir, path) = input_file();

        let mut extractor = MockMediaExtractor::new();
        extractor
            .expect_probe_subtitle_streams()
            .returning(|_| Vec::new());
        extractor.expect_extract_audio().never();

        let pipeline = TranscriptionPipeline::<_, MockTranscriber>::new(extractor, None, LIMIT);
        let err = pipeline.run(&path, timestamps()).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TranscriptError>(),
            Some(TranscriptError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_missing_input_is_not_probed() {
        let dir = tempfile::tempdir().unwrap();

        let mut extractor = MockMediaExtractor::new();
        extractor.expect_probe_subtitle_streams().never();

        let pipeline = TranscriptionPipeline::<_, MockTranscriber>::new(extractor, None, LIMIT);
        let err = pipeline
            .run(&dir.path().join("nope.mp4"), timestamps())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TranscriptError>(),
            Some(TranscriptError::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_oversized_audio_never_reaches_the_api() {
        let (_dir, path) = input_file();
        let seen_dir = Arc::new(Mutex::new(None));

        let extractor = audio_extractor(30 * 1024 * 1024, seen_dir.clone());
        let mut transcriber = MockTranscriber::new();
        transcriber.expect_transcribe().never();

        let pipeline = TranscriptionPipeline::new(extractor, Some(transcriber), LIMIT);
        let err = pipeline.run(&path, timestamps()).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TranscriptError>(),
            Some(TranscriptError::AudioTooLarge { size_bytes, .. }) if *size_bytes == 30 * 1024 * 1024
        ));

        let scratch = seen_dir.lock().unwrap().clone().unwrap();
        assert!(!scratch.exists(), "scratch dir should be removed on failure");
    }

    #[tokio::test]
    async fn test_fallback_transcribes_extracted_audio() {
        let (_dir, path) = input_file();
        let seen_dir = Arc::new(Mutex::new(None));

        let extractor = audio_extractor(4096, seen_dir.clone());
        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .withf(|audio, with_timestamps| audio.ends_with("audio.ogg") && *with_timestamps)
            .times(1)
            .returning(|_, _| Ok("[00:00] Hello from Whisper".to_string()));

        let pipeline = TranscriptionPipeline::new(extractor, Some(transcriber), LIMIT);
        let transcript = pipeline.run(&path, timestamps()).await.unwrap();

        assert_eq!(transcript.text, "[00:00] Hello from Whisper");
        assert_eq!(transcript.source, TranscriptSource::Speech);

        let scratch = seen_dir.lock().unwrap().clone().unwrap();
        assert!(!scratch.exists(), "scratch dir should be removed after success");
    }

    #[tokio::test]
    async fn test_audio_extraction_failure_is_fatal() {
        let (_dir, path) = input_file();

        let mut extractor = MockMediaExtractor::new();
        extractor
            .expect_probe_subtitle_streams()
            .returning(|_| Vec::new());
        extractor
            .expect_extract_audio()
            .returning(|_, _| Err(TranscriptError::AudioExtraction("no audio stream".to_string()).into()));

        let mut transcriber = MockTranscriber::new();
        transcriber.expect_transcribe().never();

        let pipeline = TranscriptionPipeline::new(extractor, Some(transcriber), LIMIT);
        let err = pipeline.run(&path, timestamps()).await.unwrap_err();

        assert!(err.to_string().contains("no audio stream"));
    }
}
