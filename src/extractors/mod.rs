use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod local;

pub use local::LocalMediaExtractor;

use crate::Result;

/// Subtitle stream found in a media container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleStream {
    /// Absolute stream index within the container
    pub index: usize,

    /// Codec name as reported by ffprobe (subrip, ass, mov_text, ...)
    pub codec_name: String,

    /// Language tag, if any
    pub language: Option<String>,

    /// Track title, if any
    pub title: Option<String>,
}

impl SubtitleStream {
    /// Image-based subtitle codecs cannot be converted to text
    pub fn is_bitmap(&self) -> bool {
        matches!(
            self.codec_name.as_str(),
            "hdmv_pgs_subtitle" | "dvd_subtitle" | "dvb_subtitle" | "xsub"
        )
    }
}

/// Media operations the transcript pipeline needs from external tools
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// List subtitle streams; any probing failure yields an empty list
    async fn probe_subtitle_streams(&self, path: &Path) -> Vec<SubtitleStream>;

    /// Extract the n-th subtitle stream as SRT text
    async fn extract_subtitles(&self, path: &Path, track: usize) -> Result<String>;

    /// Write a compressed mono rendition of the audio into `dest_dir`
    async fn extract_audio(&self, path: &Path, dest_dir: &Path) -> Result<PathBuf>;
}

/// Clamp a requested subtitle track to the available streams.
///
/// `available` must be non-zero.
pub fn select_track(requested: usize, available: usize) -> usize {
    requested.min(available.saturating_sub(1))
}
