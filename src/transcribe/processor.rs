use serde::Deserialize;

use crate::output::{render_entries, CaptionEntry};

/// Whisper `verbose_json` transcription response
#[derive(Debug, Deserialize)]
pub struct VerboseTranscription {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
pub struct Segment {
    /// Start time in seconds
    pub start: f64,
    pub text: String,
}

impl Segment {
    /// Convert to a caption entry with the start floored to whole seconds
    pub fn to_entry(&self) -> CaptionEntry {
        let start = if self.start.is_finite() {
            self.start.max(0.0).floor() as u64
        } else {
            0
        };
        CaptionEntry::new(Some(start), self.text.trim())
    }
}

impl VerboseTranscription {
    /// Segments as caption entries, in the order the service returned them
    pub fn entries(&self) -> Vec<CaptionEntry> {
        self.segments.iter().map(Segment::to_entry).collect()
    }

    /// Render each segment as a timestamped line
    pub fn render_timestamped(&self) -> String {
        render_entries(&self.entries(), true)
    }
}
