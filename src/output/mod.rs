use serde::{Deserialize, Serialize};

pub mod srt;

pub use srt::{parse_srt, parse_srt_transcript};

/// One rendered transcript line with its optional start time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionEntry {
    /// Start time in whole seconds
    pub start: Option<u64>,

    /// Caption or segment text
    pub text: String,
}

impl CaptionEntry {
    pub fn new(start: Option<u64>, text: impl Into<String>) -> Self {
        Self {
            start,
            text: text.into(),
        }
    }

    /// Render as a single output line
    pub fn render(&self, with_timestamps: bool) -> String {
        match self.start {
            Some(seconds) if with_timestamps => {
                format!("{} {}", format_timestamp(seconds), self.text)
            }
            _ => self.text.clone(),
        }
    }
}

/// Format seconds as `[MM:SS]`, or `[HH:MM:SS]` from one hour on
pub fn format_timestamp(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("[{:02}:{:02}:{:02}]", hours, minutes, secs)
    } else {
        format!("[{:02}:{:02}]", minutes, secs)
    }
}

/// Render entries in source order, one line each
pub fn render_entries(entries: &[CaptionEntry], with_timestamps: bool) -> String {
    entries
        .iter()
        .map(|entry| entry.render(with_timestamps))
        .collect::<Vec<_>>()
        .join("\n")
}
