//! SRT caption flattening.
//!
//! Only the start of each cue is kept, at whole-second precision. Sequence numbers and
//! blank separators are dropped; every remaining line becomes one [`CaptionEntry`].

use once_cell::sync::Lazy;
use regex::Regex;

use super::{render_entries, CaptionEntry};

static CUE_TIMING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{2}):([0-9]{2}):([0-9]{2}),[0-9]{3}\s*-->\s*[0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3}")
        .expect("cue timing pattern is valid")
});

/// Parse SRT text into caption lines, in file order
pub fn parse_srt(srt_text: &str) -> Vec<CaptionEntry> {
    let mut entries = Vec::new();
    let mut current_start: Option<u64> = None;

    for line in srt_text.trim().lines() {
        let line = line.trim();
        if line.is_empty() || is_sequence_number(line) {
            continue;
        }

        if let Some(caps) = CUE_TIMING.captures(line) {
            current_start = Some(cue_start_seconds(&caps));
            continue;
        }

        entries.push(CaptionEntry::new(current_start, line));
    }

    entries
}

/// Parse SRT text and render it as transcript lines
pub fn parse_srt_transcript(srt_text: &str, with_timestamps: bool) -> String {
    render_entries(&parse_srt(srt_text), with_timestamps)
}

fn is_sequence_number(line: &str) -> bool {
    line.chars().all(|c| c.is_ascii_digit())
}

fn cue_start_seconds(caps: &regex::Captures) -> u64 {
    let field = |i: usize| caps[i].parse::<u64>().unwrap_or(0);
    field(1) * 3600 + field(2) * 60 + field(3)
}
