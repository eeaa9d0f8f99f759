use anyhow::Result;
use std::path::{Component, Path, PathBuf};

use crate::TranscriptError;

const MEGABYTE: f64 = 1024.0 * 1024.0;

/// Byte count expressed in (binary) megabytes
pub fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / MEGABYTE
}

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let unit_index = (bytes_f.log10() / THRESHOLD.log10()).floor() as usize;
    let unit_index = unit_index.min(UNITS.len() - 1);

    let size = bytes_f / THRESHOLD.powi(unit_index as i32);

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Resolve the input to an absolute path to an existing regular file
pub fn resolve_input_path(input: &Path) -> Result<PathBuf> {
    let absolute = if input.is_absolute() {
        normalize_path(input)
    } else {
        normalize_path(&std::env::current_dir()?.join(input))
    };

    if !absolute.is_file() {
        return Err(TranscriptError::FileNotFound(absolute).into());
    }

    Ok(absolute)
}

/// Drop `.` segments and fold `..` into the parent, without touching the filesystem
fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Check whether a file exceeds the upload ceiling
pub fn check_upload_size(size_bytes: u64, limit_bytes: u64) -> Result<()> {
    if size_bytes > limit_bytes {
        return Err(TranscriptError::AudioTooLarge {
            size_bytes,
            limit_bytes,
        }
        .into());
    }
    Ok(())
}
