//! Filesystem facts for the report.

use chrono::{DateTime, Local};
use std::fs::Metadata;
use std::path::Path;
use std::time::SystemTime;

use crate::math::round2;
use crate::types::FileMetadata;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Format a filesystem timestamp in local time.
pub fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(TIME_FORMAT).to_string()
}

/// Collect filename, size, timestamps, extension and absolute path.
///
/// Creation time is left out on filesystems that do not record it.
pub fn file_metadata(path: &Path, metadata: &Metadata, content_hash: String) -> FileMetadata {
    let size = metadata.len();
    let file_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();
    let file_path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    FileMetadata {
        filename: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        file_size_bytes: size,
        file_size_mb: round2(size as f64 / BYTES_PER_MB),
        creation_time: metadata.created().ok().map(format_time),
        modification_time: metadata.modified().ok().map(format_time),
        file_extension,
        file_path,
        content_hash,
    }
}
