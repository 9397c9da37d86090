//! Core data types for picmeta.
//!
//! These types represent the result of analysing one image file. Field names
//! are the machine-oriented key set; see [`crate::output`] for the
//! human-labelled presentation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::exif::RawTagValue;

/// The complete result for one analysed image.
///
/// Each section degrades on its own: a failed decode leaves the file facts and
/// EXIF tags intact, and vice versa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageReport {
    /// Filesystem facts
    pub file_metadata: FileMetadata,

    /// Structural image properties and dominant colours
    pub image_metadata: ImageSection,

    /// Decoded EXIF tags
    pub exif_metadata: ExifSection,
}

/// Filesystem facts about the source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Just the filename portion
    pub filename: String,

    /// File size in bytes
    pub file_size_bytes: u64,

    /// File size in MiB, rounded to two decimals
    pub file_size_mb: f64,

    /// Creation time (`%Y-%m-%d %H:%M:%S`, local), when the filesystem records it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,

    /// Last modification time (`%Y-%m-%d %H:%M:%S`, local)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_time: Option<String>,

    /// Lower-cased extension including the dot (".jpg")
    pub file_extension: String,

    /// Absolute path to the source file
    pub file_path: PathBuf,

    /// BLAKE3 hash of the file contents
    pub content_hash: String,
}

/// Image properties, or the reason they could not be read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageSection {
    Properties(Box<ImageProperties>),
    Unavailable { error: String },
}

/// Structural properties of the decoded image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageProperties {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Width over height, rounded to two decimals; absent for zero height
    pub aspect_ratio: Option<f64>,

    /// Colour mode of the decoded pixels ("RGB", "RGBA", "L", ...)
    pub color_mode: String,

    /// Detected container format ("jpeg", "png", ...)
    pub format: String,

    /// Whether the file holds more than one frame
    pub is_animated: bool,

    /// Number of frames (1 for still images)
    pub n_frames: u32,

    /// Dominant colours, absent when colour analysis is disabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<ColorPalette>,

    /// Horizontal and vertical dots per inch, from the EXIF resolution tags
    pub dpi: Option<(f64, f64)>,
}

/// Result of colour analysis: the ranked colours or an error sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorPalette {
    Colors(Vec<DominantColor>),
    Unavailable { error: String },
}

/// One of the most frequent exact colours in the downsampled image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantColor {
    /// Lowercase `#rrggbb`
    pub color: String,

    /// Share of pixels with this colour, 0-100, two decimals
    pub percentage: f64,
}

/// Decoded EXIF, or the reason the EXIF block could not be read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExifSection {
    Unavailable { error: String },
    Decoded(DecodedExif),
}

/// Tag name → normalised string, plus the resolved GPS block.
///
/// Serialises as one flat object with an optional nested `"GPS"` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodedExif {
    #[serde(rename = "GPS", default, skip_serializing_if = "Option::is_none")]
    pub gps: Option<GpsBlock>,

    #[serde(flatten)]
    pub tags: BTreeMap<String, String>,
}

impl DecodedExif {
    /// True when the file carried no EXIF tags at all.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.gps.is_none()
    }
}

/// Position resolved from the GPS directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsBlock {
    /// Signed decimal degrees, negative south of the equator
    pub latitude: f64,

    /// Signed decimal degrees, negative west of Greenwich
    pub longitude: f64,

    /// `GPSAltitude` exactly as stored
    pub altitude: Option<RawTagValue>,

    /// `GPSTimeStamp` exactly as stored
    pub timestamp: Option<RawTagValue>,
}

/// One line of output: a report, or the reason a file was rejected.
///
/// Internally tagged: `{"type":"report",...}` or `{"type":"error",...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputRecord {
    Report(Box<ImageReport>),
    Error { file_path: PathBuf, error: String },
}

impl OutputRecord {
    /// Content hash of the reported file, if this is a report.
    pub fn content_hash(&self) -> Option<&str> {
        match self {
            Self::Report(report) => Some(&report.file_metadata.content_hash),
            Self::Error { .. } => None,
        }
    }
}

/// Processing statistics for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProcessingStats {
    /// Images analysed successfully
    pub succeeded: usize,

    /// Images rejected or failed
    pub failed: usize,

    /// Images skipped (already in the output file)
    pub skipped: usize,

    /// Bytes read from analysed files
    pub total_bytes: u64,

    /// Total processing time in seconds
    pub total_seconds: f64,
}

impl ProcessingStats {
    /// Analysed images per second.
    pub fn images_per_second(&self) -> f64 {
        if self.total_seconds > 0.0 {
            self.succeeded as f64 / self.total_seconds
        } else {
            0.0
        }
    }
}
