//! Sub-configuration structs and their defaults.

use serde::{Deserialize, Serialize};

use crate::color::DEFAULT_COLOR_COUNT;
use crate::output::KeyStyle;

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// File extensions accepted for analysis (without the dot)
    pub supported_formats: Vec<String>,

    /// Follow symlinks while walking directories
    pub follow_links: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "tiff".to_string(),
                "tif".to_string(),
                "bmp".to_string(),
                "gif".to_string(),
            ],
            follow_links: true,
        }
    }
}

impl ProcessingConfig {
    /// Check whether a file extension is in the allowlist (case-insensitive).
    pub fn is_supported_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.').to_lowercase();
        self.supported_formats
            .iter()
            .any(|fmt| fmt.trim_start_matches('.').to_lowercase() == ext)
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 20000,
            decode_timeout_ms: 5000,
        }
    }
}

/// Dominant colour analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Whether to compute dominant colours
    pub enabled: bool,

    /// Number of colours to report
    pub colors: usize,

    /// Longest side of the downsampled image, in pixels
    pub sample_size: u32,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            colors: DEFAULT_COLOR_COUNT,
            sample_size: 150,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,

    /// Key set used for the JSON output
    pub labels: KeyStyle,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: true,
            labels: KeyStyle::Machine,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
