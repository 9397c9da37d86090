//! CLI enum types for the analyze command: output format and key labels.

use clap::ValueEnum;
use picmeta_core::{KeyStyle, OutputFormat as CoreOutputFormat};

/// Supported output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Key names used in the JSON output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Labels {
    /// snake_case keys (file_metadata, file_size_mb, ...)
    Machine,
    /// Readable labels ("File information", "Size (MB)", ...)
    Human,
}

impl From<Labels> for KeyStyle {
    fn from(labels: Labels) -> Self {
        match labels {
            Labels::Machine => KeyStyle::Machine,
            Labels::Human => KeyStyle::Human,
        }
    }
}
