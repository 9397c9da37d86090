//! Output formatting for JSON and JSONL output.
//!
//! Provides a flexible writer that can output single items or batches
//! in either JSON or JSON Lines format, using either the machine-oriented
//! key set or human-readable labels.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Which key names to use in the serialized output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStyle {
    /// snake_case field names (`file_size_mb`)
    #[default]
    Machine,
    /// Readable labels (`Size (MB)`)
    Human,
}

impl KeyStyle {
    /// Parse a key style from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "machine" => Some(Self::Machine),
            "human" => Some(Self::Human),
            _ => None,
        }
    }
}

/// Rendering of an EXIF section that carried no tags, in the human key set.
pub const NO_EXIF_LABEL: &str = "No EXIF data";

/// Human label for a machine key. EXIF tag names and unknown keys have none.
fn human_label(key: &str) -> Option<&'static str> {
    let label = match key {
        "file_metadata" => "File information",
        "image_metadata" => "Image information",
        "exif_metadata" => "EXIF data",
        "filename" => "File name",
        "file_size_bytes" => "Size (bytes)",
        "file_size_mb" => "Size (MB)",
        "creation_time" => "Created",
        "modification_time" => "Modified",
        "file_extension" => "Extension",
        "file_path" => "Path",
        "content_hash" => "Content hash",
        "width" => "Width",
        "height" => "Height",
        "aspect_ratio" => "Aspect ratio",
        "color_mode" => "Colour mode",
        "format" => "Format",
        "is_animated" => "Animated",
        "n_frames" => "Frames",
        "color_palette" => "Dominant colours",
        "dpi" => "DPI",
        "color" => "Colour",
        "percentage" => "Percentage",
        "latitude" => "Latitude",
        "longitude" => "Longitude",
        "altitude" => "Altitude",
        "timestamp" => "Timestamp",
        "error" => "Error",
        _ => return None,
    };
    Some(label)
}

/// Rename machine keys to human labels, recursively.
pub fn relabel(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let empty_exif =
                        key == "exif_metadata" && value.as_object().is_some_and(|m| m.is_empty());
                    let value = if empty_exif {
                        Value::String(NO_EXIF_LABEL.to_string())
                    } else {
                        relabel(value)
                    };
                    let key = human_label(&key).map(str::to_owned).unwrap_or(key);
                    (key, value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(relabel).collect()),
        other => other,
    }
}

/// Serialize an item to a JSON value in the requested key style.
pub fn present<T: Serialize + ?Sized>(item: &T, labels: KeyStyle) -> serde_json::Result<Value> {
    let value = serde_json::to_value(item)?;
    Ok(match labels {
        KeyStyle::Machine => value,
        KeyStyle::Human => relabel(value),
    })
}

/// A writer that serializes items to JSON or JSONL format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    labels: KeyStyle,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - The underlying writer (file, stdout, etc.)
    /// * `format` - Output format (JSON or JSONL)
    /// * `pretty` - Whether to pretty-print JSON (only affects JSON format)
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            labels: KeyStyle::Machine,
            items_written: 0,
        }
    }

    /// Use the given key style for everything written from now on.
    pub fn with_labels(mut self, labels: KeyStyle) -> Self {
        self.labels = labels;
        self
    }

    /// Write a single item.
    ///
    /// For JSON format, writes a single object.
    /// For JSONL format, writes one object per line.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        let item = present(item, self.labels).map_err(io::Error::other)?;
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, &item)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, &item).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
            }
            OutputFormat::JsonLines => {
                // JSONL is never pretty-printed (one object per line)
                serde_json::to_writer(&mut self.writer, &item).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        self.items_written += 1;
        Ok(())
    }

    /// Write multiple items.
    ///
    /// For JSON format, writes as a JSON array.
    /// For JSONL format, writes one object per line.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                let items = present(items, self.labels).map_err(io::Error::other)?;
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, &items)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, &items).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.items_written += items.as_array().map_or(0, Vec::len);
            }
            OutputFormat::JsonLines => {
                for item in items {
                    self.write(item)?;
                }
            }
        }
        Ok(())
    }

    /// Get the number of items written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Serialize)]
    struct Entry {
        filename: String,
        file_size_bytes: u64,
    }

    fn entry(name: &str, size: u64) -> Entry {
        Entry {
            filename: name.to_string(),
            file_size_bytes: size,
        }
    }

    #[test]
    fn test_write_json() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.write(&entry("a.jpg", 42)).unwrap();
        assert_eq!(writer.items_written(), 1);

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("\"filename\":\"a.jpg\""));
        assert!(output.contains("\"file_size_bytes\":42"));
    }

    #[test]
    fn test_write_jsonl() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        for item in [entry("a.jpg", 1), entry("b.png", 2)] {
            writer.write(&item).unwrap();
        }

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("b.png"));
    }

    #[test]
    fn test_write_all_json_array() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer
            .write_all(&[entry("a.jpg", 1), entry("b.png", 2)])
            .unwrap();
        assert_eq!(writer.items_written(), 2);

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with('['));
        assert!(output.trim().ends_with(']'));
    }

    #[test]
    fn test_write_with_human_labels() {
        let mut buffer = Vec::new();
        let mut writer =
            OutputWriter::new(&mut buffer, OutputFormat::Json, false).with_labels(KeyStyle::Human);
        writer.write(&entry("a.jpg", 42)).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("\"File name\":\"a.jpg\""));
        assert!(output.contains("\"Size (bytes)\":42"));
    }

    #[test]
    fn test_relabel_leaves_exif_tag_names() {
        let value = json!({
            "file_metadata": {"file_size_mb": 1.5},
            "image_metadata": {"color_palette": [{"color": "#ff0000", "percentage": 100.0}]},
            "exif_metadata": {"Make": "Canon", "GPS": {"latitude": 1.0, "longitude": 2.0}}
        });
        let labelled = relabel(value);

        assert_eq!(labelled["File information"]["Size (MB)"], 1.5);
        assert_eq!(
            labelled["Image information"]["Dominant colours"][0]["Colour"],
            "#ff0000"
        );
        assert_eq!(labelled["EXIF data"]["Make"], "Canon");
        assert_eq!(labelled["EXIF data"]["GPS"]["Latitude"], 1.0);
    }

    #[test]
    fn test_relabel_empty_exif() {
        let labelled = relabel(json!({"exif_metadata": {}}));
        assert_eq!(labelled["EXIF data"], NO_EXIF_LABEL);

        let machine = present(&json!({"exif_metadata": {}}), KeyStyle::Machine).unwrap();
        assert_eq!(machine["exif_metadata"], json!({}));
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("jsonl"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("NDJSON"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("invalid"), None);
    }

    #[test]
    fn test_key_style_parse() {
        assert_eq!(KeyStyle::parse("Human"), Some(KeyStyle::Human));
        assert_eq!(KeyStyle::parse("machine"), Some(KeyStyle::Machine));
        assert_eq!(KeyStyle::parse("pretty"), None);
    }
}
