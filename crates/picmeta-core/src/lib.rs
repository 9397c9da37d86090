//! picmeta core - image metadata extraction library.
//!
//! picmeta reads one raster image and reports what can be learnt about it:
//! filesystem facts, structural image properties, the dominant colours and
//! the decoded EXIF tags including a resolved GPS position.
//!
//! # Architecture
//!
//! ```text
//! File → Validate → Read → Hash + File facts
//!                        → EXIF container → ExifDecoder (+ GpsResolver)
//!                        → Decode → Downsample → ColorProfiler
//!                                                         → ImageReport → JSON
//! ```
//!
//! Each section of the report degrades on its own: an image whose pixels
//! cannot be decoded still reports its file facts and EXIF tags.
//!
//! # Usage
//!
//! ```rust,ignore
//! use picmeta_core::{Config, ImageProcessor};
//!
//! #[tokio::main]
//! async fn main() -> picmeta_core::Result<()> {
//!     let config = Config::load()?;
//!     let processor = ImageProcessor::new(&config);
//!
//!     let report = processor.process("./image.jpg".as_ref()).await?;
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod exif;
pub mod math;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use color::{ColorError, ColorProfiler};
pub use config::Config;
pub use error::{ConfigError, PicmetaError, PipelineError, Result};
pub use exif::{ExifDecoder, GpsResolver, RawTagMap, RawTagValue};
pub use output::{KeyStyle, OutputFormat, OutputWriter};
pub use pipeline::{ImageProcessor, ProcessOptions};
pub use types::{
    ColorPalette, DecodedExif, DominantColor, ExifSection, FileMetadata, GpsBlock,
    ImageProperties, ImageReport, ImageSection, OutputRecord, ProcessingStats,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
