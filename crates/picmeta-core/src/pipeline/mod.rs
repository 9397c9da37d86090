//! Image processing pipeline components.
//!
//! The stages that surround the EXIF and colour cores:
//! - **validate**: Allowlist, size and signature checks before decoding
//! - **discovery**: Find image files in directories
//! - **hash**: BLAKE3 content hash
//! - **file_info**: Filesystem facts (size, timestamps, path)
//! - **metadata**: Read raw EXIF tags from the container
//! - **resolution**: DPI from the JFIF, pHYs or BMP header
//! - **decode**: Decode pixels with limits and a timeout
//! - **sample**: Downsample to a bounded RGB buffer for colour counting
//! - **processor**: Assembles the report

pub mod decode;
pub mod discovery;
pub mod file_info;
pub mod hash;
pub mod metadata;
pub mod processor;
pub mod resolution;
pub mod sample;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use hash::Hasher;
pub use metadata::ExifReader;
pub use processor::{ImageProcessor, ProcessOptions};
pub use sample::Downsampler;
pub use validate::Validator;
