//! Pipeline orchestration - wires together all processing stages.

use std::path::Path;
use std::time::Instant;

use crate::color::ColorProfiler;
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::exif::tags::{RESOLUTION_UNIT, X_RESOLUTION, Y_RESOLUTION};
use crate::exif::{ExifDecoder, RawTagMap};
use crate::math::round2;
use crate::types::{
    ColorPalette, ExifSection, ImageProperties, ImageReport, ImageSection, OutputRecord,
};

use super::decode::{format_to_string, DecodedImage, ImageDecoder};
use super::discovery::{DiscoveredFile, FileDiscovery};
use super::file_info::file_metadata;
use super::hash::Hasher;
use super::metadata::ExifReader;
use super::resolution::container_dpi;
use super::sample::Downsampler;
use super::validate::Validator;

const CM_PER_INCH: f64 = 2.54;

/// Options for controlling image processing behavior.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Skip dominant colour analysis
    pub skip_colors: bool,
}

/// The main image processor that orchestrates the full pipeline.
pub struct ImageProcessor {
    decoder: ImageDecoder,
    downsampler: Downsampler,
    validator: Validator,
    discovery: FileDiscovery,
}

impl ImageProcessor {
    /// Create a new image processor with the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            decoder: ImageDecoder::new(config.limits.clone()),
            downsampler: Downsampler::new(config.palette.clone()),
            validator: Validator::new(config.processing.clone(), config.limits.clone()),
            discovery: FileDiscovery::new(config.processing.clone()),
        }
    }

    /// Analyse one file and always return an output record.
    ///
    /// Files rejected by validation, or that cannot be read, become an
    /// [`OutputRecord::Error`].
    pub async fn analyze(&self, path: &Path) -> OutputRecord {
        self.analyze_with_options(path, &ProcessOptions::default())
            .await
    }

    /// Like [`analyze`](Self::analyze), with custom options.
    pub async fn analyze_with_options(&self, path: &Path, options: &ProcessOptions) -> OutputRecord {
        match self.process_with_options(path, options).await {
            Ok(report) => OutputRecord::Report(Box::new(report)),
            Err(e) => {
                tracing::warn!("Rejected {:?}: {}", path, e);
                OutputRecord::Error {
                    file_path: path.to_path_buf(),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Process a single image through the full pipeline.
    pub async fn process(&self, path: &Path) -> Result<ImageReport> {
        self.process_with_options(path, &ProcessOptions::default())
            .await
    }

    /// Process a single image with custom options.
    ///
    /// Only validation and reading the file can fail. A broken EXIF block or
    /// undecodable pixels are recorded inside the matching report section.
    pub async fn process_with_options(
        &self,
        path: &Path,
        options: &ProcessOptions,
    ) -> Result<ImageReport> {
        let start = Instant::now();
        tracing::debug!("Processing: {:?}", path);

        self.validator.validate(path)?;
        tracing::trace!("  Validate: {:?}", start.elapsed());

        let read_error = |e: std::io::Error| PipelineError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        let fs_metadata = tokio::fs::metadata(path).await.map_err(read_error)?;
        let bytes = tokio::fs::read(path).await.map_err(read_error)?;

        let hash_start = Instant::now();
        let content_hash = Hasher::content_hash_from_bytes(&bytes);
        tracing::trace!("  Content hash: {:?}", hash_start.elapsed());
        let file_metadata = file_metadata(path, &fs_metadata, content_hash);

        let metadata_start = Instant::now();
        let raw_tags = ExifReader::read(&bytes, path);
        let exif_metadata = match &raw_tags {
            Ok(tags) => ExifSection::Decoded(ExifDecoder::decode(tags)),
            Err(e) => {
                tracing::warn!("{}", e);
                ExifSection::Unavailable {
                    error: e.to_string(),
                }
            }
        };
        tracing::trace!("  Metadata: {:?}", metadata_start.elapsed());

        let header_dpi = container_dpi(&bytes);

        let decode_start = Instant::now();
        let image_metadata = match self.decoder.decode_from_bytes(bytes, path).await {
            Ok(decoded) => {
                tracing::trace!("  Decode: {:?}", decode_start.elapsed());
                let dpi = header_dpi
                    .map(|(x, y)| (round2(x), round2(y)))
                    .or_else(|| raw_tags.as_ref().ok().and_then(dpi_from_exif));
                ImageSection::Properties(Box::new(self.properties(&decoded, dpi, options)))
            }
            Err(e) => {
                tracing::warn!("{}", e);
                ImageSection::Unavailable {
                    error: e.to_string(),
                }
            }
        };

        tracing::debug!(
            "Processed {:?} in {:?}",
            file_metadata.filename,
            start.elapsed()
        );

        Ok(ImageReport {
            file_metadata,
            image_metadata,
            exif_metadata,
        })
    }

    /// Structural facts plus the colour palette.
    fn properties(
        &self,
        decoded: &DecodedImage,
        dpi: Option<(f64, f64)>,
        options: &ProcessOptions,
    ) -> ImageProperties {
        let color_palette = if options.skip_colors || !self.downsampler.is_enabled() {
            None
        } else {
            let palette_start = Instant::now();
            let sample = self.downsampler.sample(&decoded.image);
            let palette =
                match ColorProfiler::dominant_colors(sample.as_raw(), self.downsampler.colors()) {
                    Ok(colors) => ColorPalette::Colors(colors),
                    Err(e) => {
                        tracing::debug!("Colour analysis unavailable: {}", e);
                        ColorPalette::Unavailable {
                            error: e.to_string(),
                        }
                    }
                };
            tracing::trace!("  Palette: {:?}", palette_start.elapsed());
            Some(palette)
        };

        ImageProperties {
            width: decoded.width,
            height: decoded.height,
            aspect_ratio: aspect_ratio(decoded.width, decoded.height),
            color_mode: decoded.color_mode.clone(),
            format: format_to_string(decoded.format),
            is_animated: decoded.n_frames > 1,
            n_frames: decoded.n_frames,
            color_palette,
            dpi,
        }
    }

    /// Discover all image files at a path.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        self.discovery.discover(path)
    }

    /// Check if dominant colour analysis is enabled.
    pub fn colors_enabled(&self) -> bool {
        self.downsampler.is_enabled()
    }
}

/// Width over height, two decimals; absent for a zero height.
fn aspect_ratio(width: u32, height: u32) -> Option<f64> {
    (height > 0).then(|| round2(f64::from(width) / f64::from(height)))
}

/// Dots per inch from `XResolution`/`YResolution` and `ResolutionUnit`,
/// used when the container header records none.
///
/// A missing unit means inches; unit 3 is centimetres; unit 1 has no
/// absolute meaning and yields nothing.
fn dpi_from_exif(tags: &RawTagMap) -> Option<(f64, f64)> {
    let x = tags.get(&X_RESOLUTION)?.first_f64()?;
    let y = tags.get(&Y_RESOLUTION)?.first_f64()?;
    let unit = tags
        .get(&RESOLUTION_UNIT)
        .and_then(|u| u.first_f64())
        .unwrap_or(2.0);

    let factor = match unit as i64 {
        2 => 1.0,
        3 => CM_PER_INCH,
        _ => return None,
    };
    Some((round2(x * factor), round2(y * factor)))
}
