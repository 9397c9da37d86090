//! Downsampling ahead of colour analysis.

use image::{imageops, DynamicImage, RgbImage};

use crate::config::PaletteConfig;

/// Shrinks decoded images to a bounded RGB sample for colour counting.
pub struct Downsampler {
    config: PaletteConfig,
}

impl Downsampler {
    /// Create a new downsampler with the given palette configuration.
    pub fn new(config: PaletteConfig) -> Self {
        Self { config }
    }

    /// Convert to 8-bit RGB and shrink so the longest side is at most
    /// `sample_size`, keeping the aspect ratio.
    ///
    /// Images already within bounds are never enlarged.
    pub fn sample(&self, image: &DynamicImage) -> RgbImage {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let bound = self.config.sample_size.max(1);
        let longest = width.max(height);

        if longest <= bound {
            return rgb;
        }

        let (new_width, new_height) = fit_within(width, height, bound);
        imageops::thumbnail(&rgb, new_width, new_height)
    }

    /// Check if colour analysis is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Number of colours to report.
    pub fn colors(&self) -> usize {
        self.config.colors
    }
}

/// Scale `(width, height)` so the longest side equals `bound`; never below 1px.
fn fit_within(width: u32, height: u32, bound: u32) -> (u32, u32) {
    let scale = f64::from(bound) / f64::from(width.max(height));
    let scaled = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, bound);
    (scaled(width), scaled(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downsampler(size: u32) -> Downsampler {
        Downsampler::new(PaletteConfig {
            sample_size: size,
            ..Default::default()
        })
    }

    #[test]
    fn test_sample_bounds_longest_side() {
        let sample = downsampler(150).sample(&DynamicImage::new_rgb8(1000, 500));
        assert_eq!(sample.dimensions(), (150, 75));
    }

    #[test]
    fn test_sample_portrait() {
        let sample = downsampler(100).sample(&DynamicImage::new_rgba8(300, 900));
        assert_eq!(sample.dimensions(), (33, 100));
    }

    #[test]
    fn test_small_image_not_enlarged() {
        let sample = downsampler(150).sample(&DynamicImage::new_luma8(20, 10));
        assert_eq!(sample.dimensions(), (20, 10));
        assert_eq!(sample.as_raw().len(), 20 * 10 * 3);
    }

    #[test]
    fn test_extreme_aspect_keeps_one_pixel() {
        assert_eq!(fit_within(10_000, 2, 150), (150, 1));
    }
}
