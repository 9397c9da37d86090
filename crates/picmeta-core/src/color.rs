//! Dominant colour extraction by exact pixel counting.
//!
//! This is frequency ranking, not clustering: every distinct `(r, g, b)`
//! triple is counted as its own colour. Callers bound the cost by handing in
//! a downsampled buffer (see [`Downsampler`](crate::pipeline::Downsampler)).

use std::collections::HashMap;
use thiserror::Error;

use crate::math::percentage;
use crate::types::DominantColor;

/// Number of colours reported when the caller does not ask for another count.
pub const DEFAULT_COLOR_COUNT: usize = 5;

/// A pixel buffer that cannot be profiled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("pixel buffer is empty")]
    Empty,

    #[error("pixel buffer length {0} is not a multiple of 3")]
    Misaligned(usize),
}

/// Ranks the colours of a packed RGB buffer by frequency.
pub struct ColorProfiler;

impl ColorProfiler {
    /// Return up to `n` colours, most frequent first.
    ///
    /// `pixels` is row-major, three bytes per pixel. Percentages are relative
    /// to the total pixel count and rounded to two decimals. Colours with the
    /// same count are ordered by ascending RGB value.
    pub fn dominant_colors(pixels: &[u8], n: usize) -> Result<Vec<DominantColor>, ColorError> {
        if pixels.is_empty() {
            return Err(ColorError::Empty);
        }
        if pixels.len() % 3 != 0 {
            return Err(ColorError::Misaligned(pixels.len()));
        }

        let total = pixels.len() / 3;
        let mut counts: HashMap<[u8; 3], usize> = HashMap::new();
        for px in pixels.chunks_exact(3) {
            *counts.entry([px[0], px[1], px[2]]).or_insert(0) += 1;
        }
        tracing::trace!(total, distinct = counts.len(), "Counted pixel colours");

        let mut ranked: Vec<([u8; 3], usize)> = counts.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);

        Ok(ranked
            .into_iter()
            .map(|(rgb, count)| DominantColor {
                color: to_hex(rgb),
                percentage: percentage(count, total),
            })
            .collect())
    }
}

/// Lowercase `#rrggbb`.
pub fn to_hex([r, g, b]: [u8; 3]) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}
