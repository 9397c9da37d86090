//! Raw tag map to readable, string-normalised EXIF.

use super::gps::GpsResolver;
use super::tags::{self, GPS_INFO_NAME};
use super::value::{RawTagMap, RawTagValue};
use crate::types::DecodedExif;

/// Turns raw tag ids and typed values into tag names and strings.
pub struct ExifDecoder;

impl ExifDecoder {
    /// Decode a raw tag map.
    ///
    /// Every raw entry yields exactly one entry in the result, keyed by its
    /// readable name (or its decimal id when the tag is unknown). The GPS
    /// directory is the exception: it is resolved into the nested `GPS`
    /// block, or dropped when it has no usable coordinates.
    ///
    /// Decoding never fails. Values that cannot be rendered as text fall back
    /// to a literal rendering of their bytes.
    pub fn decode(raw: &RawTagMap) -> DecodedExif {
        let mut decoded = DecodedExif::default();

        for (&id, value) in raw {
            let name = tags::exif_tag_name(id)
                .map(str::to_owned)
                .unwrap_or_else(|| id.to_string());

            if name == GPS_INFO_NAME {
                if let RawTagValue::Ifd(gps) = value {
                    decoded.gps = GpsResolver::resolve(gps);
                    continue;
                }
                tracing::debug!(
                    "{GPS_INFO_NAME} holds a {} instead of a directory, keeping it as text",
                    value.kind()
                );
            }

            decoded.tags.insert(name, value.to_string());
        }

        tracing::trace!(
            tags = decoded.tags.len(),
            gps = decoded.gps.is_some(),
            "Decoded EXIF"
        );
        decoded
    }
}
