//! EXIF container reading.
//!
//! Turns the EXIF block of a JPEG, PNG or TIFF file into a [`RawTagMap`] of
//! primary-image tags, with the GPS directory nested under its pointer tag.

use ::exif::{Context, Field, In, Reader, Tag, Value};
use std::io::Cursor;
use std::path::Path;

use crate::error::PipelineError;
use crate::exif::tags::GPS_INFO;
use crate::exif::{Rational, RawTagMap, RawTagValue};

/// Reads raw EXIF tags from image bytes.
pub struct ExifReader;

impl ExifReader {
    /// Read the primary IFD tags from an in-memory image.
    ///
    /// Files without an EXIF block, and containers that cannot carry one
    /// (BMP, GIF), yield an empty map. Damaged entries are skipped and the
    /// rest of the block is kept; only an unreadable container is an error.
    pub fn read(bytes: &[u8], path: &Path) -> Result<RawTagMap, PipelineError> {
        if !Self::may_carry_exif(bytes) {
            return Ok(RawTagMap::new());
        }

        let mut cursor = Cursor::new(bytes);
        let exif = match Reader::new()
            .continue_on_error(true)
            .read_from_container(&mut cursor)
            .or_else(|e| {
                e.distill_partial_result(|errors| {
                    for err in errors {
                        tracing::debug!("Skipping damaged EXIF entry in {:?}: {}", path, err);
                    }
                })
            }) {
            Ok(exif) => exif,
            Err(::exif::Error::NotFound(_)) => return Ok(RawTagMap::new()),
            Err(e) => {
                return Err(PipelineError::Metadata {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };

        let mut tags = RawTagMap::new();
        let mut gps = RawTagMap::new();

        for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
            if Self::is_pointer(field) {
                continue;
            }
            match field.tag.context() {
                Context::Gps => {
                    gps.insert(field.tag.number(), convert_value(&field.value));
                }
                Context::Interop => {}
                _ => {
                    tags.insert(field.tag.number(), convert_value(&field.value));
                }
            }
        }

        if !gps.is_empty() {
            tags.insert(GPS_INFO, RawTagValue::Ifd(gps));
        }

        tracing::trace!("Read {} EXIF tags from {:?}", tags.len(), path);
        Ok(tags)
    }

    /// JPEG, PNG and TIFF signatures; the other allowlisted formats have no EXIF.
    fn may_carry_exif(bytes: &[u8]) -> bool {
        bytes.starts_with(&[0xFF, 0xD8])
            || bytes.starts_with(&[0x89, b'P', b'N', b'G'])
            || bytes.starts_with(b"II*\0")
            || bytes.starts_with(b"MM\0*")
    }

    /// IFD offset fields carry no information of their own.
    fn is_pointer(field: &Field) -> bool {
        field.tag == Tag::ExifIFDPointer
            || field.tag == Tag::GPSInfoIFDPointer
            || field.tag == Tag::InteropIFDPointer
    }
}

/// Collapse one-element lists to scalars, like the usual EXIF readers do.
fn integers<T: Copy + Into<i64>>(values: &[T]) -> RawTagValue {
    match values {
        [single] => RawTagValue::Integer((*single).into()),
        many => RawTagValue::Sequence(
            many.iter()
                .map(|v| RawTagValue::Integer((*v).into()))
                .collect(),
        ),
    }
}

fn floats<T: Copy + Into<f64>>(values: &[T]) -> RawTagValue {
    match values {
        [single] => RawTagValue::Float((*single).into()),
        many => RawTagValue::Sequence(
            many.iter()
                .map(|v| RawTagValue::Float((*v).into()))
                .collect(),
        ),
    }
}

fn text(bytes: &[u8]) -> RawTagValue {
    match std::str::from_utf8(bytes) {
        Ok(s) => RawTagValue::Text(s.to_string()),
        Err(_) => RawTagValue::Bytes(bytes.to_vec()),
    }
}

/// Convert a kamadak-exif value into a [`RawTagValue`].
pub fn convert_value(value: &Value) -> RawTagValue {
    match value {
        Value::Byte(v) => integers(v),
        Value::SByte(v) => integers(v),
        Value::Short(v) => integers(v),
        Value::SShort(v) => integers(v),
        Value::Long(v) => integers(v),
        Value::SLong(v) => integers(v),
        Value::Float(v) => floats(v),
        Value::Double(v) => floats(v),
        Value::Ascii(strings) => match strings.as_slice() {
            [single] => text(single),
            many => RawTagValue::Sequence(many.iter().map(|s| text(s)).collect()),
        },
        Value::Undefined(bytes, _) => RawTagValue::Bytes(bytes.clone()),
        Value::Rational(v) => RawTagValue::Rational(
            v.iter()
                .map(|r| Rational::new(i64::from(r.num), i64::from(r.denom)))
                .collect(),
        ),
        Value::SRational(v) => RawTagValue::Rational(
            v.iter()
                .map(|r| Rational::new(i64::from(r.num), i64::from(r.denom)))
                .collect(),
        ),
        Value::Unknown(kind, count, _) => {
            RawTagValue::Text(format!("unknown type {} ({} values)", kind, count))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::tags::{GPS_LATITUDE, GPS_LATITUDE_REF, ORIENTATION};

    /// Minimal little-endian TIFF: Orientation=1 plus a GPS IFD at 40°N 3°W.
    fn tiff_with_gps() -> Vec<u8> {
        fn entry(out: &mut Vec<u8>, tag: u16, kind: u16, count: u32, value: [u8; 4]) {
            out.extend_from_slice(&tag.to_le_bytes());
            out.extend_from_slice(&kind.to_le_bytes());
            out.extend_from_slice(&count.to_le_bytes());
            out.extend_from_slice(&value);
        }
        fn rationals(out: &mut Vec<u8>, values: [(u32, u32); 3]) {
            for (num, denom) in values {
                out.extend_from_slice(&num.to_le_bytes());
                out.extend_from_slice(&denom.to_le_bytes());
            }
        }

        let mut out = b"II*\0".to_vec();
        out.extend_from_slice(&8u32.to_le_bytes());

        out.extend_from_slice(&2u16.to_le_bytes());
        entry(&mut out, 0x0112, 3, 1, [1, 0, 0, 0]);
        entry(&mut out, 0x8825, 4, 1, 38u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());

        out.extend_from_slice(&4u16.to_le_bytes());
        entry(&mut out, 1, 2, 2, [b'N', 0, 0, 0]);
        entry(&mut out, 2, 5, 3, 92u32.to_le_bytes());
        entry(&mut out, 3, 2, 2, [b'W', 0, 0, 0]);
        entry(&mut out, 4, 5, 3, 116u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());

        rationals(&mut out, [(40, 1), (0, 1), (0, 1)]);
        rationals(&mut out, [(3, 1), (0, 1), (0, 1)]);
        out
    }

    #[test]
    fn test_read_tiff_nests_gps() {
        let tags = ExifReader::read(&tiff_with_gps(), Path::new("gps.tif")).unwrap();
        assert_eq!(tags.get(&ORIENTATION), Some(&RawTagValue::Integer(1)));

        let Some(RawTagValue::Ifd(gps)) = tags.get(&GPS_INFO) else {
            panic!("Expected nested GPS directory, got {tags:?}");
        };
        assert_eq!(gps.get(&GPS_LATITUDE_REF), Some(&RawTagValue::Text("N".into())));
        assert_eq!(
            gps.get(&GPS_LATITUDE),
            Some(&RawTagValue::Rational(vec![
                Rational::new(40, 1),
                Rational::new(0, 1),
                Rational::new(0, 1),
            ]))
        );
    }

    #[test]
    fn test_formats_without_exif_are_empty() {
        let tags = ExifReader::read(b"BM\0\0\0\0", Path::new("a.bmp")).unwrap();
        assert!(tags.is_empty());
        let tags = ExifReader::read(b"GIF89a", Path::new("a.gif")).unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn test_convert_collapses_single_values() {
        assert_eq!(convert_value(&Value::Short(vec![6])), RawTagValue::Integer(6));
        assert_eq!(
            convert_value(&Value::Short(vec![2, 2])),
            RawTagValue::Sequence(vec![RawTagValue::Integer(2), RawTagValue::Integer(2)])
        );
        assert_eq!(convert_value(&Value::Double(vec![1.5])), RawTagValue::Float(1.5));
    }

    #[test]
    fn test_convert_text_and_bytes() {
        assert_eq!(
            convert_value(&Value::Ascii(vec![b"Canon".to_vec()])),
            RawTagValue::Text("Canon".into())
        );
        assert_eq!(
            convert_value(&Value::Ascii(vec![vec![0xff, 0xfe]])),
            RawTagValue::Bytes(vec![0xff, 0xfe])
        );
        assert_eq!(
            convert_value(&Value::Undefined(b"0230".to_vec(), 0)),
            RawTagValue::Bytes(b"0230".to_vec())
        );
    }

    #[test]
    fn test_convert_signed_rational() {
        let value = Value::SRational(vec![::exif::SRational { num: -1, denom: 3 }]);
        assert_eq!(
            convert_value(&value),
            RawTagValue::Rational(vec![Rational::new(-1, 3)])
        );
    }
}
