//! Raw EXIF values as handed over by the container reader.
//!
//! A [`RawTagValue`] is what a tag looks like before decoding: still typed by
//! its storage format, not yet turned into the uniform string rendering that
//! callers of [`ExifDecoder`](super::ExifDecoder) see.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::math::format_float;

/// Tag id → raw value mapping for one image file directory.
///
/// Ordered so that decoding produces the same output for the same input.
pub type RawTagMap = BTreeMap<u16, RawTagValue>;

/// An EXIF rational: numerator over denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rational {
    pub num: i64,
    pub denom: i64,
}

impl Rational {
    pub fn new(num: i64, denom: i64) -> Self {
        Self { num, denom }
    }

    /// The rational as a float, or `None` when the denominator is zero.
    pub fn to_f64(self) -> Option<f64> {
        if self.denom == 0 {
            None
        } else {
            Some(self.num as f64 / self.denom as f64)
        }
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::new(value, 1)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_f64() {
            Some(v) => f.write_str(&format_float(v)),
            None => write!(f, "{}/{}", self.num, self.denom),
        }
    }
}

/// A raw tag value, tagged by how it was stored in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTagValue {
    /// A single integer (BYTE/SHORT/LONG and their signed forms).
    Integer(i64),
    /// A single FLOAT or DOUBLE.
    Float(f64),
    /// ASCII text that was valid UTF-8.
    Text(String),
    /// Opaque bytes (UNDEFINED, or ASCII that was not valid UTF-8).
    Bytes(Vec<u8>),
    /// One or more rationals.
    Rational(Vec<Rational>),
    /// Multi-valued integer or float tags.
    Sequence(Vec<RawTagValue>),
    /// A nested directory, e.g. the GPS IFD.
    Ifd(RawTagMap),
}

impl RawTagValue {
    /// Short name of the variant, for log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Rational(_) => "rational",
            Self::Sequence(_) => "sequence",
            Self::Ifd(_) => "directory",
        }
    }

    /// First element as a float, for numeric tags such as `XResolution`.
    pub fn first_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Rational(v) => v.first().and_then(|r| r.to_f64()),
            Self::Sequence(v) => v.first().and_then(Self::first_f64),
            _ => None,
        }
    }
}

impl fmt::Display for RawTagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&format_float(*v)),
            Self::Text(s) => f.write_str(s.trim_end_matches('\0')),
            Self::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(s) => f.write_str(s.trim_end_matches('\0')),
                Err(_) => write_bytes_literal(f, bytes),
            },
            Self::Rational(values) => write_joined(f, values),
            Self::Sequence(values) => write_joined(f, values),
            Self::Ifd(map) => {
                f.write_str("{")?;
                for (i, (id, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{id}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{value}")?;
    }
    Ok(())
}

/// Literal `b'...'` rendering of bytes that are not text.
fn write_bytes_literal(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("b'")?;
    for &b in bytes {
        match b {
            b'\\' => f.write_str("\\\\")?,
            b'\'' => f.write_str("\\'")?,
            b'\n' => f.write_str("\\n")?,
            b'\r' => f.write_str("\\r")?,
            b'\t' => f.write_str("\\t")?,
            0x20..=0x7e => write!(f, "{}", b as char)?,
            _ => write!(f, "\\x{b:02x}")?,
        }
    }
    f.write_str("'")
}
