//! EXIF decoding.
//!
//! - **tags**: numeric tag ids and their readable names
//! - **value**: raw, storage-typed tag values
//! - **decoder**: raw tag map to readable, string-normalised EXIF
//! - **gps**: GPS directory to signed decimal degrees

pub mod decoder;
pub mod gps;
pub mod tags;
pub mod value;

pub use decoder::ExifDecoder;
pub use gps::{convert_to_degrees, GpsError, GpsResolver, RationalTriple};
pub use value::{Rational, RawTagMap, RawTagValue};
