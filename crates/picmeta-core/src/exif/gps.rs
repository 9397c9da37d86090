//! GPS directory resolution: rational DMS triples to signed decimal degrees.

use thiserror::Error;

use super::tags::{
    self, GPS_ALTITUDE, GPS_LATITUDE, GPS_LATITUDE_REF, GPS_LONGITUDE, GPS_LONGITUDE_REF,
    GPS_TIMESTAMP,
};
use super::value::{Rational, RawTagMap, RawTagValue};
use crate::types::GpsBlock;

/// Why a GPS directory could not be resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GpsError {
    /// The sub-tag is not a degrees/minutes/seconds triple
    #[error("{0} is not a degrees/minutes/seconds triple")]
    NotATriple(&'static str),

    /// One of the components has a zero denominator
    #[error("zero denominator in a degrees/minutes/seconds component")]
    ZeroDenominator,
}

/// Degrees, minutes and seconds, each a rational with a non-zero denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RationalTriple {
    degrees: Rational,
    minutes: Rational,
    seconds: Rational,
}

impl RationalTriple {
    /// Build a triple, rejecting zero denominators.
    pub fn new(degrees: Rational, minutes: Rational, seconds: Rational) -> Result<Self, GpsError> {
        if [degrees, minutes, seconds].iter().any(|r| r.denom == 0) {
            return Err(GpsError::ZeroDenominator);
        }
        Ok(Self {
            degrees,
            minutes,
            seconds,
        })
    }
}

/// Convert a DMS triple to decimal degrees: `d + m/60 + s/3600`.
pub fn convert_to_degrees(triple: &RationalTriple) -> f64 {
    let ratio = |r: Rational| r.num as f64 / r.denom as f64;
    dms_to_degrees(
        ratio(triple.degrees),
        ratio(triple.minutes),
        ratio(triple.seconds),
    )
}

fn dms_to_degrees(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

/// Decimal degrees from a raw GPS coordinate value.
///
/// Accepts a list of at least three rationals, or a sequence of at least
/// three integers, floats or single rationals.
fn coordinate_degrees(value: &RawTagValue, tag: &'static str) -> Result<f64, GpsError> {
    match value {
        RawTagValue::Rational(values) => match values.as_slice() {
            [d, m, s, ..] => Ok(convert_to_degrees(&RationalTriple::new(*d, *m, *s)?)),
            _ => Err(GpsError::NotATriple(tag)),
        },
        RawTagValue::Sequence(items) => {
            let parts = items
                .iter()
                .map(|item| component(item, tag))
                .collect::<Result<Vec<f64>, _>>()?;
            match parts.as_slice() {
                [d, m, s, ..] => Ok(dms_to_degrees(*d, *m, *s)),
                _ => Err(GpsError::NotATriple(tag)),
            }
        }
        _ => Err(GpsError::NotATriple(tag)),
    }
}

fn component(item: &RawTagValue, tag: &'static str) -> Result<f64, GpsError> {
    match item {
        RawTagValue::Integer(v) => Ok(*v as f64),
        RawTagValue::Float(v) => Ok(*v),
        RawTagValue::Rational(r) if r.len() == 1 => r[0].to_f64().ok_or(GpsError::ZeroDenominator),
        _ => Err(GpsError::NotATriple(tag)),
    }
}

/// Resolves a raw GPS directory into a [`GpsBlock`].
pub struct GpsResolver;

impl GpsResolver {
    /// Resolve latitude/longitude with hemisphere correction.
    ///
    /// Returns `None` when either coordinate is missing or malformed; a bad
    /// GPS directory never fails the surrounding extraction.
    pub fn resolve(gps: &RawTagMap) -> Option<GpsBlock> {
        match Self::try_resolve(gps) {
            Ok(block) => block,
            Err(e) => {
                tracing::debug!("Discarding GPS block: {e}");
                None
            }
        }
    }

    fn try_resolve(gps: &RawTagMap) -> Result<Option<GpsBlock>, GpsError> {
        let (Some(lat), Some(lon)) = (gps.get(&GPS_LATITUDE), gps.get(&GPS_LONGITUDE)) else {
            let present: Vec<String> = gps
                .keys()
                .map(|id| {
                    tags::gps_tag_name(*id)
                        .map(str::to_owned)
                        .unwrap_or_else(|| id.to_string())
                })
                .collect();
            tracing::debug!(?present, "GPS directory lacks latitude/longitude");
            return Ok(None);
        };

        let mut latitude = coordinate_degrees(lat, "GPSLatitude")?;
        let mut longitude = coordinate_degrees(lon, "GPSLongitude")?;

        // A missing reference means the positive hemisphere.
        if is_opposite_hemisphere(gps.get(&GPS_LATITUDE_REF), "N") {
            latitude = -latitude;
        }
        if is_opposite_hemisphere(gps.get(&GPS_LONGITUDE_REF), "E") {
            longitude = -longitude;
        }

        Ok(Some(GpsBlock {
            latitude,
            longitude,
            altitude: gps.get(&GPS_ALTITUDE).cloned(),
            timestamp: gps.get(&GPS_TIMESTAMP).cloned(),
        }))
    }
}

/// Anything but the exact positive letter flips the sign. The rendering
/// already drops NUL padding.
fn is_opposite_hemisphere(reference: Option<&RawTagValue>, positive: &str) -> bool {
    reference.is_some_and(|r| r.to_string() != positive)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dms(d: i64, m: i64, s: i64) -> RawTagValue {
        RawTagValue::Rational(vec![
            Rational::from(d),
            Rational::from(m),
            Rational::from(s),
        ])
    }

    fn triple(d: i64, m: i64, s: i64) -> RationalTriple {
        RationalTriple::new(Rational::from(d), Rational::from(m), Rational::from(s)).unwrap()
    }

    fn gps_map(entries: Vec<(u16, RawTagValue)>) -> RawTagMap {
        entries.into_iter().collect()
    }

    #[test]
    fn test_convert_degrees_only() {
        assert_eq!(convert_to_degrees(&triple(40, 0, 0)), 40.0);
    }

    #[test]
    fn test_convert_full_dms() {
        let value = convert_to_degrees(&triple(40, 26, 46));
        assert!((value - 40.446_111_111).abs() < 1e-9);
    }

    #[test]
    fn test_convert_fractional_seconds() {
        let t = RationalTriple::new(
            Rational::new(51, 1),
            Rational::new(30, 1),
            Rational::new(2628, 100),
        )
        .unwrap();
        assert!((convert_to_degrees(&t) - (51.0 + 0.5 + 26.28 / 3600.0)).abs() < 1e-12);
    }

    #[test]
    fn test_convert_is_monotonic_in_each_component() {
        let base = convert_to_degrees(&triple(10, 10, 10));
        assert!(convert_to_degrees(&triple(11, 10, 10)) > base);
        assert!(convert_to_degrees(&triple(10, 11, 10)) > base);
        assert!(convert_to_degrees(&triple(10, 10, 11)) > base);
    }

    #[test]
    fn test_zero_denominator_rejected() {
        let err = RationalTriple::new(Rational::new(1, 0), Rational::from(0), Rational::from(0));
        assert_eq!(err, Err(GpsError::ZeroDenominator));
    }

    #[test]
    fn test_resolve_north_east() {
        let gps = gps_map(vec![
            (GPS_LATITUDE, dms(40, 0, 0)),
            (GPS_LATITUDE_REF, RawTagValue::Text("N".into())),
            (GPS_LONGITUDE, dms(3, 0, 0)),
            (GPS_LONGITUDE_REF, RawTagValue::Text("E".into())),
        ]);
        let block = GpsResolver::resolve(&gps).unwrap();
        assert_eq!(block.latitude, 40.0);
        assert_eq!(block.longitude, 3.0);
        assert!(block.altitude.is_none());
        assert!(block.timestamp.is_none());
    }

    #[test]
    fn test_south_mirrors_north() {
        let north = gps_map(vec![
            (GPS_LATITUDE, dms(33, 52, 4)),
            (GPS_LATITUDE_REF, RawTagValue::Text("N".into())),
            (GPS_LONGITUDE, dms(151, 12, 36)),
        ]);
        let mut south = north.clone();
        south.insert(GPS_LATITUDE_REF, RawTagValue::Text("S".into()));

        let n = GpsResolver::resolve(&north).unwrap();
        let s = GpsResolver::resolve(&south).unwrap();
        assert!(s.latitude < 0.0);
        assert_eq!(s.latitude, -n.latitude);
        assert_eq!(s.longitude, n.longitude);
    }

    #[test]
    fn test_west_reference_as_bytes() {
        let gps = gps_map(vec![
            (GPS_LATITUDE, dms(40, 0, 0)),
            (GPS_LONGITUDE, dms(3, 0, 0)),
            (GPS_LONGITUDE_REF, RawTagValue::Bytes(b"W\0".to_vec())),
        ]);
        let block = GpsResolver::resolve(&gps).unwrap();
        assert_eq!(block.longitude, -3.0);
    }

    #[test]
    fn test_missing_reference_defaults_positive() {
        let gps = gps_map(vec![
            (GPS_LATITUDE, dms(12, 30, 0)),
            (GPS_LONGITUDE, dms(45, 0, 0)),
        ]);
        let block = GpsResolver::resolve(&gps).unwrap();
        assert_eq!(block.latitude, 12.5);
        assert_eq!(block.longitude, 45.0);
    }

    #[test]
    fn test_missing_latitude_or_longitude() {
        let only_lat = gps_map(vec![(GPS_LATITUDE, dms(1, 0, 0))]);
        let only_lon = gps_map(vec![(GPS_LONGITUDE, dms(1, 0, 0))]);
        assert!(GpsResolver::resolve(&only_lat).is_none());
        assert!(GpsResolver::resolve(&only_lon).is_none());
        assert!(GpsResolver::resolve(&RawTagMap::new()).is_none());
    }

    #[test]
    fn test_malformed_coordinate_is_absent() {
        let gps = gps_map(vec![
            (GPS_LATITUDE, RawTagValue::Rational(vec![Rational::from(1)])),
            (GPS_LONGITUDE, dms(1, 0, 0)),
        ]);
        assert!(GpsResolver::resolve(&gps).is_none());

        let gps = gps_map(vec![
            (GPS_LATITUDE, RawTagValue::Text("40N".into())),
            (GPS_LONGITUDE, dms(1, 0, 0)),
        ]);
        assert!(GpsResolver::resolve(&gps).is_none());
    }

    #[test]
    fn test_zero_denominator_is_absent() {
        let gps = gps_map(vec![
            (
                GPS_LATITUDE,
                RawTagValue::Rational(vec![
                    Rational::new(40, 0),
                    Rational::from(0),
                    Rational::from(0),
                ]),
            ),
            (GPS_LONGITUDE, dms(1, 0, 0)),
        ]);
        assert!(GpsResolver::resolve(&gps).is_none());
    }

    #[test]
    fn test_integer_sequence_coordinates() {
        let seq = |d, m, s| {
            RawTagValue::Sequence(vec![
                RawTagValue::Integer(d),
                RawTagValue::Integer(m),
                RawTagValue::Integer(s),
            ])
        };
        let gps = gps_map(vec![(GPS_LATITUDE, seq(10, 30, 0)), (GPS_LONGITUDE, seq(20, 0, 0))]);
        let block = GpsResolver::resolve(&gps).unwrap();
        assert_eq!(block.latitude, 10.5);
        assert_eq!(block.longitude, 20.0);
    }

    #[test]
    fn test_float_sequence_coordinates() {
        let seq = |d, m, s| {
            RawTagValue::Sequence(vec![
                RawTagValue::Float(d),
                RawTagValue::Float(m),
                RawTagValue::Float(s),
            ])
        };
        let gps = gps_map(vec![
            (GPS_LATITUDE, seq(10.0, 30.0, 0.0)),
            (GPS_LONGITUDE, seq(20.0, 15.0, 36.0)),
            (GPS_LONGITUDE_REF, RawTagValue::Text("W".into())),
        ]);
        let block = GpsResolver::resolve(&gps).unwrap();
        assert_eq!(block.latitude, 10.5);
        assert!((block.longitude + 20.26).abs() < 1e-12);
    }

    #[test]
    fn test_mixed_sequence_with_zero_denominator_is_absent() {
        let gps = gps_map(vec![
            (
                GPS_LATITUDE,
                RawTagValue::Sequence(vec![
                    RawTagValue::Float(10.0),
                    RawTagValue::Rational(vec![Rational::new(30, 0)]),
                    RawTagValue::Integer(0),
                ]),
            ),
            (GPS_LONGITUDE, dms(1, 0, 0)),
        ]);
        assert!(GpsResolver::resolve(&gps).is_none());
    }

    #[test]
    fn test_reference_compared_literally() {
        let gps = gps_map(vec![
            (GPS_LATITUDE, dms(40, 0, 0)),
            (GPS_LATITUDE_REF, RawTagValue::Text("N ".into())),
            (GPS_LONGITUDE, dms(3, 0, 0)),
            (GPS_LONGITUDE_REF, RawTagValue::Bytes(b"E\0".to_vec())),
        ]);
        let block = GpsResolver::resolve(&gps).unwrap();
        assert_eq!(block.latitude, -40.0);
        assert_eq!(block.longitude, 3.0);
    }

    #[test]
    fn test_altitude_and_timestamp_passthrough() {
        let altitude = RawTagValue::Rational(vec![Rational::new(6543, 10)]);
        let timestamp = dms(14, 3, 27);
        let gps = gps_map(vec![
            (GPS_LATITUDE, dms(1, 0, 0)),
            (GPS_LONGITUDE, dms(2, 0, 0)),
            (GPS_ALTITUDE, altitude.clone()),
            (GPS_TIMESTAMP, timestamp.clone()),
        ]);
        let block = GpsResolver::resolve(&gps).unwrap();
        assert_eq!(block.altitude, Some(altitude));
        assert_eq!(block.timestamp, Some(timestamp));
    }
}
