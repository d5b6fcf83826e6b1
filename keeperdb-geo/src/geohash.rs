//! Geohash encoding and the bounding-box decomposition used by range
//! queries.
//!
//! A geohash interleaves longitude and latitude bits (longitude first) and
//! writes them five bits per character. Points that share a prefix lie in
//! the same cell, so a circle can be covered by a handful of prefix ranges
//! over a field holding the geohash.

use crate::error::{GeoError, GeoResult};
use crate::geo_point::GeoPoint;
use itertools::Itertools;

/// Characters of the geohash alphabet, in bit order.
pub const BASE32: &[u8] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Default length of generated geohashes.
pub const GEOHASH_PRECISION: usize = 10;

/// Longest supported geohash.
pub const MAX_GEOHASH_PRECISION: usize = 22;

const BITS_PER_CHAR: usize = 5;
const MAXIMUM_BITS_PRECISION: f64 = (MAX_GEOHASH_PRECISION * BITS_PER_CHAR) as f64;

// length of a meridian in meters
const EARTH_MERI_CIRCUMFERENCE: f64 = 40_007_860.0;
const METERS_PER_DEGREE_LATITUDE: f64 = 110_574.0;
// equatorial radius and eccentricity squared of the WGS84 ellipsoid
const EARTH_EQ_RADIUS: f64 = 6_378_137.0;
const E2: f64 = 0.00669447819799;
const EPSILON: f64 = 1e-12;

// sorts after every geohash character
const RANGE_END: char = '~';

/// One `[start, end]` range of geohash strings. Both ends are inclusive when
/// used with `start_at`/`end_at` cursors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeohashRange {
    pub start: String,
    pub end: String,
}

impl GeohashRange {
    fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        GeohashRange {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Encodes a point as a geohash of `precision` characters.
///
/// # Errors
/// [`GeoError::InvalidPrecision`] unless `1 <= precision <= 22`.
pub fn geohash_for_location(location: &GeoPoint, precision: usize) -> GeoResult<String> {
    if precision == 0 || precision > MAX_GEOHASH_PRECISION {
        return Err(GeoError::InvalidPrecision(precision));
    }

    let mut latitude_range = (-90.0_f64, 90.0_f64);
    let mut longitude_range = (-180.0_f64, 180.0_f64);
    let mut hash = String::with_capacity(precision);
    let mut hash_value = 0usize;
    let mut bits = 0;
    let mut even = true;

    while hash.len() < precision {
        let (value, range) = if even {
            (location.longitude(), &mut longitude_range)
        } else {
            (location.latitude(), &mut latitude_range)
        };
        let mid = (range.0 + range.1) / 2.0;
        if value > mid {
            hash_value = (hash_value << 1) + 1;
            range.0 = mid;
        } else {
            hash_value <<= 1;
            range.1 = mid;
        }

        even = !even;
        if bits < BITS_PER_CHAR - 1 {
            bits += 1;
        } else {
            bits = 0;
            hash.push(BASE32[hash_value] as char);
            hash_value = 0;
        }
    }
    Ok(hash)
}

/// Converts a distance in meters to degrees of longitude at `latitude`.
/// Capped at a full turn; at the poles any positive distance is a full turn.
pub fn meters_to_longitude_degrees(distance: f64, latitude: f64) -> f64 {
    let radians = latitude.to_radians();
    let numerator = radians.cos() * EARTH_EQ_RADIUS * std::f64::consts::PI / 180.0;
    let denominator = 1.0 / (1.0 - E2 * radians.sin() * radians.sin()).sqrt();
    let delta_degrees = numerator * denominator;
    if delta_degrees < EPSILON {
        if distance > 0.0 {
            360.0
        } else {
            0.0
        }
    } else {
        (distance / delta_degrees).min(360.0)
    }
}

/// Wraps a longitude into `[-180, 180]`.
pub fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        return longitude;
    }
    let adjusted = longitude + 180.0;
    if adjusted > 0.0 {
        (adjusted % 360.0) - 180.0
    } else {
        180.0 - (-adjusted % 360.0)
    }
}

fn longitude_bits_for_resolution(resolution: f64, latitude: f64) -> f64 {
    let degrees = meters_to_longitude_degrees(resolution, latitude);
    if degrees.abs() > 0.000001 {
        (360.0 / degrees).log2().max(1.0)
    } else {
        1.0
    }
}

fn latitude_bits_for_resolution(resolution: f64) -> f64 {
    (EARTH_MERI_CIRCUMFERENCE / 2.0 / resolution)
        .log2()
        .min(MAXIMUM_BITS_PRECISION)
}

fn north_and_south(center: &GeoPoint, size: f64) -> (f64, f64) {
    let latitude_delta = size / METERS_PER_DEGREE_LATITUDE;
    (
        (center.latitude() + latitude_delta).min(90.0),
        (center.latitude() - latitude_delta).max(-90.0),
    )
}

/// Number of geohash bits whose cells are at least `size` meters across
/// around `center`.
fn bounding_box_bits(center: &GeoPoint, size: f64) -> usize {
    let (north, south) = north_and_south(center, size);
    let bits_lat = latitude_bits_for_resolution(size).floor() * 2.0;
    let bits_long_north = longitude_bits_for_resolution(size, north).floor() * 2.0 - 1.0;
    let bits_long_south = longitude_bits_for_resolution(size, south).floor() * 2.0 - 1.0;
    let bits = bits_lat
        .min(bits_long_north)
        .min(bits_long_south)
        .min(MAXIMUM_BITS_PRECISION);
    // non-positive or NaN means cells larger than the globe
    if bits >= 1.0 {
        bits as usize
    } else {
        1
    }
}

/// The center, the four edge midpoints and the four corners of the square
/// enclosing the circle of `radius` meters.
fn bounding_box_coordinates(center: &GeoPoint, radius: f64) -> Vec<(f64, f64)> {
    let (north, south) = north_and_south(center, radius);
    let longitude_delta = meters_to_longitude_degrees(radius, north)
        .max(meters_to_longitude_degrees(radius, south));
    let longitude = center.longitude();
    let west = wrap_longitude(longitude - longitude_delta);
    let east = wrap_longitude(longitude + longitude_delta);

    [center.latitude(), north, south]
        .into_iter()
        .flat_map(|latitude| [(latitude, longitude), (latitude, west), (latitude, east)])
        .collect()
}

/// The range of geohashes sharing the first `bits` bits of `geohash`.
fn geohash_query(geohash: &str, bits: usize) -> GeoResult<GeohashRange> {
    let precision = bits.div_ceil(BITS_PER_CHAR);
    if geohash.len() < precision {
        return Ok(GeohashRange::new(geohash, format!("{}{}", geohash, RANGE_END)));
    }

    let invalid = || GeoError::InvalidGeohash(geohash.to_string());
    let base = geohash.get(..precision - 1).ok_or_else(invalid)?;
    let last = geohash.get(precision - 1..precision).ok_or_else(invalid)?;
    let last_value = last
        .bytes()
        .next()
        .and_then(|c| BASE32.iter().position(|b| *b == c))
        .ok_or_else(invalid)?;

    let significant_bits = bits - base.len() * BITS_PER_CHAR;
    let unused_bits = BITS_PER_CHAR - significant_bits;
    let start_value = (last_value >> unused_bits) << unused_bits;
    let end_value = start_value + (1 << unused_bits);

    let start = format!("{}{}", base, BASE32[start_value] as char);
    if end_value > 31 {
        Ok(GeohashRange::new(start, format!("{}{}", base, RANGE_END)))
    } else {
        Ok(GeohashRange::new(start, format!("{}{}", base, BASE32[end_value] as char)))
    }
}

/// Covers the circle of `radius` meters around `center` with geohash
/// ranges.
///
/// The ranges over-cover the circle, so every hit still has to be checked
/// against the exact distance. Identical ranges are returned once; distinct
/// ranges may share an end point.
pub fn geohash_query_bounds(center: &GeoPoint, radius: f64) -> GeoResult<Vec<GeohashRange>> {
    let query_bits = bounding_box_bits(center, radius).max(1);
    let precision = query_bits.div_ceil(BITS_PER_CHAR);

    let ranges = bounding_box_coordinates(center, radius)
        .into_iter()
        .map(|(latitude, longitude)| {
            let corner = GeoPoint::new(latitude, longitude)?;
            let hash = geohash_for_location(&corner, precision)?;
            geohash_query(&hash, query_bits)
        })
        .collect::<GeoResult<Vec<_>>>()?;

    Ok(ranges.into_iter().unique().collect())
}
