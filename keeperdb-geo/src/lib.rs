//! # keeperdb Geo - proximity queries for keeperdb repositories
//!
//! This crate adds "within radius" search to keeperdb collections whose
//! documents carry a geohash and a latitude/longitude pair.
//!
//! ## Features
//!
//! - **Geohash Encoding**: base32 geohashes up to 22 characters
//! - **Range Decomposition**: covers a circle with a few geohash prefix ranges
//! - **Concurrent Shards**: one ordered range query per geohash range, all in flight at once
//! - **Exact Post-Filter**: great-circle distance check on every hit
//! - **Role Filters**: keeper and activity flags, configurable field paths
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keeperdb_geo::{GeoPoint, GeoQueryOptions, GeoRangeQuery};
//!
//! let keepers = db.repository(&KEEPERS);
//! let center = GeoPoint::new(51.5074, -0.1278)?;
//! let nearby = keepers
//!     .get_within_range(center, 10.0, GeoQueryOptions::default())
//!     .await?;
//! ```
//!
//! Documents are expected to store the geohash of their location (see
//! [`geohash_for_location`]) in the field named by [`GeoFields::hash`].

pub mod distance;
pub mod error;
pub mod geo_point;
pub mod geohash;
pub mod range_query;

pub use distance::{distance_between, EARTH_RADIUS_KM};
pub use error::{GeoError, GeoResult};
pub use geo_point::GeoPoint;
pub use geohash::{
    geohash_for_location, geohash_query_bounds, meters_to_longitude_degrees, wrap_longitude,
    GeohashRange, GEOHASH_PRECISION,
};
pub use range_query::{collect_within_range, GeoFields, GeoQueryOptions, GeoRangeQuery};

#[cfg(test)]
#[ctor::ctor]
fn init() {
    colog::init();
}
