use keeperdb::errors::{DbError, ErrorKind};
use thiserror::Error;

/// Errors raised while validating geographic input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("Latitude must be between -90 and 90 degrees, got: {0}")]
    InvalidLatitude(f64),

    #[error("Longitude must be between -180 and 180 degrees, got: {0}")]
    InvalidLongitude(f64),

    #[error("Radius must be a positive number of kilometers, got: {0}")]
    InvalidRadius(f64),

    #[error("Geohash precision must be between 1 and 22, got: {0}")]
    InvalidPrecision(usize),

    #[error("Invalid geohash '{0}'")]
    InvalidGeohash(String),
}

pub type GeoResult<T> = Result<T, GeoError>;

impl From<GeoError> for DbError {
    fn from(err: GeoError) -> Self {
        match err {
            GeoError::InvalidGeohash(_) => {
                DbError::new(&err.to_string(), ErrorKind::Extension("geo".to_string()))
            }
            _ => DbError::new(&err.to_string(), ErrorKind::InvalidArgument),
        }
    }
}
