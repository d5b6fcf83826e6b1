use crate::geo_point::GeoPoint;

/// Mean earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers (haversine).
pub fn distance_between(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let lat_delta = (to.latitude() - from.latitude()).to_radians();
    let lon_delta = (to.longitude() - from.longitude()).to_radians();

    let a = (lat_delta / 2.0).sin().powi(2)
        + from.latitude().to_radians().cos()
            * to.latitude().to_radians().cos()
            * (lon_delta / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
