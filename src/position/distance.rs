use crate::constants::{EARTH_RADIUS_M, METERS_PER_MILE};

/// Great-circle distance in metres on a spherical Earth (haversine).
///
/// Exactly symmetric in its two points.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let delta_lat = (lat2 - lat1).abs().to_radians();
    let delta_lon = (lon2 - lon1).abs().to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push a past 1.0 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Great-circle distance in statute miles, rounded to one decimal place.
pub fn distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let miles = distance_meters(lat1, lon1, lat2, lon2) / METERS_PER_MILE;
    (miles * 10.0).round() / 10.0
}
