use thiserror::Error;

/// Approximate radius of the earth in km
const EARTH_RADIUS_KM: f64 = 6373.0;

/// The 16 compass points in clockwise order starting at north, 22.5 degrees apart
const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE",
    "S", "SSW", "SW", "WSW", "W", "WNW", "NW", "NNW",
];

/// Calculates the great-circle (haversine) distance between two points in km,
/// rounded to two decimals
///
/// # Arguments
///
/// * 'lat_a' - latitude of the first point in degrees
/// * 'long_a' - longitude of the first point in degrees
/// * 'lat_b' - latitude of the second point in degrees
/// * 'long_b' - longitude of the second point in degrees
pub fn distance_km(lat_a: f64, long_a: f64, lat_b: f64, long_b: f64) -> f64 {
    let d_lat = (lat_b - lat_a).to_radians();
    let d_long = (long_b - long_a).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat_a.to_radians().cos() * lat_b.to_radians().cos() * (d_long / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    round_to_two_decimals(EARTH_RADIUS_KM * c)
}

/// Converts a compass direction such as "SSW" into degrees
///
/// # Arguments
///
/// * 'direction' - one of the 16 compass point codes
pub fn compass_to_degrees(direction: &str) -> Result<f64, GeoError> {
    COMPASS_POINTS.iter()
        .position(|&p| p == direction)
        .map(|i| i as f64 * 22.5)
        .ok_or_else(|| GeoError::UnknownDirection(direction.to_string()))
}

/// Rounds values to two decimals
///
/// # Arguments
///
/// * 'value' - the value to round to two decimals
fn round_to_two_decimals(value: f64) -> f64 {
    (value * 100f64).round() / 100f64
}

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("UnknownDirection: {0}")]
    UnknownDirection(String),
}
