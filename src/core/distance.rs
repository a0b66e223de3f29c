use crate::models::{BoundingBox, Coordinate};

/// Earth's mean radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine (great-circle) distance between two points in kilometers
///
/// Symmetric, zero for identical points. Inputs are assumed to be valid
/// coordinates; callers reject NaN and out-of-range values beforehand.
#[inline]
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Calculate a bounding box around a center point
///
/// The box contains the whole circle of `radius_km` around `center`, so it
/// can be used as a candidate pre-filter; exact radius checks still go
/// through [`haversine_distance`].
///
/// Latitude extends by the angular radius `r / R`. The longitude half-width
/// is the circle's true extent, `asin(sin(r / R) / cos(lat))`, which grows
/// faster than `1 / cos(lat)` toward the poles. When the circle contains a
/// pole every longitude is reachable and the longitude bounds are infinite,
/// which makes the box [`BoundingBox::is_degenerate`].
pub fn calculate_bounding_box(center: Coordinate, radius_km: f64) -> BoundingBox {
    let angular_radius = radius_km / EARTH_RADIUS_KM;
    let lat_delta = angular_radius.to_degrees();

    let sin_radius = angular_radius.sin();
    let cos_lat = center.latitude.to_radians().cos();
    let lon_delta = if sin_radius >= cos_lat {
        f64::INFINITY
    } else {
        (sin_radius / cos_lat).asin().to_degrees()
    };

    BoundingBox {
        min_lat: center.latitude - lat_delta,
        max_lat: center.latitude + lat_delta,
        min_lon: center.longitude - lon_delta,
        max_lon: center.longitude + lon_delta,
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(point: Coordinate, bbox: &BoundingBox) -> bool {
    point.latitude >= bbox.min_lat
        && point.latitude <= bbox.max_lat
        && point.longitude >= bbox.min_lon
        && point.longitude <= bbox.max_lon
}
