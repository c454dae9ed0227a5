use crate::bounds::LatLngBounds;
use crate::geo::LatLng;

/// WGS84 semi-major axis (meters). Map providers size circles with it.
pub const WGS84_A: f64 = 6_378_137.0;

/// Mean earth radius used for route distances (kilometers).
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Radius of the city discovery circle at zoom 0 (meters).
pub const DISCOVERY_RADIUS_Z0_M: f64 = 3_000_000.0;

/// Great-circle distance in kilometers.
pub fn haversine_km(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlng = (dlng / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng;
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Discovery radius for a map zoom level: halves with every zoom step.
pub fn discovery_radius_m(zoom: f64) -> f64 {
    DISCOVERY_RADIUS_Z0_M / 2f64.powf(zoom)
}

/// Bounding box of a circle of `radius_m` around `center`.
///
/// The box is clamped to valid latitudes and longitudes; near the poles the
/// longitude span covers the whole world.
pub fn circle_bounds(center: LatLng, radius_m: f64) -> LatLngBounds {
    let dlat = (radius_m / WGS84_A).to_degrees();
    let cos_lat = center.lat.to_radians().cos();
    let dlng = if cos_lat <= 1e-9 {
        180.0
    } else {
        (dlat / cos_lat).min(180.0)
    };

    LatLngBounds::new(
        LatLng::new(
            (center.lat - dlat).max(-90.0),
            (center.lng - dlng).max(-180.0),
        ),
        LatLng::new(
            (center.lat + dlat).min(90.0),
            (center.lng + dlng).min(180.0),
        ),
    )
}
