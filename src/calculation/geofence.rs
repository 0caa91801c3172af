//! Geo-fence validation.
//!
//! Pure functions: a point plus a set of candidate fences yields an
//! accept/reject decision with the matched or nearest fence. The caller is
//! responsible for fence selection precedence (employee assignments over the
//! organization-wide set) and for rejecting malformed coordinates before
//! calling in.

use crate::models::{GeoFence, GeoPoint, LocationCheck};

/// Mean Earth radius in meters, used by the great-circle distance.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle (haversine) distance between two points, in meters.
///
/// # Example
///
/// ```
/// use workforce_engine::calculation::haversine_distance_meters;
/// use workforce_engine::models::GeoPoint;
///
/// let a = GeoPoint { latitude: 0.0, longitude: 0.0 };
/// let b = GeoPoint { latitude: 0.0, longitude: 0.0 };
/// assert_eq!(haversine_distance_meters(a, b), 0.0);
/// ```
pub fn haversine_distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Validates a point against a set of candidate fences.
///
/// A point is valid if its distance to any fence's center is within that
/// fence's radius; the first match wins (any match suffices, so ordering is
/// irrelevant). On rejection the nearest fence and its distance are reported
/// so the caller can present a helpful error.
///
/// An empty candidate set resolves to `fail_open`: unconfigured
/// organizations must not block check-ins, so the engine passes `true` here
/// unless its policy says otherwise.
pub fn validate_point(point: GeoPoint, fences: &[GeoFence], fail_open: bool) -> LocationCheck {
    if fences.is_empty() {
        return LocationCheck {
            is_valid: fail_open,
            distance_meters: 0.0,
            matched_fence_id: None,
            nearest_fence_id: None,
        };
    }

    let mut nearest_id = None;
    let mut nearest_distance = f64::INFINITY;
    for fence in fences {
        let distance = haversine_distance_meters(point, fence.center);
        if distance <= fence.radius_meters {
            return LocationCheck {
                is_valid: true,
                distance_meters: distance,
                matched_fence_id: Some(fence.id),
                nearest_fence_id: None,
            };
        }
        if distance < nearest_distance {
            nearest_distance = distance;
            nearest_id = Some(fence.id);
        }
    }

    LocationCheck {
        is_valid: false,
        distance_meters: nearest_distance,
        matched_fence_id: None,
        nearest_fence_id: nearest_id,
    }
}
