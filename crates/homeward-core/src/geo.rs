//! Great-circle distance math

use crate::types::Coordinate;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two points, in meters.
///
/// Deterministic for identical inputs. The haversine intermediate is clamped
/// to [0, 1]; identical points give exactly 0 and antipodal points stay
/// finite.
pub fn haversine_distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: Coordinate = Coordinate {
        latitude: 53.839425,
        longitude: 11.993049,
    };

    #[test]
    fn test_identical_points_are_zero() {
        assert_eq!(haversine_distance_meters(HOME, HOME), 0.0);

        let origin = Coordinate::new(0.0, 0.0);
        assert_eq!(haversine_distance_meters(origin, origin), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let away = Coordinate::new(53.840425, 11.994049);
        let d1 = haversine_distance_meters(HOME, away);
        let d2 = haversine_distance_meters(away, HOME);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn test_nearby_point_is_outside_home_radius() {
        // ~130m northeast of home
        let away = Coordinate::new(53.840425, 11.994049);
        let d = haversine_distance_meters(HOME, away);
        assert!(d > 30.0, "expected > 30m, got {}", d);
        assert!(d < 300.0, "sanity bound, got {}", d);
    }

    #[test]
    fn test_antipodal_points_do_not_produce_nan() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let d = haversine_distance_meters(a, b);
        assert!(d.is_finite());
        // Half the Earth's mean circumference, within a kilometer
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_METERS).abs() < 1000.0);
    }

    #[test]
    fn test_known_city_pair_distance() {
        // Berlin -> Hamburg, roughly 255km
        let berlin = Coordinate::new(52.520008, 13.404954);
        let hamburg = Coordinate::new(53.551086, 9.993682);
        let d = haversine_distance_meters(berlin, hamburg);
        assert!((d - 255_000.0).abs() < 5_000.0, "got {}", d);
    }
}
