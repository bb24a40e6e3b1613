//! Unit tests for fleet-core primitives.

#[cfg(test)]
mod geo {
    use crate::geo::{normalize_deg, signed_delta_deg};
    use crate::GeoPoint;

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(41.0082, 28.9784);
        assert!(p.distance_m(p) < 0.01);
    }

    #[test]
    fn one_degree_of_latitude() {
        // ~1 degree of latitude ≈ 111 km
        let a = GeoPoint::new(41.0, 29.0);
        let b = GeoPoint::new(42.0, 29.0);
        let d = a.distance_km(b);
        assert!((d - 111.195).abs() < 0.5, "got {d}");
    }

    #[test]
    fn bearing_cardinal_directions() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert!((origin.bearing_to(GeoPoint::new(1.0, 0.0)) - 0.0).abs() < 1e-6);
        assert!((origin.bearing_to(GeoPoint::new(0.0, 1.0)) - 90.0).abs() < 1e-6);
        assert!((origin.bearing_to(GeoPoint::new(-1.0, 0.0)) - 180.0).abs() < 1e-6);
        assert!((origin.bearing_to(GeoPoint::new(0.0, -1.0)) - 270.0).abs() < 1e-6);
    }

    #[test]
    fn destination_distance_roundtrip() {
        let start = GeoPoint::new(41.0082, 28.9784);
        for bearing in [0.0, 37.0, 90.0, 123.0, 270.0, 359.0] {
            let end = start.destination(bearing, 5.0);
            let d = start.distance_km(end);
            assert!((d - 5.0).abs() < 1e-3, "bearing {bearing}: got {d}");
        }
    }

    #[test]
    fn destination_matches_bearing() {
        let start = GeoPoint::new(41.0, 29.0);
        let end = start.destination(60.0, 2.0);
        let b = start.bearing_to(end);
        assert!((b - 60.0).abs() < 0.1, "got {b}");
    }

    #[test]
    fn normalize_wraps_both_ways() {
        assert_eq!(normalize_deg(0.0), 0.0);
        assert_eq!(normalize_deg(360.0), 0.0);
        assert_eq!(normalize_deg(-30.0), 330.0);
        assert_eq!(normalize_deg(725.0), 5.0);
    }

    #[test]
    fn signed_delta_takes_shorter_direction() {
        // 350° → 10° is +20° clockwise, not -340°.
        assert!((signed_delta_deg(350.0, 10.0) - 20.0).abs() < 1e-9);
        // 10° → 350° is -20°.
        assert!((signed_delta_deg(10.0, 350.0) + 20.0).abs() < 1e-9);
        assert_eq!(signed_delta_deg(90.0, 90.0), 0.0);
    }
}

#[cfg(test)]
mod point {
    use crate::Point;

    #[test]
    fn bare_point_defaults() {
        let p = Point::new(41.0, 29.0);
        assert_eq!(p.weight_kg, 0.0);
        assert_eq!(p.service_time_min, 5);
        assert!(p.label.is_empty());
    }

    #[test]
    fn stop_carries_weight() {
        let p = Point::stop(41.02, 29.00, "customer_a", 100.0);
        assert_eq!(p.weight_kg, 100.0);
        assert_eq!(p.label, "customer_a");
    }

    #[test]
    fn deserializes_with_defaults() {
        let p: Point =
            serde_json::from_str(r#"{"position":{"lat":41.0,"lon":29.0}}"#).unwrap();
        assert_eq!(p.service_time_min, 5);
        assert_eq!(p.weight_kg, 0.0);
    }
}

#[cfg(test)]
mod ids {
    use crate::VehicleId;

    #[test]
    fn ordering_is_lexicographic() {
        assert!(VehicleId::from("vehicle_1") < VehicleId::from("vehicle_2"));
    }

    #[test]
    fn display_is_bare() {
        assert_eq!(VehicleId::from("v7").to_string(), "v7");
    }

    #[test]
    fn serde_transparent() {
        let id = VehicleId::from("v1");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""v1""#);
    }
}

#[cfg(test)]
mod rng {
    use crate::{VehicleId, VehicleRng};

    #[test]
    fn deterministic_same_seed() {
        let id = VehicleId::from("vehicle_0");
        let mut r1 = VehicleRng::new(12345, &id);
        let mut r2 = VehicleRng::new(12345, &id);
        for _ in 0..100 {
            let a: f64 = r1.gen_range(0.0..1.0);
            let b: f64 = r2.gen_range(0.0..1.0);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_vehicles_differ() {
        let mut r0 = VehicleRng::new(1, &VehicleId::from("vehicle_0"));
        let mut r1 = VehicleRng::new(1, &VehicleId::from("vehicle_1"));
        let a: f64 = r0.gen_range(0.0..1.0);
        let b: f64 = r1.gen_range(0.0..1.0);
        assert_ne!(a, b, "seeds for distinct vehicles should diverge");
    }

    #[test]
    fn gen_range_in_bounds() {
        let mut rng = VehicleRng::from_seed(0);
        for _ in 0..1000 {
            let v = rng.gen_range(0.8..=1.2);
            assert!((0.8..=1.2).contains(&v));
        }
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = VehicleRng::from_seed(0);
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }
}
