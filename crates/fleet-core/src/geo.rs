//! Geographic coordinate type and great-circle math.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  The simulation projects
//! sub-kilometre steps every tick and compares the result against a 100 m
//! arrival threshold, so single-precision rounding would be visible in the
//! motion; `f64` keeps every operation well inside tolerance.
//!
//! All angles are degrees.  Bearings are compass bearings: 0° = north,
//! 90° = east, always normalized to `[0, 360)`.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres (spherical model).
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in kilometres.
    pub fn distance_km(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().asin();
        EARTH_RADIUS_KM * c
    }

    /// Haversine great-circle distance in metres.
    #[inline]
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        self.distance_km(other) * 1_000.0
    }

    /// Initial compass bearing from `self` to `other`, in `[0, 360)` degrees.
    pub fn bearing_to(self, other: GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

        normalize_deg(y.atan2(x).to_degrees())
    }

    /// Destination point after travelling `distance_km` along the great
    /// circle with initial `bearing_deg`.
    pub fn destination(self, bearing_deg: f64, distance_km: f64) -> GeoPoint {
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();
        let brg = bearing_deg.to_radians();
        let ang = distance_km / EARTH_RADIUS_KM; // angular distance

        let lat2 = (lat1.sin() * ang.cos() + lat1.cos() * ang.sin() * brg.cos()).asin();
        let lon2 = lon1
            + (brg.sin() * ang.sin() * lat1.cos())
                .atan2(ang.cos() - lat1.sin() * lat2.sin());

        GeoPoint::new(lat2.to_degrees(), lon2.to_degrees())
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── Angle helpers ─────────────────────────────────────────────────────────────

/// Normalize an angle to `[0, 360)` degrees.
#[inline]
pub fn normalize_deg(angle: f64) -> f64 {
    let a = angle % 360.0;
    if a < 0.0 { a + 360.0 } else { a }
}

/// Signed rotation from `from_deg` to `to_deg`, in `(-180, 180]` degrees.
///
/// Positive means the shorter rotation is clockwise.  Used by the engine to
/// turn vehicle headings in the shorter direction.
#[inline]
pub fn signed_delta_deg(from_deg: f64, to_deg: f64) -> f64 {
    let d = normalize_deg(to_deg - from_deg);
    if d > 180.0 { d - 360.0 } else { d }
}
