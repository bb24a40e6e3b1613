//! Path geometry value types.

use fleet_core::GeoPoint;
use serde::{Deserialize, Serialize};

/// One turn-by-turn instruction along a path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteStep {
    /// Maneuver kind as reported by the service (`"turn"`, `"depart"`, …).
    pub instruction: String,
    /// Road name, if the service provided one.
    pub road: String,
    pub distance_m: f64,
    pub duration_secs: f64,
}

/// The detailed path between an ordered list of points.
///
/// Produced by the routing client (remote or fallback) and owned by the
/// simulation route that requested it; never mutated after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathGeometry {
    /// Ordered coordinate samples along the path.
    pub coordinates: Vec<GeoPoint>,
    pub distance_m: f64,
    pub duration_secs: f64,
    /// Turn-by-turn steps.  Empty for fallback geometry.
    pub steps: Vec<RouteStep>,
}

impl PathGeometry {
    #[inline]
    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1_000.0
    }
}
