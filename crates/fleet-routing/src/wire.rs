//! serde types for the remote routing service's response envelopes.
//!
//! The service is OSRM-shaped: every response carries a `code` field that is
//! `"Ok"` on success, coordinates travel as `[lon, lat]` pairs, and distances
//! and durations are metres and seconds.

use fleet_core::GeoPoint;
use serde::Deserialize;

use crate::geometry::{PathGeometry, RouteStep};

// ── /table ────────────────────────────────────────────────────────────────────

/// Response from the distance-matrix endpoint.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    pub code: String,
    /// `distances[i][j]` in metres.
    #[serde(default)]
    pub distances: Option<Vec<Vec<f64>>>,
}

// ── /route ────────────────────────────────────────────────────────────────────

/// Response from the route-geometry endpoint.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    pub code: String,
    #[serde(default)]
    pub routes: Vec<WireRoute>,
}

#[derive(Debug, Deserialize)]
pub struct WireRoute {
    pub distance: f64,
    pub duration: f64,
    pub geometry: WireGeometry,
    #[serde(default)]
    pub legs: Vec<WireLeg>,
}

#[derive(Debug, Deserialize)]
pub struct WireGeometry {
    /// GeoJSON order: `[lon, lat]`.
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
pub struct WireLeg {
    #[serde(default)]
    pub steps: Vec<WireStep>,
}

#[derive(Debug, Deserialize)]
pub struct WireStep {
    #[serde(default)]
    pub name: String,
    pub distance: f64,
    pub duration: f64,
    pub maneuver: WireManeuver,
}

#[derive(Debug, Deserialize)]
pub struct WireManeuver {
    #[serde(rename = "type")]
    pub kind: String,
}

impl WireRoute {
    /// Convert into a [`PathGeometry`], flipping coordinates to lat/lon and
    /// flattening per-leg steps.
    pub fn into_geometry(self) -> PathGeometry {
        let coordinates = self
            .geometry
            .coordinates
            .into_iter()
            .map(|[lon, lat]| GeoPoint::new(lat, lon))
            .collect();

        let steps = self
            .legs
            .into_iter()
            .flat_map(|leg| leg.steps)
            .map(|s| RouteStep {
                instruction:   s.maneuver.kind,
                road:          s.name,
                distance_m:    s.distance,
                duration_secs: s.duration,
            })
            .collect();

        PathGeometry {
            coordinates,
            distance_m:    self.distance,
            duration_secs: self.duration,
            steps,
        }
    }
}

// ── /trip ─────────────────────────────────────────────────────────────────────

/// Response from the trip (visit-order) endpoint.
#[derive(Debug, Deserialize)]
pub struct TripResponse {
    pub code: String,
    /// One entry per *input* coordinate; `waypoint_index` is its position in
    /// the optimized trip.
    #[serde(default)]
    pub waypoints: Vec<TripWaypoint>,
}

#[derive(Debug, Deserialize)]
pub struct TripWaypoint {
    pub waypoint_index: usize,
}

impl TripResponse {
    /// Recover the visiting order of the delivery points.
    ///
    /// Input 0 is the depot (fixed start/end) and is excluded; the remaining
    /// input indices are sorted by their position in the trip and shifted
    /// down by one so they index the caller's delivery-point slice.
    ///
    /// Returns `None` if the response doesn't cover `n + 1` inputs.
    pub fn visit_order(&self, n_deliveries: usize) -> Option<Vec<usize>> {
        if self.waypoints.len() != n_deliveries + 1 {
            return None;
        }
        let mut order: Vec<(usize, usize)> = self
            .waypoints
            .iter()
            .enumerate()
            .skip(1) // depot
            .map(|(input_idx, wp)| (wp.waypoint_index, input_idx - 1))
            .collect();
        order.sort_unstable();
        Some(order.into_iter().map(|(_, idx)| idx).collect())
    }
}
