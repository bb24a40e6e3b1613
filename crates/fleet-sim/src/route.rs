//! Route assignment (optimizer handoff) and the per-run route plan.

use fleet_core::{Point, VehicleId};
use fleet_routing::PathGeometry;
use serde::{Deserialize, Serialize};

// ── Optimizer handoff ─────────────────────────────────────────────────────────

/// One vehicle's planned route as produced by upstream planning: delivery
/// stops in visiting order plus the planner's declared totals.  The depot is
/// shared by the whole run and passed to `start` separately.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteAssignment {
    pub vehicle_id: VehicleId,
    pub deliveries: Vec<DeliveryOrder>,
    /// Planner's declared route length, km.  Carried through for reporting;
    /// the engine derives nothing from it.
    #[serde(default)]
    pub total_distance_km: f64,
    /// Planner's declared route duration, minutes.
    #[serde(default)]
    pub estimated_time_min: f64,
}

/// A single stop within an assignment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeliveryOrder {
    pub point: Point,
    /// Planner's sequence number, carried through to events for correlation.
    #[serde(default)]
    pub sequence: u32,
}

impl RouteAssignment {
    pub fn new(vehicle_id: impl Into<VehicleId>) -> Self {
        Self {
            vehicle_id:         vehicle_id.into(),
            deliveries:         Vec::new(),
            total_distance_km:  0.0,
            estimated_time_min: 0.0,
        }
    }

    pub fn with_delivery(mut self, point: Point) -> Self {
        let sequence = self.deliveries.len() as u32;
        self.deliveries.push(DeliveryOrder { point, sequence });
        self
    }

    pub fn with_totals(mut self, distance_km: f64, time_min: f64) -> Self {
        self.total_distance_km = distance_km;
        self.estimated_time_min = time_min;
        self
    }

    /// Total cargo loaded at departure: the sum of all stop weights.
    pub fn total_cargo_kg(&self) -> f64 {
        self.deliveries.iter().map(|d| d.point.weight_kg).sum()
    }
}

// ── Run-time route ────────────────────────────────────────────────────────────

/// The immutable route a vehicle follows for one run.
///
/// Waypoints are `[depot, stop_1, .., stop_n, depot]`, so index 0 is the
/// start, every interior index is a delivery, and the last index is the
/// return leg's end.  `geometry` is display-only road shape from the routing
/// client; movement physics uses the waypoints, never the geometry.
#[derive(Clone, Debug)]
pub struct VehicleRoute {
    pub waypoints: Vec<Point>,
    pub geometry: Option<PathGeometry>,
    /// Planner-declared totals, carried from the assignment.
    pub declared_distance_km: f64,
    pub declared_time_min: f64,
}

impl VehicleRoute {
    /// Build the closed waypoint loop from an assignment.
    pub fn from_assignment(assignment: &RouteAssignment, depot: &Point) -> Self {
        let mut waypoints = Vec::with_capacity(assignment.deliveries.len() + 2);
        waypoints.push(depot.clone());
        waypoints.extend(assignment.deliveries.iter().map(|d| d.point.clone()));
        waypoints.push(depot.clone());
        Self {
            waypoints,
            geometry:             None,
            declared_distance_km: assignment.total_distance_km,
            declared_time_min:    assignment.estimated_time_min,
        }
    }

    /// Index of the final waypoint (the depot return).
    #[inline]
    pub fn last_index(&self) -> usize {
        self.waypoints.len() - 1
    }

    /// Whether `index` is a delivery stop rather than the depot.
    #[inline]
    pub fn is_delivery(&self, index: usize) -> bool {
        index > 0 && index < self.last_index()
    }

    /// Number of delivery stops on the route.
    #[inline]
    pub fn delivery_count(&self) -> usize {
        self.waypoints.len().saturating_sub(2)
    }
}
