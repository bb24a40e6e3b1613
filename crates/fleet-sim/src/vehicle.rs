//! Per-vehicle mutable state and its rounded wire form.

use std::time::Instant;

use fleet_core::{GeoPoint, Point, VehicleId};
use serde::Serialize;

// ── Status ────────────────────────────────────────────────────────────────────

/// The per-vehicle state machine.
///
/// `Idle` exists only before the first tick; the first advance dispatches the
/// vehicle toward its first stop.  `Completed` is terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Idle,
    Moving,
    Delivering,
    Completed,
}

// ── Mutable state ─────────────────────────────────────────────────────────────

/// Everything about one vehicle that changes during a run.
#[derive(Clone, Debug)]
pub struct VehicleState {
    pub id: VehicleId,
    pub position: GeoPoint,
    /// Compass heading in `[0, 360)` degrees.
    pub heading_deg: f64,
    pub speed_kmh: f64,
    pub status: VehicleStatus,
    /// Index into the route's waypoints of the stop being driven toward.
    pub target_index: usize,
    /// Highest waypoint index already reached.
    pub reached_index: usize,
    pub cargo_kg: f64,
    pub fuel_used_l: f64,
    /// Route completion in `[0, 100]`, by waypoints reached.
    pub progress_pct: f64,
    /// While `Delivering`, the instant the stop's pause ends.
    pub hold_until: Option<Instant>,
    /// Last tick that actually advanced this vehicle.
    pub last_update: Option<Instant>,
    pub deliveries_made: u32,
}

impl VehicleState {
    /// A vehicle parked at the depot, loaded and awaiting dispatch.
    pub fn at_depot(id: VehicleId, depot: &Point, cargo_kg: f64) -> Self {
        Self {
            id,
            position:        depot.position,
            heading_deg:     0.0,
            speed_kmh:       0.0,
            status:          VehicleStatus::Idle,
            target_index:    0,
            reached_index:   0,
            cargo_kg,
            fuel_used_l:     0.0,
            progress_pct:    0.0,
            hold_until:      None,
            last_update:     None,
            deliveries_made: 0,
        }
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.status == VehicleStatus::Completed
    }

    /// Rounded wire form for broadcast.
    pub fn record(&self) -> VehicleRecord {
        VehicleRecord {
            id:           self.id.clone(),
            lat:          round_to(self.position.lat, 6),
            lon:          round_to(self.position.lon, 6),
            heading_deg:  round_to(self.heading_deg, 1),
            speed_kmh:    round_to(self.speed_kmh, 1),
            status:       self.status,
            cargo_kg:     round_to(self.cargo_kg, 1),
            fuel_used_l:  round_to(self.fuel_used_l, 2),
            progress_pct: round_to(self.progress_pct, 1),
        }
    }
}

// ── Wire form ─────────────────────────────────────────────────────────────────

/// One vehicle as published in a snapshot.  Coordinates carry 6 decimals
/// (about 11 cm); the rest is display precision.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VehicleRecord {
    pub id: VehicleId,
    pub lat: f64,
    pub lon: f64,
    pub heading_deg: f64,
    pub speed_kmh: f64,
    pub status: VehicleStatus,
    pub cargo_kg: f64,
    pub fuel_used_l: f64,
    pub progress_pct: f64,
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
