//! Broadcast payloads: the per-tick fleet snapshot and discrete events.

use fleet_core::VehicleId;
use serde::Serialize;

use crate::vehicle::VehicleRecord;

/// One consistent view of the whole fleet, published once per tick.
///
/// All vehicles in a snapshot were advanced under the same state lock, so a
/// consumer never sees vehicle A at tick `n` and vehicle B at tick `n + 1`
/// in the same payload.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    /// Unix timestamp in seconds, fractional.
    pub timestamp: f64,
    pub vehicles: Vec<VehicleRecord>,
    /// `false` only in the terminal snapshot of a run.
    pub simulation_active: bool,
}

/// Discrete milestones, published alongside the snapshot of the tick they
/// occurred in.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    DeliveryCompleted {
        vehicle_id: VehicleId,
        /// Waypoint index of the stop served.
        waypoint_index: usize,
        weight_kg: f64,
        remaining_cargo_kg: f64,
    },
    RouteCompleted {
        vehicle_id: VehicleId,
        fuel_used_l: f64,
        deliveries: u32,
    },
}
