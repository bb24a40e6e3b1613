//! `fleet-sim` — the vehicle simulation engine.
//!
//! Owns every vehicle's mutable state for the lifetime of one run, advances
//! it on a fixed wall-clock tick, and broadcasts one consistent snapshot of
//! the whole fleet per tick to pluggable sinks.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`engine`]    | `SimulationEngine` — start/stop, the tokio tick loop    |
//! | [`advance`]   | Pure per-tick movement physics for one vehicle          |
//! | [`vehicle`]   | `VehicleState`, `VehicleStatus`, wire `VehicleRecord`   |
//! | [`route`]     | `RouteAssignment` (optimizer handoff), `VehicleRoute`   |
//! | [`snapshot`]  | `Snapshot`, `SimEvent`                                  |
//! | [`broadcast`] | `SnapshotSink` trait + `Broadcaster` fan-out            |
//! | [`params`]    | `SimParams` — every tuned constant, with defaults       |
//! | [`error`]     | `SimError`                                              |
//!
//! # Per-vehicle state machine
//!
//! ```text
//! IDLE → MOVING → (DELIVERING → MOVING)* → COMPLETED
//! ```
//!
//! `IDLE` is the initial state (at the depot, not yet dispatched);
//! `COMPLETED` is terminal (back at the depot, cargo zeroed).  The delivery
//! pause is a deadline stored in the vehicle's state and checked each tick,
//! so one delivering vehicle never stalls the others.

pub mod advance;
pub mod broadcast;
pub mod engine;
pub mod error;
pub mod params;
pub mod route;
pub mod snapshot;
pub mod vehicle;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use broadcast::{Broadcaster, SinkError, SnapshotSink};
pub use engine::{EngineStatus, SimulationEngine};
pub use error::{SimError, SimResult};
pub use params::SimParams;
pub use route::{DeliveryOrder, RouteAssignment, VehicleRoute};
pub use snapshot::{SimEvent, Snapshot};
pub use vehicle::{VehicleRecord, VehicleState, VehicleStatus};
