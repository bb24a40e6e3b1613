//! `fleet-core` — foundational types for the fleetsim delivery simulator.
//!
//! This crate is a dependency of every other `fleet-*` crate.  It intentionally
//! has no `fleet-*` dependencies and minimal external ones (only `rand` and
//! `serde`).  Everything here is pure: no I/O, no network, no async.
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`geo`]     | `GeoPoint`, haversine distance, bearing, projection   |
//! | [`point`]   | `Point` — a delivery location with weight/service time|
//! | [`ids`]     | `VehicleId` — stable string vehicle key               |
//! | [`rng`]     | `VehicleRng` — per-vehicle deterministic RNG          |

pub mod geo;
pub mod ids;
pub mod point;
pub mod rng;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::GeoPoint;
pub use ids::VehicleId;
pub use point::Point;
pub use rng::VehicleRng;
