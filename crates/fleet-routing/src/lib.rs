//! `fleet-routing` — the routing data client for the fleetsim simulator.
//!
//! Resolves pairwise travel distances and detailed path geometry between
//! delivery points via an OSRM-shaped remote service, degrading to a local
//! great-circle approximation whenever the network lets it down.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`client`]   | `RoutingClient`, `RoutingConfig` — cache → retry → fallback |
//! | [`geometry`] | `PathGeometry`, `RouteStep` value types                  |
//! | [`cache`]    | `TtlCache` — per-key atomic TTL cache, lazy eviction     |
//! | [`fallback`] | Haversine matrix and straight-line geometry              |
//! | [`wire`]     | serde types for the remote table/route/trip envelopes    |
//! | [`error`]    | `RoutingError` — internal failure taxonomy               |
//!
//! # Availability over precision
//!
//! Every public operation on [`RoutingClient`] returns a value, always.
//! Timeouts, bad HTTP statuses, malformed payloads, and service-reported
//! errors are all normalized into the same "unavailable" condition, retried
//! with backoff against a secondary endpoint, and finally answered with the
//! closed-form fallback.  Callers see a precision difference, never a
//! functional failure.

pub mod cache;
pub mod client;
pub mod error;
pub mod fallback;
pub mod geometry;
pub mod wire;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cache::{CacheStats, TtlCache};
pub use client::{RoutingClient, RoutingConfig};
pub use error::{RoutingError, RoutingResult};
pub use geometry::{PathGeometry, RouteStep};
