//! Simulation error type.

use fleet_core::VehicleId;
use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

/// Errors surfaced by the simulation engine.
///
/// Only run setup can fail; once a run is started the tick loop degrades
/// (dropping failed sinks, skipping completed vehicles) instead of erroring.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid parameters or assignment set.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The same vehicle id appeared twice in one batch of assignments.
    #[error("duplicate vehicle id in assignments: {0}")]
    DuplicateVehicle(VehicleId),
}
