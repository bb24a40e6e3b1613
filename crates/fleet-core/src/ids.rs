//! Stable string identifier for vehicles.
//!
//! Vehicles are keyed by an operator-supplied string (e.g. `"vehicle_3"`)
//! rather than a dense integer index: the set of vehicles changes per run and
//! ids must survive serialization to subscribers unchanged.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A stable, operator-assigned vehicle identifier.
///
/// `Ord + Hash` so it can key sorted maps — snapshot ordering is
/// deterministic because the engine iterates vehicles in `VehicleId` order.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub String);

impl VehicleId {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VehicleId {
    fn from(s: &str) -> Self {
        VehicleId(s.to_owned())
    }
}

impl From<String> for VehicleId {
    fn from(s: String) -> Self {
        VehicleId(s)
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
