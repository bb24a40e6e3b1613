//! Delivery-point value type.

use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// A named location in a route: the depot or one delivery stop.
///
/// Immutable value — routes hold these by value and never mutate them during
/// a run.  `weight_kg` is the cargo dropped off at this stop (0 for the
/// depot); `service_time_min` is the nominal on-site handling time used by
/// upstream planning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub position: GeoPoint,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub weight_kg: f64,

    /// Nominal on-site service time in minutes.  Default: 5.
    #[serde(default = "default_service_time")]
    pub service_time_min: u32,
}

fn default_service_time() -> u32 {
    5
}

impl Point {
    /// A bare point with no label, weight, or non-default service time.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            position:         GeoPoint::new(lat, lon),
            label:            String::new(),
            weight_kg:        0.0,
            service_time_min: default_service_time(),
        }
    }

    /// A delivery stop carrying `weight_kg` of cargo.
    pub fn stop(lat: f64, lon: f64, label: impl Into<String>, weight_kg: f64) -> Self {
        Self {
            position:         GeoPoint::new(lat, lon),
            label:            label.into(),
            weight_kg,
            service_time_min: default_service_time(),
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.label.is_empty() {
            write!(f, "{}", self.position)
        } else {
            write!(f, "{} {}", self.label, self.position)
        }
    }
}
