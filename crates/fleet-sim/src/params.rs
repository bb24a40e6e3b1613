//! Simulation tuning parameters.

use std::time::Duration;

use crate::error::{SimError, SimResult};

/// Every tuned constant of the simulation, with the stock defaults.
///
/// The arrival threshold and delivery pause are configuration, not derived
/// values — operators tune them per deployment.  All randomness downstream of
/// these parameters flows through per-vehicle RNGs seeded from `seed`, so a
/// fixed seed reproduces exact trajectories.
#[derive(Clone, Debug)]
pub struct SimParams {
    /// Wall-clock broadcast period.  Default: 2 s.
    pub tick_interval: Duration,

    /// Simulated time runs this many times faster than wall clock.
    /// Default: 100.
    pub speed_multiplier: f64,

    /// Base cruising speed before cargo/traffic adjustment, km/h.  Default: 45.
    pub average_speed_kmh: f64,

    /// Cruising-speed band the target speed is clamped to, km/h.
    /// Defaults: 20–80.
    pub min_speed_kmh: f64,
    pub max_speed_kmh: f64,

    /// Speed change limits per elapsed tick-second, km/h.  Deceleration is
    /// faster than acceleration.  Defaults: 10 / 15.
    pub acceleration_kmh_per_sec: f64,
    pub deceleration_kmh_per_sec: f64,

    /// Maximum heading change per tick, degrees.  Default: 30.
    pub max_turn_rate_deg: f64,

    /// A vehicle within this distance of its target waypoint has arrived.
    /// Default: 100 m.
    pub arrival_threshold_m: f64,

    /// Simulated minutes spent at each delivery stop.  Default: 3.
    pub delivery_time_min: f64,

    /// Bounded random traffic perturbation: target speed is scaled by a
    /// uniform factor in `[1 - x, 1 + x]`.  Default: 0.2.
    pub traffic_variation: f64,

    /// Maximum fractional speed reduction from cargo load.  Default: 0.2.
    pub cargo_speed_penalty: f64,

    /// Cargo mass at which the full speed penalty applies, kg.  Default: 2000.
    pub cargo_reference_kg: f64,

    /// Fuel burn: base litres per km plus a cargo-proportional term per
    /// tonne.  Defaults: 0.08 + 0.02/t.
    pub fuel_base_l_per_km: f64,
    pub fuel_cargo_l_per_km_per_tonne: f64,

    /// Master RNG seed for the traffic factor.
    pub seed: u64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            tick_interval:               Duration::from_secs(2),
            speed_multiplier:            100.0,
            average_speed_kmh:           45.0,
            min_speed_kmh:               20.0,
            max_speed_kmh:               80.0,
            acceleration_kmh_per_sec:    10.0,
            deceleration_kmh_per_sec:    15.0,
            max_turn_rate_deg:           30.0,
            arrival_threshold_m:         100.0,
            delivery_time_min:           3.0,
            traffic_variation:           0.2,
            cargo_speed_penalty:         0.2,
            cargo_reference_kg:          2_000.0,
            fuel_base_l_per_km:          0.08,
            fuel_cargo_l_per_km_per_tonne: 0.02,
            seed:                        0,
        }
    }
}

impl SimParams {
    /// Reject parameter sets the engine cannot run with.
    pub fn validate(&self) -> SimResult<()> {
        if self.tick_interval.is_zero() {
            return Err(SimError::Config("tick interval must be positive".into()));
        }
        if self.speed_multiplier < 1.0 {
            return Err(SimError::Config("speed multiplier must be at least 1".into()));
        }
        if self.min_speed_kmh > self.max_speed_kmh {
            return Err(SimError::Config(format!(
                "speed band inverted: min {} > max {}",
                self.min_speed_kmh, self.max_speed_kmh
            )));
        }
        Ok(())
    }

    /// Tick period in seconds — the `dt` of one advance step.
    #[inline]
    pub fn tick_secs(&self) -> f64 {
        self.tick_interval.as_secs_f64()
    }

    /// Wall-clock duration of one delivery pause: the simulated delivery
    /// time compressed by the speed multiplier.
    pub fn delivery_pause(&self) -> Duration {
        Duration::from_secs_f64(self.delivery_time_min * 60.0 / self.speed_multiplier)
    }
}
