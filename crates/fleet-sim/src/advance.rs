//! Per-tick movement physics for one vehicle.
//!
//! Pure with respect to the engine: all inputs are passed in, all randomness
//! flows through the vehicle's own RNG, and the only clock read is the `now`
//! argument.  Tests drive this directly without a tokio runtime.
//!
//! One tick, in order:
//!
//! 1. If delivering, wait out or finish the stop's pause.
//! 2. Dispatch an idle vehicle.
//! 3. Pick the target waypoint and check for arrival in place.
//! 4. Turn toward the target, bounded by the turn rate, shorter direction.
//! 5. Pick a target speed (cargo and traffic adjusted, clamped to the band)
//!    and approach it under the acceleration/deceleration limits.
//! 6. Project the position along the new heading for one compressed tick.
//! 7. Burn fuel proportional to distance and cargo.
//! 8. Check for arrival at the target.

use std::time::Instant;

use fleet_core::geo::{normalize_deg, signed_delta_deg};
use fleet_core::VehicleRng;

use crate::params::SimParams;
use crate::route::VehicleRoute;
use crate::snapshot::SimEvent;
use crate::vehicle::{VehicleState, VehicleStatus};

/// Advance one vehicle by one tick, returning the events it produced.
pub fn advance_vehicle(
    state: &mut VehicleState,
    route: &VehicleRoute,
    rng: &mut VehicleRng,
    params: &SimParams,
    now: Instant,
) -> Vec<SimEvent> {
    let mut events = Vec::new();
    if state.is_completed() {
        return events;
    }

    // Delivery pause: a deadline, not a blocking wait.
    if state.status == VehicleStatus::Delivering {
        match state.hold_until {
            Some(deadline) if now < deadline => return events,
            _ => {
                state.hold_until = None;
                state.reached_index = state.target_index;
                state.progress_pct = progress_pct(route, state.reached_index);
                state.deliveries_made += 1;
                let stop = &route.waypoints[state.target_index];
                events.push(SimEvent::DeliveryCompleted {
                    vehicle_id:         state.id.clone(),
                    waypoint_index:     state.target_index,
                    weight_kg:          stop.weight_kg,
                    remaining_cargo_kg: state.cargo_kg,
                });
                state.status = VehicleStatus::Moving;
            }
        }
    }

    if state.status == VehicleStatus::Idle {
        state.status = VehicleStatus::Moving;
    }

    state.last_update = Some(now);
    state.target_index = (state.reached_index + 1).min(route.last_index());
    let target = route.waypoints[state.target_index].position;

    // Already within the threshold (zero-delivery loop, tightly packed
    // stops): arrive without moving, so the vehicle cannot orbit a waypoint
    // it is standing on.
    if state.position.distance_m(target) < params.arrival_threshold_m {
        handle_arrival(state, route, params, now, &mut events);
        return events;
    }

    // Turn toward the target in the shorter direction, bounded per tick.
    let desired = state.position.bearing_to(target);
    let delta = signed_delta_deg(state.heading_deg, desired);
    let turn = delta.clamp(-params.max_turn_rate_deg, params.max_turn_rate_deg);
    state.heading_deg = normalize_deg(state.heading_deg + turn);

    // Target speed: base cruising speed scaled by load and traffic, clamped
    // to the operating band.
    let traffic = 1.0 + rng.gen_range(-params.traffic_variation..=params.traffic_variation);
    let target_speed = (params.average_speed_kmh * weight_factor(state.cargo_kg, params) * traffic)
        .clamp(params.min_speed_kmh, params.max_speed_kmh);

    let dt = params.tick_secs();
    if target_speed >= state.speed_kmh {
        state.speed_kmh =
            (state.speed_kmh + params.acceleration_kmh_per_sec * dt).min(target_speed);
    } else {
        state.speed_kmh =
            (state.speed_kmh - params.deceleration_kmh_per_sec * dt).max(target_speed);
    }

    // One tick of wall time is `speed_multiplier` ticks of simulated time.
    let distance_km = state.speed_kmh * params.speed_multiplier * dt / 3_600.0;
    state.position = state.position.destination(state.heading_deg, distance_km);

    let burn_rate = params.fuel_base_l_per_km
        + state.cargo_kg / 1_000.0 * params.fuel_cargo_l_per_km_per_tonne;
    state.fuel_used_l += burn_rate * distance_km;

    if state.position.distance_m(target) < params.arrival_threshold_m {
        handle_arrival(state, route, params, now, &mut events);
    }

    events
}

// ── Arrival ───────────────────────────────────────────────────────────────────

fn handle_arrival(
    state: &mut VehicleState,
    route: &VehicleRoute,
    params: &SimParams,
    now: Instant,
    events: &mut Vec<SimEvent>,
) {
    let index = state.target_index;
    // Snap to the waypoint so stops render at their exact coordinates.
    state.position = route.waypoints[index].position;
    state.speed_kmh = 0.0;

    if index == route.last_index() {
        state.status = VehicleStatus::Completed;
        state.reached_index = index;
        state.progress_pct = 100.0;
        state.cargo_kg = 0.0;
        events.push(SimEvent::RouteCompleted {
            vehicle_id:  state.id.clone(),
            fuel_used_l: state.fuel_used_l,
            deliveries:  state.deliveries_made,
        });
    } else {
        let stop = &route.waypoints[index];
        state.status = VehicleStatus::Delivering;
        state.cargo_kg = (state.cargo_kg - stop.weight_kg).max(0.0);
        state.hold_until = Some(now + params.delivery_pause());
    }
}

// ── Factors ───────────────────────────────────────────────────────────────────

/// Load-dependent speed factor in `[1 - penalty, 1]`: a full reference load
/// costs the whole penalty, heavier loads cost no more.
fn weight_factor(cargo_kg: f64, params: &SimParams) -> f64 {
    let load = (cargo_kg / params.cargo_reference_kg).clamp(0.0, 1.0);
    1.0 - load * params.cargo_speed_penalty
}

fn progress_pct(route: &VehicleRoute, reached_index: usize) -> f64 {
    reached_index as f64 / route.last_index() as f64 * 100.0
}
