//! Unit tests for fleet-sim.
//!
//! Movement physics is tested tick by tick through `advance_vehicle` with no
//! runtime; engine tests use short real ticks and a collecting sink.  Params
//! use a small per-tick step (1 s tick, 5x multiplier, about 60 m per tick)
//! so arrivals are reliable against the 100 m threshold.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use fleet_core::{Point, VehicleId, VehicleRng};
use fleet_routing::{RoutingClient, RoutingConfig};

use crate::advance::advance_vehicle;
use crate::broadcast::{Broadcaster, SinkError, SnapshotSink};
use crate::engine::SimulationEngine;
use crate::error::SimError;
use crate::params::SimParams;
use crate::route::{RouteAssignment, VehicleRoute};
use crate::snapshot::{SimEvent, Snapshot};
use crate::vehicle::{VehicleState, VehicleStatus};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Small, deterministic tick scale: about 60 m per tick at cruising speed.
fn test_params() -> SimParams {
    SimParams {
        tick_interval:     Duration::from_secs(1),
        speed_multiplier:  5.0,
        traffic_variation: 0.0,
        delivery_time_min: 0.0,
        seed:              42,
        ..SimParams::default()
    }
}

fn test_depot() -> Point {
    Point::new(41.0082, 28.9784)
}

fn test_assignment(id: &str) -> RouteAssignment {
    RouteAssignment::new(id)
        .with_delivery(Point::stop(41.0200, 29.0000, "stop_a", 100.0))
        .with_delivery(Point::stop(41.0350, 29.0150, "stop_b", 50.0))
}

struct TestVehicle {
    state: VehicleState,
    route: VehicleRoute,
    rng: VehicleRng,
}

fn test_vehicle(params: &SimParams) -> TestVehicle {
    let assignment = test_assignment("van-1");
    let depot = test_depot();
    let route = VehicleRoute::from_assignment(&assignment, &depot);
    let state = VehicleState::at_depot(
        assignment.vehicle_id.clone(),
        &depot,
        assignment.total_cargo_kg(),
    );
    let rng = VehicleRng::new(params.seed, &assignment.vehicle_id);
    TestVehicle { state, route, rng }
}

/// Tick until the vehicle completes, returning every event in order.
fn run_to_completion(v: &mut TestVehicle, params: &SimParams) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for _ in 0..2_000 {
        events.extend(advance_vehicle(
            &mut v.state,
            &v.route,
            &mut v.rng,
            params,
            Instant::now(),
        ));
        if v.state.is_completed() {
            return events;
        }
    }
    panic!("vehicle did not complete within 2000 ticks: {:?}", v.state);
}

#[derive(Default)]
struct CollectSink {
    snapshots: Mutex<Vec<Snapshot>>,
    events: Mutex<Vec<SimEvent>>,
}

#[async_trait::async_trait]
impl SnapshotSink for CollectSink {
    async fn receive_snapshot(&self, snapshot: &Snapshot) -> Result<(), SinkError> {
        self.snapshots.lock().unwrap().push(snapshot.clone());
        Ok(())
    }

    async fn receive_event(&self, event: &SimEvent) -> Result<(), SinkError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

struct FailSink;

#[async_trait::async_trait]
impl SnapshotSink for FailSink {
    async fn receive_snapshot(&self, _: &Snapshot) -> Result<(), SinkError> {
        Err(SinkError("connection reset".to_owned()))
    }
}

// ── Movement physics ──────────────────────────────────────────────────────────

#[cfg(test)]
mod advance_tests {
    use super::*;

    #[test]
    fn first_tick_dispatches_idle_vehicle() {
        let params = test_params();
        let mut v = test_vehicle(&params);
        assert_eq!(v.state.status, VehicleStatus::Idle);

        let events = advance_vehicle(
            &mut v.state,
            &v.route,
            &mut v.rng,
            &params,
            Instant::now(),
        );

        assert!(events.is_empty());
        assert_eq!(v.state.status, VehicleStatus::Moving);
        assert_eq!(v.state.target_index, 1);
        assert!(v.state.speed_kmh > 0.0);
        assert!(v.state.position.distance_m(v.route.waypoints[0].position) > 0.0);
        // The first stop is northeast, so the heading swings off zero at once.
        assert!(v.state.heading_deg > 0.0);
        assert!(v.state.last_update.is_some());
        // Acceleration-limited: one second at 10 km/h per second.
        assert!((v.state.speed_kmh - 10.0).abs() < 1e-9);
    }

    #[test]
    fn heading_turns_at_most_the_turn_rate_per_tick() {
        let params = test_params();
        let mut v = test_vehicle(&params);

        let mut prev = v.state.heading_deg;
        for _ in 0..10 {
            advance_vehicle(&mut v.state, &v.route, &mut v.rng, &params, Instant::now());
            let turned = fleet_core::geo::signed_delta_deg(prev, v.state.heading_deg).abs();
            assert!(turned <= params.max_turn_rate_deg + 1e-9, "turned {turned}");
            prev = v.state.heading_deg;
        }
        // The first stop is northeast of the depot; by now the heading has
        // converged onto that bearing.
        let desired = v.state.position.bearing_to(v.route.waypoints[1].position);
        assert!(
            fleet_core::geo::signed_delta_deg(v.state.heading_deg, desired).abs() < 1.0,
            "heading {} desired {desired}",
            v.state.heading_deg
        );
    }

    #[test]
    fn speed_stays_inside_the_operating_band() {
        let params = test_params();
        let mut v = test_vehicle(&params);

        for _ in 0..2_000 {
            advance_vehicle(&mut v.state, &v.route, &mut v.rng, &params, Instant::now());
            assert!(v.state.speed_kmh <= params.max_speed_kmh);
            assert!(v.state.heading_deg >= 0.0 && v.state.heading_deg < 360.0);
            if v.state.is_completed() {
                return;
            }
        }
        panic!("vehicle did not complete");
    }

    #[test]
    fn deliveries_decrement_cargo_exactly() {
        let params = test_params();
        let mut v = test_vehicle(&params);
        assert_eq!(v.state.cargo_kg, 150.0);

        let events = run_to_completion(&mut v, &params);

        let deliveries: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SimEvent::DeliveryCompleted {
                    waypoint_index,
                    weight_kg,
                    remaining_cargo_kg,
                    ..
                } => Some((*waypoint_index, *weight_kg, *remaining_cargo_kg)),
                _ => None,
            })
            .collect();

        assert_eq!(deliveries, vec![(1, 100.0, 50.0), (2, 50.0, 0.0)]);

        let completions: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SimEvent::RouteCompleted { deliveries, fuel_used_l, .. } => {
                    Some((*deliveries, *fuel_used_l))
                }
                _ => None,
            })
            .collect();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].0, 2);
        assert!(completions[0].1 > 0.0, "fuel must have been burned");
    }

    #[test]
    fn completed_run_is_terminal() {
        let params = test_params();
        let mut v = test_vehicle(&params);
        run_to_completion(&mut v, &params);

        assert_eq!(v.state.status, VehicleStatus::Completed);
        assert_eq!(v.state.progress_pct, 100.0);
        assert_eq!(v.state.cargo_kg, 0.0);
        assert_eq!(v.state.speed_kmh, 0.0);

        // Further ticks are no-ops.
        let before = v.state.clone();
        let events =
            advance_vehicle(&mut v.state, &v.route, &mut v.rng, &params, Instant::now());
        assert!(events.is_empty());
        assert_eq!(v.state.position, before.position);
        assert_eq!(v.state.fuel_used_l, before.fuel_used_l);
    }

    #[test]
    fn progress_is_monotonic() {
        let params = test_params();
        let mut v = test_vehicle(&params);

        let mut prev = 0.0;
        for _ in 0..2_000 {
            advance_vehicle(&mut v.state, &v.route, &mut v.rng, &params, Instant::now());
            assert!(v.state.progress_pct >= prev);
            prev = v.state.progress_pct;
            if v.state.is_completed() {
                return;
            }
        }
        panic!("vehicle did not complete");
    }

    #[test]
    fn zero_delivery_route_completes_immediately() {
        let params = test_params();
        let assignment = RouteAssignment::new("van-idle");
        let depot = Point::new(41.0, 29.0);
        let route = VehicleRoute::from_assignment(&assignment, &depot);
        let mut state = VehicleState::at_depot(assignment.vehicle_id.clone(), &depot, 0.0);
        let mut rng = VehicleRng::new(params.seed, &assignment.vehicle_id);

        let events = advance_vehicle(&mut state, &route, &mut rng, &params, Instant::now());
        assert_eq!(state.status, VehicleStatus::Completed);
        assert!(matches!(events.as_slice(), [SimEvent::RouteCompleted { .. }]));
    }

    #[test]
    fn delivery_pause_holds_the_vehicle() {
        let params = SimParams {
            delivery_time_min: 60.0, // far longer than the test window
            ..test_params()
        };
        let mut v = test_vehicle(&params);

        for _ in 0..2_000 {
            advance_vehicle(&mut v.state, &v.route, &mut v.rng, &params, Instant::now());
            if v.state.status == VehicleStatus::Delivering {
                break;
            }
        }
        assert_eq!(v.state.status, VehicleStatus::Delivering);
        assert_eq!(v.state.speed_kmh, 0.0);
        let held_at = v.state.position;

        // The pause deadline is minutes away; further ticks must not move it.
        for _ in 0..5 {
            let events =
                advance_vehicle(&mut v.state, &v.route, &mut v.rng, &params, Instant::now());
            assert!(events.is_empty());
            assert_eq!(v.state.status, VehicleStatus::Delivering);
            assert_eq!(v.state.position, held_at);
        }
    }

    #[test]
    fn same_seed_reproduces_the_trajectory() {
        let params = SimParams {
            traffic_variation: 0.2,
            ..test_params()
        };

        let trace = || {
            let mut v = test_vehicle(&params);
            let mut positions = Vec::new();
            for _ in 0..50 {
                advance_vehicle(&mut v.state, &v.route, &mut v.rng, &params, Instant::now());
                positions.push((v.state.position.lat, v.state.position.lon, v.state.speed_kmh));
            }
            positions
        };

        assert_eq!(trace(), trace());
    }

    #[test]
    fn different_seeds_diverge() {
        let run = |seed: u64| {
            let params = SimParams {
                traffic_variation: 0.2,
                seed,
                ..test_params()
            };
            let mut v = test_vehicle(&params);
            for _ in 0..20 {
                advance_vehicle(&mut v.state, &v.route, &mut v.rng, &params, Instant::now());
            }
            (v.state.position.lat, v.state.position.lon)
        };

        assert_ne!(run(1), run(2));
    }
}

// ── Broadcast ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod broadcast_tests {
    use super::*;

    fn empty_snapshot() -> Snapshot {
        Snapshot {
            timestamp:         0.0,
            vehicles:          Vec::new(),
            simulation_active: true,
        }
    }

    #[tokio::test]
    async fn failing_sink_is_dropped_others_survive() {
        let good = Arc::new(CollectSink::default());
        let mut broadcaster = Broadcaster::new();
        broadcaster.subscribe("good", good.clone());
        broadcaster.subscribe("bad", Arc::new(FailSink));
        assert_eq!(broadcaster.len(), 2);

        broadcaster.publish_snapshot(&empty_snapshot()).await;
        assert_eq!(broadcaster.len(), 1, "failing sink must be dropped");

        broadcaster.publish_snapshot(&empty_snapshot()).await;
        assert_eq!(good.snapshots.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn resubscribing_an_id_replaces_the_sink() {
        let mut broadcaster = Broadcaster::new();
        broadcaster.subscribe("ui", Arc::new(CollectSink::default()));
        broadcaster.subscribe("ui", Arc::new(CollectSink::default()));
        assert_eq!(broadcaster.len(), 1);
        assert!(broadcaster.unsubscribe("ui"));
        assert!(!broadcaster.unsubscribe("ui"));
    }

    #[test]
    fn snapshot_serializes_snake_case() {
        let snapshot = Snapshot {
            timestamp: 1_700_000_000.5,
            vehicles: vec![
                VehicleState::at_depot("van-1".into(), &Point::new(41.0, 29.0), 150.0).record(),
            ],
            simulation_active: true,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["vehicles"][0]["status"], "idle");
        assert_eq!(json["vehicles"][0]["id"], "van-1");
        assert_eq!(json["simulation_active"], true);
    }

    #[test]
    fn events_serialize_with_a_tag() {
        let event = SimEvent::RouteCompleted {
            vehicle_id:  "van-1".into(),
            fuel_used_l: 1.25,
            deliveries:  3,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "route_completed");
        assert_eq!(json["deliveries"], 3);
    }
}

// ── Engine lifecycle ──────────────────────────────────────────────────────────

#[cfg(test)]
mod engine_tests {
    use super::*;

    fn offline_routing() -> Arc<RoutingClient> {
        Arc::new(RoutingClient::new(RoutingConfig {
            primary_url:   "http://127.0.0.1:9".to_owned(),
            secondary_url: "http://127.0.0.1:9".to_owned(),
            timeout:       Duration::from_millis(200),
            max_retries:   1,
            retry_delay:   Duration::ZERO,
            ..RoutingConfig::default()
        }))
    }

    fn fast_engine() -> SimulationEngine {
        let params = SimParams {
            tick_interval:     Duration::from_millis(5),
            speed_multiplier:  5.0,
            traffic_variation: 0.0,
            delivery_time_min: 0.0,
            seed:              42,
            ..SimParams::default()
        };
        match SimulationEngine::new(offline_routing(), params) {
            Ok(engine) => engine,
            Err(err) => panic!("engine setup failed: {err}"),
        }
    }

    #[test]
    fn invalid_params_are_rejected() {
        let params = SimParams {
            tick_interval: Duration::ZERO,
            ..SimParams::default()
        };
        assert!(matches!(
            SimulationEngine::new(offline_routing(), params),
            Err(SimError::Config(_))
        ));
    }

    #[tokio::test]
    async fn empty_start_is_a_successful_noop() {
        let engine = fast_engine();
        engine.start(Vec::new(), test_depot()).await.unwrap();
        assert!(!engine.is_running());
        assert_eq!(engine.status().await.vehicle_count, 0);
    }

    #[tokio::test]
    async fn duplicate_vehicle_ids_are_rejected() {
        let engine = fast_engine();
        let result = engine
            .start(
                vec![test_assignment("van-1"), test_assignment("van-1")],
                test_depot(),
            )
            .await;
        assert!(
            matches!(result, Err(SimError::DuplicateVehicle(id)) if id == VehicleId::from("van-1"))
        );
    }

    #[tokio::test]
    async fn loaded_vehicles_start_idle_at_the_depot() {
        let engine = fast_engine();
        let depot = test_depot();
        let depot_position = depot.position;
        engine
            .load_assignments(vec![test_assignment("van-7")], depot)
            .await
            .unwrap();

        let states = engine.vehicle_states().await;
        assert_eq!(states.len(), 1);
        let state = &states[0];
        assert_eq!(state.status, VehicleStatus::Idle);
        assert_eq!(state.position, depot_position);
        assert_eq!(state.cargo_kg, 150.0);
        assert_eq!(state.progress_pct, 0.0);
        assert_eq!(state.fuel_used_l, 0.0);
    }

    #[tokio::test]
    async fn stop_publishes_one_terminal_snapshot() {
        let engine = fast_engine();
        let sink = Arc::new(CollectSink::default());
        engine.subscribe("collector", sink.clone()).await;

        engine
            .start(vec![test_assignment("van-1")], test_depot())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        engine.stop().await;
        assert!(!engine.is_running());

        let count = {
            let snapshots = sink.snapshots.lock().unwrap();
            let last = snapshots.last().expect("at least one snapshot published");
            assert!(!last.simulation_active);
            assert!(last
                .vehicles
                .iter()
                .all(|v| v.status == VehicleStatus::Completed && v.progress_pct == 100.0));
            snapshots.len()
        };

        // A second stop publishes nothing further.
        engine.stop().await;
        assert_eq!(sink.snapshots.lock().unwrap().len(), count);
    }

    #[tokio::test]
    async fn immediate_stop_still_produces_a_terminal_snapshot() {
        let engine = fast_engine();
        let sink = Arc::new(CollectSink::default());
        engine.subscribe("collector", sink.clone()).await;

        engine
            .start(vec![test_assignment("van-1")], test_depot())
            .await
            .unwrap();
        engine.stop().await;

        let snapshots = sink.snapshots.lock().unwrap();
        let last = snapshots.last().expect("terminal snapshot published");
        assert!(!last.simulation_active);
        assert!(last
            .vehicles
            .iter()
            .all(|v| v.status == VehicleStatus::Completed && v.progress_pct == 100.0));
    }

    #[tokio::test]
    async fn natural_completion_ends_the_run() {
        let engine = fast_engine();
        let sink = Arc::new(CollectSink::default());
        engine.subscribe("collector", sink.clone()).await;

        // A depot-only route completes on its first tick.
        let assignment = RouteAssignment::new("van-empty");
        engine
            .start(vec![assignment], Point::new(41.0, 29.0))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!engine.is_running());
        let snapshots = sink.snapshots.lock().unwrap();
        let last = snapshots.last().expect("terminal snapshot published");
        assert!(!last.simulation_active);

        let events = sink.events.lock().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, SimEvent::RouteCompleted { .. })));
    }

    #[tokio::test]
    async fn speed_multiplier_is_clamped() {
        let engine = fast_engine();
        engine.set_speed_multiplier(5_000.0).await;
        assert_eq!(engine.status().await.speed_multiplier, 1_000.0);
        engine.set_speed_multiplier(0.1).await;
        assert_eq!(engine.status().await.speed_multiplier, 1.0);
    }
}
