//! The simulation engine: run setup, the tokio tick loop, and control.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use fleet_core::{Point, VehicleId, VehicleRng};
use fleet_routing::RoutingClient;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::advance::advance_vehicle;
use crate::broadcast::{Broadcaster, SnapshotSink};
use crate::error::{SimError, SimResult};
use crate::params::SimParams;
use crate::route::{RouteAssignment, VehicleRoute};
use crate::snapshot::Snapshot;
use crate::vehicle::{VehicleState, VehicleStatus};

// ── Shared state ──────────────────────────────────────────────────────────────

/// One vehicle's simulation bundle: mutable state, immutable route, own RNG.
struct VehicleSim {
    state: VehicleState,
    route: VehicleRoute,
    rng: VehicleRng,
}

/// Everything the tick loop mutates, behind one lock so every snapshot is a
/// consistent cut across the fleet.
struct RunState {
    vehicles: BTreeMap<VehicleId, VehicleSim>,
    params: SimParams,
}

struct EngineShared {
    /// Cleared to ask the loop to exit; the loop also clears it itself when
    /// every route has completed.
    running: AtomicBool,
    state: Mutex<RunState>,
    broadcaster: Mutex<Broadcaster>,
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Owns the fleet state and the background tick task.
///
/// `start` replaces any run in progress.  All control methods are `&self`;
/// share the engine behind an `Arc` between the control surface and the loop.
pub struct SimulationEngine {
    shared: Arc<EngineShared>,
    routing: Arc<RoutingClient>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// Aggregate view of the engine for status endpoints.
#[derive(Clone, Debug, Serialize)]
pub struct EngineStatus {
    pub running: bool,
    pub vehicle_count: usize,
    pub completed_count: usize,
    pub avg_progress_pct: f64,
    pub total_fuel_l: f64,
    pub speed_multiplier: f64,
    pub tick_secs: f64,
}

impl SimulationEngine {
    pub fn new(routing: Arc<RoutingClient>, params: SimParams) -> SimResult<Self> {
        params.validate()?;
        Ok(Self {
            shared: Arc::new(EngineShared {
                running:     AtomicBool::new(false),
                state:       Mutex::new(RunState { vehicles: BTreeMap::new(), params }),
                broadcaster: Mutex::new(Broadcaster::new()),
            }),
            routing,
            task: Mutex::new(None),
        })
    }

    // ── Sinks ─────────────────────────────────────────────────────────────

    pub async fn subscribe(&self, id: impl Into<String>, sink: Arc<dyn SnapshotSink>) {
        self.shared.broadcaster.lock().await.subscribe(id, sink);
    }

    pub async fn unsubscribe(&self, id: &str) -> bool {
        self.shared.broadcaster.lock().await.unsubscribe(id)
    }

    // ── Run control ───────────────────────────────────────────────────────

    /// Start a run for `assignments` out of `depot`, replacing any run in
    /// progress.
    ///
    /// Route geometry is fetched best-effort per vehicle before the first
    /// tick; the routing client's degradation contract means this never
    /// blocks a start on a dead routing service.  An empty batch succeeds
    /// and starts nothing.
    pub async fn start(&self, assignments: Vec<RouteAssignment>, depot: Point) -> SimResult<()> {
        self.stop().await;
        self.load_assignments(assignments, depot).await?;

        let vehicle_count = self.shared.state.lock().await.vehicles.len();
        if vehicle_count == 0 {
            info!("no assignments, nothing to simulate");
            return Ok(());
        }

        self.shared.running.store(true, Ordering::SeqCst);
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(run_loop(shared));
        *self.task.lock().await = Some(handle);

        info!(vehicles = vehicle_count, "simulation started");
        Ok(())
    }

    /// Build and install vehicle state for `assignments` without starting
    /// the loop.
    pub(crate) async fn load_assignments(
        &self,
        assignments: Vec<RouteAssignment>,
        depot: Point,
    ) -> SimResult<()> {
        let seed = self.shared.state.lock().await.params.seed;

        let mut vehicles = BTreeMap::new();
        for assignment in &assignments {
            let id = assignment.vehicle_id.clone();
            if vehicles.contains_key(&id) {
                return Err(SimError::DuplicateVehicle(id));
            }

            let mut route = VehicleRoute::from_assignment(assignment, &depot);
            let via: Vec<Point> = assignment
                .deliveries
                .iter()
                .map(|d| d.point.clone())
                .collect();
            route.geometry = Some(self.routing.route_geometry(&depot, &depot, &via).await);

            let cargo = assignment.total_cargo_kg();
            let state = VehicleState::at_depot(id.clone(), &depot, cargo);
            let rng = VehicleRng::new(seed, &id);
            debug!(vehicle = %id, stops = via.len(), cargo_kg = cargo, "vehicle loaded");
            vehicles.insert(id, VehicleSim { state, route, rng });
        }

        self.shared.state.lock().await.vehicles = vehicles;
        Ok(())
    }

    /// Stop the run in progress, if any.
    ///
    /// Waits for the loop task to exit, forces every unfinished vehicle to
    /// `Completed`, and publishes one terminal snapshot.  A loop that already
    /// finished naturally published its own terminal snapshot, so stopping
    /// an idle engine publishes nothing.
    pub async fn stop(&self) {
        let was_running = self.shared.running.swap(false, Ordering::SeqCst);
        if let Some(handle) = self.task.lock().await.take() {
            let _ = handle.await;
        }
        if !was_running {
            return;
        }

        let snapshot = {
            let mut run = self.shared.state.lock().await;
            for sim in run.vehicles.values_mut() {
                let state = &mut sim.state;
                if !state.is_completed() {
                    state.status = VehicleStatus::Completed;
                    state.progress_pct = 100.0;
                    state.speed_kmh = 0.0;
                    state.cargo_kg = 0.0;
                    state.hold_until = None;
                }
            }
            build_snapshot(&run.vehicles, false)
        };

        self.shared.broadcaster.lock().await.publish_snapshot(&snapshot).await;
        info!("simulation stopped");
    }

    /// Rescale simulated time mid-run.  Clamped to `[1, 1000]`.
    pub async fn set_speed_multiplier(&self, multiplier: f64) {
        let clamped = multiplier.clamp(1.0, 1_000.0);
        self.shared.state.lock().await.params.speed_multiplier = clamped;
        info!(multiplier = clamped, "speed multiplier updated");
    }

    // ── Introspection ─────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub async fn status(&self) -> EngineStatus {
        let run = self.shared.state.lock().await;
        let count = run.vehicles.len();
        let completed = run
            .vehicles
            .values()
            .filter(|v| v.state.is_completed())
            .count();
        let avg_progress = if count == 0 {
            0.0
        } else {
            run.vehicles.values().map(|v| v.state.progress_pct).sum::<f64>() / count as f64
        };
        let total_fuel = run.vehicles.values().map(|v| v.state.fuel_used_l).sum();

        EngineStatus {
            running:          self.is_running(),
            vehicle_count:    count,
            completed_count:  completed,
            avg_progress_pct: avg_progress,
            total_fuel_l:     total_fuel,
            speed_multiplier: run.params.speed_multiplier,
            tick_secs:        run.params.tick_secs(),
        }
    }

    /// A copy of every vehicle's full state, in id order.
    pub async fn vehicle_states(&self) -> Vec<VehicleState> {
        let run = self.shared.state.lock().await;
        run.vehicles.values().map(|v| v.state.clone()).collect()
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

async fn run_loop(shared: Arc<EngineShared>) {
    info!("simulation loop running");
    loop {
        let tick_started = Instant::now();
        if !shared.running.load(Ordering::SeqCst) {
            break;
        }

        let (snapshot, events, all_done, tick_interval) = {
            let mut run = shared.state.lock().await;
            let params = run.params.clone();
            let now = Instant::now();

            let mut events = Vec::new();
            for sim in run.vehicles.values_mut() {
                events.extend(advance_vehicle(
                    &mut sim.state,
                    &sim.route,
                    &mut sim.rng,
                    &params,
                    now,
                ));
            }

            let all_done = run.vehicles.values().all(|v| v.state.is_completed());
            let snapshot = build_snapshot(&run.vehicles, !all_done);
            (snapshot, events, all_done, params.tick_interval)
        };

        // Publish outside the state lock so slow sinks never block control
        // calls, only the tick cadence.
        {
            let mut broadcaster = shared.broadcaster.lock().await;
            for event in &events {
                broadcaster.publish_event(event).await;
            }
            broadcaster.publish_snapshot(&snapshot).await;
        }

        if all_done {
            shared.running.store(false, Ordering::SeqCst);
            info!("all routes completed, simulation loop exiting");
            break;
        }

        let elapsed = tick_started.elapsed();
        if let Some(remaining) = tick_interval.checked_sub(elapsed) {
            tokio::time::sleep(remaining).await;
        } else {
            debug!(
                elapsed_ms = elapsed.as_millis() as u64,
                "tick overran its interval"
            );
        }
    }
}

fn build_snapshot(vehicles: &BTreeMap<VehicleId, VehicleSim>, active: bool) -> Snapshot {
    Snapshot {
        timestamp:         unix_now(),
        vehicles:          vehicles.values().map(|v| v.state.record()).collect(),
        simulation_active: active,
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
