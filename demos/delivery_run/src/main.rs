//! End-to-end demo: a three-vehicle fleet delivering around Istanbul.
//!
//! Snapshots and events are printed to stdout as JSON lines.  Works offline;
//! with no reachable routing service every route falls back to straight-line
//! geometry and great-circle distances.
//!
//! Run with `RUST_LOG=info cargo run -p delivery_run`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fleet_core::Point;
use fleet_routing::{RoutingClient, RoutingConfig};
use fleet_sim::{
    RouteAssignment, SimEvent, SimParams, SimulationEngine, SinkError, Snapshot, SnapshotSink,
};
use tracing::info;

/// Prints every payload as one JSON line.
struct StdoutSink;

#[async_trait]
impl SnapshotSink for StdoutSink {
    async fn receive_snapshot(&self, snapshot: &Snapshot) -> Result<(), SinkError> {
        let line = serde_json::to_string(snapshot).map_err(|e| SinkError(e.to_string()))?;
        println!("{line}");
        Ok(())
    }

    async fn receive_event(&self, event: &SimEvent) -> Result<(), SinkError> {
        let line = serde_json::to_string(event).map_err(|e| SinkError(e.to_string()))?;
        println!("{line}");
        Ok(())
    }
}

fn fleet() -> Vec<RouteAssignment> {
    vec![
        RouteAssignment::new("van-1")
            .with_delivery(Point::stop(41.0200, 29.0000, "kadikoy", 120.0))
            .with_delivery(Point::stop(41.0350, 29.0150, "uskudar", 80.0)),
        RouteAssignment::new("van-2")
            .with_delivery(Point::stop(41.0055, 28.9500, "fatih", 200.0)),
        RouteAssignment::new("van-3")
            .with_delivery(Point::stop(41.0430, 28.9770, "sisli", 60.0))
            .with_delivery(Point::stop(41.0600, 28.9870, "levent", 90.0))
            .with_delivery(Point::stop(41.0820, 29.0100, "maslak", 45.0)),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let routing = Arc::new(RoutingClient::new(RoutingConfig::default()));
    let params = SimParams {
        tick_interval:    Duration::from_millis(500),
        speed_multiplier: 200.0,
        seed:             7,
        ..SimParams::default()
    };

    let engine = SimulationEngine::new(routing, params)?;
    engine.subscribe("stdout", Arc::new(StdoutSink)).await;
    let depot = Point::stop(41.0082, 28.9784, "depot", 0.0);
    engine.start(fleet(), depot).await?;

    // Let the run play out, reporting status along the way.
    for _ in 0..60 {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let status = engine.status().await;
        let avg_progress = format!("{:.1}%", status.avg_progress_pct);
        let fuel = format!("{:.2} L", status.total_fuel_l);
        info!(
            running = status.running,
            completed = status.completed_count,
            avg_progress = %avg_progress,
            fuel = %fuel,
            "fleet status"
        );
        if !status.running {
            break;
        }
    }

    engine.stop().await;
    Ok(())
}
