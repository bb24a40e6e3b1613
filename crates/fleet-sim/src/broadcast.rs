//! Snapshot fan-out to pluggable sinks.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::snapshot::{SimEvent, Snapshot};

/// A sink delivery failure.  The broadcaster drops the sink; it never retries.
#[derive(Debug, Error)]
#[error("sink rejected payload: {0}")]
pub struct SinkError(pub String);

/// A consumer of fleet snapshots (a websocket session, a recorder, a test
/// collector).  Implementations must be cheap per call; slow sinks delay the
/// tick they are called from.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn receive_snapshot(&self, snapshot: &Snapshot) -> Result<(), SinkError>;

    /// Discrete events.  Defaults to a no-op for sinks that only want state.
    async fn receive_event(&self, _event: &SimEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Registered sinks, keyed by caller-chosen ids.
///
/// A sink whose delivery fails is removed immediately so one dead consumer
/// cannot fail every subsequent tick.
#[derive(Default)]
pub struct Broadcaster {
    sinks: Vec<(String, Arc<dyn SnapshotSink>)>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `sink` under `id`, replacing any existing sink with that id.
    pub fn subscribe(&mut self, id: impl Into<String>, sink: Arc<dyn SnapshotSink>) {
        let id = id.into();
        self.sinks.retain(|(existing, _)| *existing != id);
        debug!(sink = %id, "sink subscribed");
        self.sinks.push((id, sink));
    }

    /// Remove the sink registered under `id`, if any.
    pub fn unsubscribe(&mut self, id: &str) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|(existing, _)| existing != id);
        self.sinks.len() < before
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Deliver `snapshot` to every sink, dropping sinks that fail.
    pub async fn publish_snapshot(&mut self, snapshot: &Snapshot) {
        let mut dead = Vec::new();
        for (id, sink) in &self.sinks {
            if let Err(err) = sink.receive_snapshot(snapshot).await {
                warn!(sink = %id, %err, "sink failed, dropping it");
                dead.push(id.clone());
            }
        }
        self.sinks.retain(|(id, _)| !dead.contains(id));
    }

    /// Deliver `event` to every sink, dropping sinks that fail.
    pub async fn publish_event(&mut self, event: &SimEvent) {
        let mut dead = Vec::new();
        for (id, sink) in &self.sinks {
            if let Err(err) = sink.receive_event(event).await {
                warn!(sink = %id, %err, "sink failed, dropping it");
                dead.push(id.clone());
            }
        }
        self.sinks.retain(|(id, _)| !dead.contains(id));
    }
}
