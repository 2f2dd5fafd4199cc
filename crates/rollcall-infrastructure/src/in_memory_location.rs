//! Deterministic location source backed by a map.

use async_trait::async_trait;
use rollcall_core::collaborator::LocationProvider;
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::geo::Coordinate;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// A [`LocationProvider`] that answers from a fixed table.
///
/// Participants without an entry fail to locate. An optional artificial
/// latency makes concurrent interleavings observable in tests and demos.
/// A per-participant latency overrides the provider-wide one.
#[derive(Debug, Default)]
pub struct InMemoryLocationProvider {
    positions: Mutex<HashMap<String, Coordinate>>,
    latency: Option<Duration>,
    latency_overrides: HashMap<String, Duration>,
}

impl InMemoryLocationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delays lookups for one participant only.
    pub fn with_latency_for(mut self, participant_id: impl Into<String>, latency: Duration) -> Self {
        self.latency_overrides.insert(participant_id.into(), latency);
        self
    }

    /// Builder-style variant of [`set_position`](Self::set_position).
    pub fn with_position(self, participant_id: impl Into<String>, position: Coordinate) -> Self {
        self.set_position(participant_id, position);
        self
    }

    pub fn set_position(&self, participant_id: impl Into<String>, position: Coordinate) {
        self.positions().insert(participant_id.into(), position);
    }

    /// Makes subsequent lookups for `participant_id` fail.
    pub fn forget(&self, participant_id: &str) {
        self.positions().remove(participant_id);
    }

    fn positions(&self) -> MutexGuard<'_, HashMap<String, Coordinate>> {
        self.positions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl LocationProvider for InMemoryLocationProvider {
    async fn locate(&self, participant_id: &str) -> Result<Coordinate> {
        let latency = self
            .latency_overrides
            .get(participant_id)
            .copied()
            .or(self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        self.positions()
            .get(participant_id)
            .copied()
            .ok_or_else(|| RollcallError::location(format!("no position for '{}'", participant_id)))
    }
}
