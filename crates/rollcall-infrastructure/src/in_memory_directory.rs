//! Display-name directory backed by a map.

use async_trait::async_trait;
use rollcall_core::collaborator::DirectoryLookup;
use rollcall_core::error::{Result, RollcallError};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    names: Mutex<HashMap<String, String>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(self, participant_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.insert(participant_id, display_name);
        self
    }

    pub fn insert(&self, participant_id: impl Into<String>, display_name: impl Into<String>) {
        self.names().insert(participant_id.into(), display_name.into());
    }

    fn names(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.names.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DirectoryLookup for InMemoryDirectory {
    async fn resolve(&self, participant_id: &str) -> Result<String> {
        self.names()
            .get(participant_id)
            .cloned()
            .ok_or_else(|| RollcallError::directory(format!("unknown participant '{}'", participant_id)))
    }
}
