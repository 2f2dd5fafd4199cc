use async_trait::async_trait;

use crate::error::Result;

/// Resolves participant ids to human-readable names.
#[async_trait]
pub trait DirectoryLookup: Send + Sync {
    /// Returns the display name for `participant_id`.
    ///
    /// Failures never propagate out of the engine; callers substitute a
    /// placeholder name.
    async fn resolve(&self, participant_id: &str) -> Result<String>;
}
