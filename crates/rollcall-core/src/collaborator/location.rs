use async_trait::async_trait;

use crate::error::Result;
use crate::geo::Coordinate;

/// Source of participant positions (GPS, beacon, manual entry).
///
/// Implementations are expected to return or fail within a bounded time.
/// The engine trusts whatever coordinate is returned.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Returns the current position of `participant_id`.
    ///
    /// # Returns
    ///
    /// - `Ok(Coordinate)`: A fresh position
    /// - `Err(_)`: The position could not be obtained; the participant is
    ///   excluded from the current operation
    async fn locate(&self, participant_id: &str) -> Result<Coordinate>;
}
