//! Session domain model.
//!
//! A session is created by its organizer at a fixed anchor coordinate and
//! lives in memory until it is ended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::RollcallError;
use crate::geo::Coordinate;

/// Identity of a person (organizer or participant) as known to the chat platform.
pub type ParticipantId = String;

/// Destination handle of the channel a session was announced in.
pub type ChannelId = String;

/// Opaque, unique handle for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = RollcallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| RollcallError::invalid_input(format!("malformed session id '{}'", s)))
    }
}

/// Lifecycle state of a session. `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Ended,
}

/// An attendance-taking session.
///
/// All fields except `status` are fixed at creation. The anchor is not
/// re-centered if the organizer moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub organizer_id: ParticipantId,
    pub channel_id: ChannelId,
    pub name: String,
    pub anchor: Coordinate,
    pub radius_meters: f64,
    pub started_at: DateTime<Utc>,
    pub status: SessionStatus,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Whether `actor` may view the full roster or end the session.
    pub fn is_organizer(&self, actor: &str) -> bool {
        self.organizer_id == actor
    }
}

/// First successful check-in of one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub participant_id: ParticipantId,
    pub check_in_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique() {
        let ids: std::collections::HashSet<SessionId> = (0..1000).map(|_| SessionId::new()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_session_id_round_trips_through_display() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_malformed_session_id() {
        let err = "not-a-uuid".parse::<SessionId>().unwrap_err();
        assert!(matches!(err, RollcallError::InvalidInput(_)));
    }
}
