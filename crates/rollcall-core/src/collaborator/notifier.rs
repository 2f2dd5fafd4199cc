use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::report::Report;
use crate::session::{ChannelId, Session, SessionId};

/// Payload of a check-in invitation.
///
/// Carries the session id so the participant's reply can be routed back
/// to `check_in`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub session_id: SessionId,
    pub session_name: String,
    pub channel_id: ChannelId,
}

impl From<&Session> for Invitation {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id,
            session_name: session.name.clone(),
            channel_id: session.channel_id.clone(),
        }
    }
}

/// Outbound messaging capability.
///
/// All calls are fire-and-forget from the engine's point of view: a failure
/// is logged and counted but never rolls back engine state.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends a check-in invitation to one participant.
    async fn send_invite(&self, participant_id: &str, invitation: &Invitation) -> Result<()>;

    /// Sends a free-form update (e.g. "Alice checked in") to `target`.
    async fn send_update(&self, target: &str, content: &str) -> Result<()>;

    /// Delivers the final attendance report to the organizer.
    async fn send_summary(&self, organizer_id: &str, report: &Report) -> Result<()>;
}
