//! Discriminated results returned by the session lifecycle.
//!
//! Every expected branch of normal operation is a variant here, so callers
//! can render a response without inspecting errors.

use rollcall_core::report::Report;
use rollcall_core::session::{AttendanceRecord, ParticipantId, Session};
use serde::Serialize;

/// Input to [`SessionLifecycle::start`](crate::SessionLifecycle::start).
#[derive(Debug, Clone, Default)]
pub struct StartRequest {
    pub organizer_id: ParticipantId,
    pub channel_id: String,
    /// Falls back to the configured default name.
    pub name: Option<String>,
    /// Falls back to the configured default radius.
    pub radius_meters: Option<f64>,
    /// People to consider for an invitation, typically the channel members.
    pub candidates: Vec<ParticipantId>,
}

impl StartRequest {
    pub fn new(organizer_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            organizer_id: organizer_id.into(),
            channel_id: channel_id.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_radius(mut self, radius_meters: f64) -> Self {
        self.radius_meters = Some(radius_meters);
        self
    }

    pub fn with_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates = candidates.into_iter().map(Into::into).collect();
        self
    }
}

/// Tally of an invitation fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FanOutSummary {
    /// Candidates in range whose invitation was delivered.
    pub notified: usize,
    /// Candidates located outside the geofence.
    pub out_of_range: usize,
    /// Candidates skipped because locating or notifying them failed.
    pub failed: usize,
}

impl FanOutSummary {
    pub fn evaluated(&self) -> usize {
        self.notified + self.out_of_range + self.failed
    }
}

/// A freshly started session together with its fan-out tally.
#[derive(Debug, Clone)]
pub struct StartedSession {
    pub session: Session,
    pub fan_out: FanOutSummary,
}

impl StartedSession {
    pub fn notified(&self) -> usize {
        self.fan_out.notified
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckInOutcome {
    /// First successful check-in for this participant.
    CheckedIn(AttendanceRecord),
    /// The participant was already recorded; nothing changed.
    AlreadyPresent,
    /// The participant is outside the geofence; nothing was recorded.
    OutOfRange { distance_meters: f64 },
    /// The participant's position could not be obtained; nothing was recorded.
    LocationUnavailable,
    /// The session does not exist or has ended.
    NotFound,
}

/// Result of a privileged, organizer-only action.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Report(Report),
    NotFound,
    Unauthorized,
}

impl ReportOutcome {
    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Report(report) => Some(report),
            _ => None,
        }
    }
}
