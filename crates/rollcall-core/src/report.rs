//! Attendance reports.
//!
//! A report is a read-only summary derived from session metadata and a
//! ledger snapshot. Building one never mutates engine state.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::collaborator::DirectoryLookup;
use crate::config::UNKNOWN_PARTICIPANT_NAME;
use crate::session::{AttendanceRecord, ParticipantId, Session, SessionId};

/// One attendee line in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub check_in_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub session_id: SessionId,
    pub session_name: String,
    pub organizer_id: ParticipantId,
    pub started_at: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub attendee_count: usize,
    /// Attendees in check-in order.
    pub attendees: Vec<ReportEntry>,
}

impl Report {
    /// Plain-text rendering suitable for a chat message.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{}: {} attendee(s), running {} min",
            self.session_name, self.attendee_count, self.duration_minutes
        );
        for (index, entry) in self.attendees.iter().enumerate() {
            out.push_str(&format!(
                "\n{}. {} ({})",
                index + 1,
                entry.display_name,
                entry.check_in_time.format("%H:%M:%S UTC")
            ));
        }
        out
    }
}

/// Whole minutes between `started_at` and `now`, rounded half away from zero.
///
/// Clock skew that puts `now` before `started_at` yields 0.
pub fn duration_minutes(started_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (now - started_at).num_milliseconds().max(0);
    (millis as f64 / 60_000.0).round() as i64
}

/// Builds reports, resolving display names through a [`DirectoryLookup`].
#[derive(Clone)]
pub struct ReportBuilder {
    directory: Arc<dyn DirectoryLookup>,
    placeholder_name: String,
}

impl ReportBuilder {
    pub fn new(directory: Arc<dyn DirectoryLookup>) -> Self {
        Self {
            directory,
            placeholder_name: UNKNOWN_PARTICIPANT_NAME.to_string(),
        }
    }

    /// Overrides the name shown when a lookup fails.
    pub fn with_placeholder_name(mut self, placeholder_name: impl Into<String>) -> Self {
        self.placeholder_name = placeholder_name.into();
        self
    }

    /// Builds a report for `session` from `snapshot` as of `now`.
    ///
    /// Name lookups run concurrently; entry order follows `snapshot`.
    pub async fn build(
        &self,
        session: &Session,
        snapshot: &[AttendanceRecord],
        now: DateTime<Utc>,
    ) -> Report {
        let lookups = snapshot.iter().map(|record| async move {
            let display_name = match self.directory.resolve(&record.participant_id).await {
                Ok(name) => name,
                Err(e) => {
                    tracing::warn!(
                        target: "rollcall::report",
                        participant_id = %record.participant_id,
                        error = %e,
                        "directory lookup failed, using placeholder"
                    );
                    self.placeholder_name.clone()
                }
            };
            ReportEntry {
                participant_id: record.participant_id.clone(),
                display_name,
                check_in_time: record.check_in_time,
            }
        });
        let attendees = join_all(lookups).await;

        Report {
            session_id: session.id,
            session_name: session.name.clone(),
            organizer_id: session.organizer_id.clone(),
            started_at: session.started_at,
            generated_at: now,
            duration_minutes: duration_minutes(session.started_at, now),
            attendee_count: attendees.len(),
            attendees,
        }
    }
}
