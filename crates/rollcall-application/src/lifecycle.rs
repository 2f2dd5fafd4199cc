//! Session lifecycle use case.
//!
//! Orchestrates start, check-in, attendance viewing, and ending of sessions
//! on top of the `SessionStore` and the external collaborators.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use rollcall_core::collaborator::{DirectoryLookup, Invitation, LocationProvider, Notifier};
use rollcall_core::config::AttendanceSettings;
use rollcall_core::error::Result;
use rollcall_core::proximity;
use rollcall_core::report::{Report, ReportBuilder};
use rollcall_core::session::{CheckInResult, Session, SessionId, SessionStore};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::outcome::{CheckInOutcome, FanOutSummary, ReportOutcome, StartRequest, StartedSession};

/// Per-candidate result of the invitation fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Invite {
    Sent,
    OutOfRange,
    Failed,
}

/// Runs `fut` under the optional collaborator deadline.
async fn with_deadline<T>(
    deadline: Option<Duration>,
    operation: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| rollcall_core::RollcallError::timeout(operation))?,
        None => fut.await,
    }
}

/// Drives sessions through `start -> check_in* -> end`.
///
/// `SessionLifecycle` is responsible for:
/// - Creating sessions anchored at the organizer's position
/// - Inviting in-range candidates concurrently, isolating per-candidate failures
/// - Re-verifying proximity at every check-in
/// - Restricting roster views and ending to the organizer
///
/// # Thread Safety
///
/// All operations take `&self` and may run concurrently. No lock is held
/// while a collaborator is being called.
pub struct SessionLifecycle {
    store: Arc<SessionStore>,
    locations: Arc<dyn LocationProvider>,
    notifier: Arc<dyn Notifier>,
    reports: ReportBuilder,
    settings: AttendanceSettings,
}

impl SessionLifecycle {
    /// Creates a lifecycle with default settings.
    ///
    /// # Arguments
    ///
    /// * `store` - Registry the sessions live in
    /// * `locations` - Source of organizer and participant positions
    /// * `directory` - Display-name resolution for reports
    /// * `notifier` - Outbound invitations, updates, and summaries
    pub fn new(
        store: Arc<SessionStore>,
        locations: Arc<dyn LocationProvider>,
        directory: Arc<dyn DirectoryLookup>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            locations,
            notifier,
            reports: ReportBuilder::new(directory),
            settings: AttendanceSettings::default(),
        }
    }

    /// Replaces the settings after validating them.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the settings are invalid; nothing is replaced.
    pub fn with_settings(mut self, settings: AttendanceSettings) -> Result<Self> {
        settings.validate()?;
        self.reports = self
            .reports
            .with_placeholder_name(settings.unknown_participant_name.clone());
        self.settings = settings;
        Ok(self)
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn settings(&self) -> &AttendanceSettings {
        &self.settings
    }

    /// Starts a session at the organizer's current position and invites
    /// every candidate within range.
    ///
    /// The organizer and duplicate candidate ids are skipped. Candidate
    /// failures are counted in the summary and never abort the fan-out.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the radius is not positive
    /// - `Location` / `Timeout` if the organizer cannot be located; no
    ///   session is created in that case
    pub async fn start(&self, request: StartRequest) -> Result<StartedSession> {
        let radius_meters = request
            .radius_meters
            .unwrap_or(self.settings.default_radius_meters);
        rollcall_core::config::validate_radius(radius_meters)?;

        let anchor = with_deadline(
            self.settings.collaborator_timeout(),
            "locate organizer",
            self.locations.locate(&request.organizer_id),
        )
        .await?;

        let name = request
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.settings.default_session_name.clone());

        let session = self
            .store
            .create(
                request.organizer_id.clone(),
                request.channel_id,
                name,
                anchor,
                radius_meters,
            )
            .await?;

        tracing::info!(
            target: "rollcall::lifecycle",
            session_id = %session.id,
            organizer_id = %session.organizer_id,
            radius_m = session.radius_meters,
            "session started"
        );

        let fan_out = self.fan_out(&session, request.candidates).await;

        tracing::info!(
            target: "rollcall::lifecycle",
            session_id = %session.id,
            notified = fan_out.notified,
            out_of_range = fan_out.out_of_range,
            failed = fan_out.failed,
            "invitation fan-out complete"
        );

        Ok(StartedSession { session, fan_out })
    }

    async fn fan_out(&self, session: &Session, candidates: Vec<String>) -> FanOutSummary {
        let mut seen = HashSet::new();
        let candidates: Vec<String> = candidates
            .into_iter()
            .filter(|c| !session.is_organizer(c))
            .filter(|c| seen.insert(c.clone()))
            .collect();

        let invitation = Invitation::from(session);
        let results: Vec<Invite> = stream::iter(candidates)
            .map(|candidate| {
                let invitation = &invitation;
                async move { self.invite_candidate(session, &candidate, invitation).await }
            })
            .buffer_unordered(self.settings.max_concurrent_invites)
            .collect()
            .await;

        results
            .into_iter()
            .fold(FanOutSummary::default(), |mut summary, result| {
                match result {
                    Invite::Sent => summary.notified += 1,
                    Invite::OutOfRange => summary.out_of_range += 1,
                    Invite::Failed => summary.failed += 1,
                }
                summary
            })
    }

    async fn invite_candidate(
        &self,
        session: &Session,
        candidate: &str,
        invitation: &Invitation,
    ) -> Invite {
        let deadline = self.settings.collaborator_timeout();

        let position = match with_deadline(deadline, "locate", self.locations.locate(candidate)).await {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!(
                    target: "rollcall::lifecycle",
                    session_id = %session.id,
                    participant_id = %candidate,
                    error = %e,
                    "could not locate candidate, skipping"
                );
                return Invite::Failed;
            }
        };

        let check = proximity::evaluate(session, position);
        tracing::debug!(
            target: "rollcall::lifecycle",
            session_id = %session.id,
            participant_id = %candidate,
            distance_m = check.distance_meters,
            within_range = check.within_range,
            "candidate evaluated"
        );
        if !check.within_range {
            return Invite::OutOfRange;
        }

        match with_deadline(
            deadline,
            "send invite",
            self.notifier.send_invite(candidate, invitation),
        )
        .await
        {
            Ok(()) => Invite::Sent,
            Err(e) => {
                tracing::warn!(
                    target: "rollcall::lifecycle",
                    session_id = %session.id,
                    participant_id = %candidate,
                    error = %e,
                    "invitation delivery failed"
                );
                Invite::Failed
            }
        }
    }

    /// Records `participant_id` as present if they are within the geofence.
    ///
    /// Having received an invitation is neither required nor sufficient:
    /// proximity is always re-checked against the participant's current
    /// position.
    pub async fn check_in(&self, session_id: &SessionId, participant_id: &str) -> CheckInOutcome {
        let Some(handle) = self.store.handle(session_id).await else {
            return CheckInOutcome::NotFound;
        };

        match handle.is_present(participant_id).await {
            None => return CheckInOutcome::NotFound,
            Some(true) => return CheckInOutcome::AlreadyPresent,
            Some(false) => {}
        }

        let position = match with_deadline(
            self.settings.collaborator_timeout(),
            "locate",
            self.locations.locate(participant_id),
        )
        .await
        {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!(
                    target: "rollcall::lifecycle",
                    session_id = %session_id,
                    participant_id = %participant_id,
                    error = %e,
                    "check-in rejected, location unavailable"
                );
                return CheckInOutcome::LocationUnavailable;
            }
        };

        let session = handle.session();
        let check = proximity::evaluate(session, position);
        if !check.within_range {
            tracing::info!(
                target: "rollcall::lifecycle",
                session_id = %session_id,
                participant_id = %participant_id,
                distance_m = check.distance_meters,
                "check-in rejected, out of range"
            );
            return CheckInOutcome::OutOfRange {
                distance_meters: check.distance_meters,
            };
        }

        let record = match handle.try_check_in(participant_id, Utc::now()).await {
            None => return CheckInOutcome::NotFound,
            Some(CheckInResult::AlreadyPresent) => return CheckInOutcome::AlreadyPresent,
            Some(CheckInResult::Inserted(record)) => record,
        };

        tracing::info!(
            target: "rollcall::lifecycle",
            session_id = %session_id,
            participant_id = %participant_id,
            distance_m = check.distance_meters,
            "participant checked in"
        );

        self.notify_organizer_of_check_in(session, participant_id);

        CheckInOutcome::CheckedIn(record)
    }

    /// Tells the organizer about a new check-in without waiting for delivery.
    fn notify_organizer_of_check_in(&self, session: &Session, participant_id: &str) {
        let notifier = self.notifier.clone();
        let deadline = self.settings.collaborator_timeout();
        let organizer_id = session.organizer_id.clone();
        let session_id = session.id;
        let content = format!("{} checked in to {}", participant_id, session.name);

        tokio::spawn(async move {
            if let Err(e) = with_deadline(
                deadline,
                "send update",
                notifier.send_update(&organizer_id, &content),
            )
            .await
            {
                tracing::warn!(
                    target: "rollcall::lifecycle",
                    session_id = %session_id,
                    error = %e,
                    "organizer check-in update failed"
                );
            }
        });
    }

    /// Builds the current roster for the organizer without changing state.
    pub async fn view_attendance(&self, session_id: &SessionId, requester_id: &str) -> ReportOutcome {
        let Some(handle) = self.store.handle(session_id).await else {
            return ReportOutcome::NotFound;
        };

        let session = handle.session();
        if !session.is_organizer(requester_id) {
            tracing::info!(
                target: "rollcall::lifecycle",
                session_id = %session_id,
                requester_id = %requester_id,
                "attendance view denied"
            );
            return ReportOutcome::Unauthorized;
        }

        let Some(snapshot) = handle.snapshot().await else {
            return ReportOutcome::NotFound;
        };

        ReportOutcome::Report(self.reports.build(session, &snapshot, Utc::now()).await)
    }

    /// Ends the session, removes it from the store, and sends the organizer
    /// the final summary.
    ///
    /// Any later operation on the same id yields `NotFound`.
    pub async fn end(&self, session_id: &SessionId, requester_id: &str) -> ReportOutcome {
        let Some(session) = self.store.get(session_id).await else {
            return ReportOutcome::NotFound;
        };

        if !session.is_organizer(requester_id) {
            tracing::info!(
                target: "rollcall::lifecycle",
                session_id = %session_id,
                requester_id = %requester_id,
                "end denied"
            );
            return ReportOutcome::Unauthorized;
        }

        let Some((ended, roster)) = self.store.end(session_id).await else {
            return ReportOutcome::NotFound;
        };

        let report = self.reports.build(&ended, &roster, Utc::now()).await;

        tracing::info!(
            target: "rollcall::lifecycle",
            session_id = %session_id,
            attendees = report.attendee_count,
            duration_min = report.duration_minutes,
            "session ended"
        );

        self.send_summary(&ended, &report).await;

        ReportOutcome::Report(report)
    }

    async fn send_summary(&self, session: &Session, report: &Report) {
        if let Err(e) = with_deadline(
            self.settings.collaborator_timeout(),
            "send summary",
            self.notifier.send_summary(&session.organizer_id, report),
        )
        .await
        {
            tracing::warn!(
                target: "rollcall::lifecycle",
                session_id = %session.id,
                error = %e,
                "final summary delivery failed"
            );
        }
    }

    /// Live sessions announced in `channel_id`.
    pub async fn active_sessions(&self, channel_id: &str) -> Vec<Session> {
        self.store.list_active(channel_id).await
    }
}
