use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::ledger::{AttendanceLedger, CheckInResult};
use super::model::{AttendanceRecord, Session, SessionId, SessionStatus};
use crate::config::validate_radius;
use crate::error::Result;
use crate::geo::Coordinate;

/// Mutable part of a session, guarded by the per-session lock.
#[derive(Debug)]
struct SessionState {
    status: SessionStatus,
    ledger: AttendanceLedger,
}

/// Shared handle to one live session.
///
/// The immutable session metadata is readable without locking. Status and
/// ledger sit behind a per-session mutex so that check-ins on different
/// sessions never contend. The lock is only held for in-memory mutation,
/// never across a collaborator call.
///
/// Every accessor returns `None` once the session has been closed, so a
/// caller holding a stale handle observes the same "not found" result as
/// one that looks the id up after removal.
#[derive(Debug)]
pub struct SessionHandle {
    session: Session,
    state: Mutex<SessionState>,
}

impl SessionHandle {
    fn new(session: Session) -> Self {
        Self {
            session,
            state: Mutex::new(SessionState {
                status: SessionStatus::Active,
                ledger: AttendanceLedger::new(),
            }),
        }
    }

    /// Session metadata as captured at creation.
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn id(&self) -> SessionId {
        self.session.id
    }

    pub async fn is_present(&self, participant_id: &str) -> Option<bool> {
        let state = self.state.lock().await;
        (state.status == SessionStatus::Active).then(|| state.ledger.contains(participant_id))
    }

    /// Atomically records a check-in if the session is still active.
    pub async fn try_check_in(
        &self,
        participant_id: &str,
        at: DateTime<Utc>,
    ) -> Option<CheckInResult> {
        let mut state = self.state.lock().await;
        if state.status != SessionStatus::Active {
            return None;
        }
        Some(state.ledger.try_check_in(participant_id, at))
    }

    /// False once the session has been closed, even if it is still in the map.
    pub async fn is_active(&self) -> bool {
        self.state.lock().await.status == SessionStatus::Active
    }

    pub async fn count(&self) -> Option<usize> {
        let state = self.state.lock().await;
        (state.status == SessionStatus::Active).then(|| state.ledger.count())
    }

    /// Point-in-time copy of the ledger in check-in order.
    pub async fn snapshot(&self) -> Option<Vec<AttendanceRecord>> {
        let state = self.state.lock().await;
        (state.status == SessionStatus::Active).then(|| state.ledger.snapshot())
    }

    /// Transitions the session to `Ended` and returns the final roster.
    ///
    /// Only the first caller gets `Some`; the status flip and the final
    /// snapshot happen under one lock acquisition, so no check-in can land
    /// after the snapshot.
    async fn close(&self) -> Option<(Session, Vec<AttendanceRecord>)> {
        let mut state = self.state.lock().await;
        if state.status != SessionStatus::Active {
            return None;
        }
        state.status = SessionStatus::Ended;

        let mut session = self.session.clone();
        session.status = SessionStatus::Ended;
        Some((session, state.ledger.snapshot()))
    }
}

/// Registry of live sessions keyed by id.
///
/// `SessionStore` is an explicit object rather than a process-wide
/// singleton; independent stores can coexist in one process.
///
/// The outer map lock is held only for insert, lookup, and removal. All
/// per-session state is synchronized by the [`SessionHandle`] itself.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers a new `Active` session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `radius_meters` is not a positive finite number.
    pub async fn create(
        &self,
        organizer_id: impl Into<String>,
        channel_id: impl Into<String>,
        name: impl Into<String>,
        anchor: Coordinate,
        radius_meters: f64,
    ) -> Result<Session> {
        validate_radius(radius_meters)?;

        let session = Session {
            id: SessionId::new(),
            organizer_id: organizer_id.into(),
            channel_id: channel_id.into(),
            name: name.into(),
            anchor,
            radius_meters,
            started_at: Utc::now(),
            status: SessionStatus::Active,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id, Arc::new(SessionHandle::new(session.clone())));

        tracing::debug!(
            target: "rollcall::store",
            session_id = %session.id,
            live_sessions = sessions.len(),
            "session registered"
        );

        Ok(session)
    }

    /// Returns the session metadata, or `None` if absent or ended.
    pub async fn get(&self, id: &SessionId) -> Option<Session> {
        self.handle(id).await.map(|h| h.session().clone())
    }

    /// Returns the shared handle for per-session operations.
    pub async fn handle(&self, id: &SessionId) -> Option<Arc<SessionHandle>> {
        let sessions = self.sessions.read().await;
        sessions.get(id).cloned()
    }

    /// Drops the session and its ledger. Removing an absent id is a no-op.
    pub async fn remove(&self, id: &SessionId) {
        let handle = {
            let mut sessions = self.sessions.write().await;
            sessions.remove(id)
        };

        // Stale handles held by in-flight operations must see the session as gone.
        if let Some(handle) = handle {
            handle.close().await;
        }
    }

    /// Ends the session and removes it from the store.
    ///
    /// Returns the ended session together with its final roster, or `None`
    /// if the session was absent or another caller ended it first.
    pub async fn end(&self, id: &SessionId) -> Option<(Session, Vec<AttendanceRecord>)> {
        let handle = self.handle(id).await?;

        // Unregister before closing so listings never show an ended session.
        {
            let mut sessions = self.sessions.write().await;
            if sessions.get(id).is_some_and(|h| Arc::ptr_eq(h, &handle)) {
                sessions.remove(id);
            }
        }

        handle.close().await
    }

    /// Active sessions announced in `channel_id`, oldest first.
    pub async fn list_active(&self, channel_id: &str) -> Vec<Session> {
        let candidates: Vec<Arc<SessionHandle>> = {
            let sessions = self.sessions.read().await;
            sessions
                .values()
                .filter(|h| h.session().channel_id == channel_id)
                .cloned()
                .collect()
        };

        let mut found = Vec::with_capacity(candidates.len());
        for handle in candidates {
            if handle.is_active().await {
                found.push(handle.session().clone());
            }
        }
        found.sort_by_key(|s| s.started_at);
        found
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
