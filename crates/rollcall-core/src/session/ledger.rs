//! Per-session attendance ledger.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::model::{AttendanceRecord, ParticipantId};

/// Result of a check-in attempt against the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckInResult {
    /// The participant was recorded for the first time.
    Inserted(AttendanceRecord),
    /// The participant already had a record; nothing was changed.
    AlreadyPresent,
}

/// Ordered mapping of participant to first check-in time.
///
/// The ledger itself is not synchronized. It is owned by a
/// [`SessionHandle`](super::store::SessionHandle), whose lock makes
/// `try_check_in` atomic per session.
#[derive(Debug, Default, Clone)]
pub struct AttendanceLedger {
    records: Vec<AttendanceRecord>,
    present: HashSet<ParticipantId>,
}

impl AttendanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `participant_id` at `at` unless it is already present.
    ///
    /// An existing record is never overwritten.
    pub fn try_check_in(&mut self, participant_id: &str, at: DateTime<Utc>) -> CheckInResult {
        if !self.present.insert(participant_id.to_string()) {
            return CheckInResult::AlreadyPresent;
        }

        let record = AttendanceRecord {
            participant_id: participant_id.to_string(),
            check_in_time: at,
        };
        self.records.push(record.clone());
        CheckInResult::Inserted(record)
    }

    pub fn contains(&self, participant_id: &str) -> bool {
        self.present.contains(participant_id)
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Records in insertion order.
    pub fn snapshot(&self) -> Vec<AttendanceRecord> {
        self.records.clone()
    }
}
