//! Notifier that records outbound messages instead of delivering them.

use async_trait::async_trait;
use rollcall_core::collaborator::{Invitation, Notifier};
use rollcall_core::error::{Result, RollcallError};
use rollcall_core::report::Report;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;

/// A message captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq)]
pub enum SentMessage {
    Invite {
        participant_id: String,
        invitation: Invitation,
    },
    Update {
        target: String,
        content: String,
    },
    Summary {
        organizer_id: String,
        report: Report,
    },
}

#[derive(Debug, Default)]
struct Outbox {
    sent: Vec<SentMessage>,
    unreachable: HashSet<String>,
}

/// A [`Notifier`] that keeps every delivered message in memory.
///
/// Recipients marked unreachable make every call addressed to them fail,
/// which exercises failure isolation in the fan-out.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    outbox: Mutex<Outbox>,
    delivered: Notify,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unreachable(&self, recipient: impl Into<String>) {
        self.outbox().unreachable.insert(recipient.into());
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.outbox().sent.clone()
    }

    /// Participants who received an invitation, in delivery order.
    pub fn invited(&self) -> Vec<String> {
        self.outbox()
            .sent
            .iter()
            .filter_map(|m| match m {
                SentMessage::Invite { participant_id, .. } => Some(participant_id.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<(String, String)> {
        self.outbox()
            .sent
            .iter()
            .filter_map(|m| match m {
                SentMessage::Update { target, content } => Some((target.clone(), content.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn summaries(&self) -> Vec<Report> {
        self.outbox()
            .sent
            .iter()
            .filter_map(|m| match m {
                SentMessage::Summary { report, .. } => Some(report.clone()),
                _ => None,
            })
            .collect()
    }

    /// Waits until at least `count` updates were recorded or `timeout` passes.
    ///
    /// Updates are sent from detached tasks, so callers that assert on them
    /// need to wait.
    pub async fn wait_for_updates(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.delivered.notified();
            if self.updates().len() >= count {
                return true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.updates().len() >= count;
            }
        }
    }

    fn outbox(&self) -> MutexGuard<'_, Outbox> {
        self.outbox.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, recipient: &str, message: SentMessage) -> Result<()> {
        {
            let mut outbox = self.outbox();
            if outbox.unreachable.contains(recipient) {
                return Err(RollcallError::notification(format!(
                    "'{}' is unreachable",
                    recipient
                )));
            }
            outbox.sent.push(message);
        }
        self.delivered.notify_waiters();
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_invite(&self, participant_id: &str, invitation: &Invitation) -> Result<()> {
        self.record(
            participant_id,
            SentMessage::Invite {
                participant_id: participant_id.to_string(),
                invitation: invitation.clone(),
            },
        )
    }

    async fn send_update(&self, target: &str, content: &str) -> Result<()> {
        self.record(
            target,
            SentMessage::Update {
                target: target.to_string(),
                content: content.to_string(),
            },
        )
    }

    async fn send_summary(&self, organizer_id: &str, report: &Report) -> Result<()> {
        self.record(
            organizer_id,
            SentMessage::Summary {
                organizer_id: organizer_id.to_string(),
                report: report.clone(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::session::SessionId;

    fn invitation() -> Invitation {
        Invitation {
            session_id: SessionId::new(),
            session_name: "Standup".to_string(),
            channel_id: "chan".to_string(),
        }
    }

    #[tokio::test]
    async fn test_records_and_rejects_unreachable() {
        let notifier = RecordingNotifier::new();
        notifier.set_unreachable("bob");

        notifier.send_invite("alice", &invitation()).await.unwrap();
        let err = notifier.send_invite("bob", &invitation()).await.unwrap_err();

        assert!(err.is_collaborator_failure());
        assert_eq!(notifier.invited(), vec!["alice".to_string()]);
    }

    #[tokio::test]
    async fn test_wait_for_updates() {
        let notifier = std::sync::Arc::new(RecordingNotifier::new());
        assert!(!notifier.wait_for_updates(1, Duration::from_millis(10)).await);

        let sender = notifier.clone();
        tokio::spawn(async move {
            sender.send_update("org", "alice checked in").await.unwrap();
        });

        assert!(notifier.wait_for_updates(1, Duration::from_secs(2)).await);
        assert_eq!(
            notifier.updates(),
            vec![("org".to_string(), "alice checked in".to_string())]
        );
    }
}
