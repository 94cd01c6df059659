use std::{fmt, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    domain::{Identity, Mood, ObjectId},
    protocol::{CallTarget, MoveCall, VoteRequest},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

pub mod error;
pub mod executor;
mod session;
pub use error::VoteError;
pub use executor::{DryRunExecutor, WalletBridgeExecutor};
pub use session::WalletSession;

const NOTIFICATION_CAPACITY: usize = 64;

/// Source of the currently connected wallet account. Read fresh on every
/// submission; connect and disconnect happen outside the controller.
pub trait SessionContext: Send + Sync {
    fn current_identity(&self) -> Option<Identity>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub digest: String,
}

/// Signs and submits a move call. Single-shot: resolves once with either a
/// success or an error, never retried by the caller.
#[async_trait]
pub trait TransactionExecutor: Send + Sync {
    async fn execute(&self, sender: &Identity, call: MoveCall) -> Result<ExecutionOutcome>;
}

/// Locally known vote counts, one per mood. Not read back from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoteTally([u64; Mood::COUNT]);

impl VoteTally {
    pub fn count(&self, mood: Mood) -> u64 {
        self.0[usize::from(mood.index())]
    }

    pub fn counts(&self) -> [u64; Mood::COUNT] {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Mood, u64)> + '_ {
        Mood::ALL.into_iter().map(|mood| (mood, self.count(mood)))
    }

    fn record(&mut self, mood: Mood) {
        let slot = &mut self.0[usize::from(mood.index())];
        *slot = slot.saturating_add(1);
    }
}

impl fmt::Display for VoteTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, (mood, count)) in self.iter().enumerate() {
            if position > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{mood}: {count}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    VoteSubmitted { mood: Mood, tally: VoteTally },
    AuthenticationRequired,
    VoteFailed { mood: Mood, message: String },
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Notification::VoteSubmitted { .. } => "Mood submitted!",
            Notification::AuthenticationRequired => "Please connect your wallet first!",
            Notification::VoteFailed { message, .. } => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteReceipt {
    pub mood: Mood,
    pub digest: String,
    pub tally: VoteTally,
    pub submitted_at: DateTime<Utc>,
}

/// Turns a mood selection into one `submit_mood` call and applies the outcome
/// to the local tally.
///
/// Submissions are not serialized: two votes in flight both reach the
/// executor, and each success is applied when it completes, so the tally
/// reflects completion order rather than click order.
pub struct VoteController {
    session: Arc<dyn SessionContext>,
    executor: Arc<dyn TransactionExecutor>,
    target: CallTarget,
    board: ObjectId,
    tally: Mutex<VoteTally>,
    notifications: broadcast::Sender<Notification>,
}

impl VoteController {
    pub fn new(
        session: Arc<dyn SessionContext>,
        executor: Arc<dyn TransactionExecutor>,
        target: CallTarget,
        board: ObjectId,
    ) -> Arc<Self> {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Arc::new(Self {
            session,
            executor,
            target,
            board,
            tally: Mutex::new(VoteTally::default()),
            notifications,
        })
    }

    pub fn board(&self) -> &ObjectId {
        &self.board
    }

    pub fn call_target(&self) -> &CallTarget {
        &self.target
    }

    pub async fn tally(&self) -> VoteTally {
        *self.tally.lock().await
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    pub async fn submit_vote(&self, mood: Mood) -> Result<VoteReceipt, VoteError> {
        let Some(sender) = self.session.current_identity() else {
            warn!(mood = mood.label(), "vote rejected: no wallet connected");
            self.notify(Notification::AuthenticationRequired);
            return Err(VoteError::NotAuthenticated);
        };

        let call = VoteRequest::new(&self.board, mood).to_move_call(&self.target);
        debug!(
            call_target = %self.target,
            board = %self.board,
            mood = mood.label(),
            "dispatching vote"
        );

        match self.executor.execute(&sender, call).await {
            Ok(outcome) => {
                let tally = {
                    let mut guard = self.tally.lock().await;
                    guard.record(mood);
                    *guard
                };
                info!(
                    mood = mood.label(),
                    digest = %outcome.digest,
                    tally = %tally,
                    "vote submitted"
                );
                self.notify(Notification::VoteSubmitted { mood, tally });
                Ok(VoteReceipt {
                    mood,
                    digest: outcome.digest,
                    tally,
                    submitted_at: Utc::now(),
                })
            }
            Err(err) => {
                error!(mood = mood.label(), error = ?err, "vote submission failed");
                let detail = format!("{err:#}");
                self.notify(Notification::VoteFailed {
                    mood,
                    message: error::failure_notice(&detail),
                });
                Err(VoteError::ExecutionFailed { detail })
            }
        }
    }

    fn notify(&self, notification: Notification) {
        // Fails only when nobody is subscribed.
        let _ = self.notifications.send(notification);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
