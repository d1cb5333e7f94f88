//! Pending-request registry: correlates acks with the requests that
//! caused them.
//!
//! Each outstanding request owns a `oneshot` sender keyed by its
//! [`RequestId`]. An ack removes the entry and fires the sender, so an
//! entry resolves at most once no matter how many acks arrive for it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use cardroom_protocol::{Ack, AckError, RequestId};
use tokio::sync::oneshot;

/// What a waiting request eventually receives.
pub type Reply = Result<Ack, AckError>;

/// Outcome of [`PendingRequests::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The ack matched an outstanding request.
    Resolved,
    /// No request with this id is outstanding (never issued, already
    /// answered, cancelled, or timed out).
    Unknown,
}

/// Outstanding requests, keyed by id.
///
/// Critical sections never await, so a plain `std` mutex is enough.
#[derive(Debug)]
pub struct PendingRequests {
    next_id: AtomicU64,
    entries: Mutex<HashMap<RequestId, oneshot::Sender<Reply>>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Allocates a fresh id and records a waiter for it.
    pub fn register(&self) -> (RequestId, oneshot::Receiver<Reply>) {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = oneshot::channel();
        self.entries().insert(id, tx);
        (id, rx)
    }

    /// Delivers an ack to its waiter and forgets the entry.
    ///
    /// Error acks are delivered as `Err(AckError)`.
    pub fn resolve(&self, ack: Ack) -> Resolution {
        let message_id = ack.message_id;
        let Some(tx) = self.entries().remove(&message_id) else {
            tracing::warn!(%message_id, "ack for unknown request ignored");
            return Resolution::Unknown;
        };

        let reply = match ack.error {
            Some(error) => Err(error),
            None => Ok(ack),
        };
        if tx.send(reply).is_err() {
            tracing::debug!(%message_id, "requester stopped waiting before ack");
        }
        Resolution::Resolved
    }

    /// Forgets one entry. Its waiter sees the channel close.
    pub fn cancel(&self, id: RequestId) -> bool {
        self.entries().remove(&id).is_some()
    }

    /// Forgets every entry.
    pub fn clear(&self) {
        let dropped = {
            let mut entries = self.entries();
            let n = entries.len();
            entries.clear();
            n
        };
        if dropped > 0 {
            tracing::debug!(dropped, "pending requests cleared");
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<RequestId, oneshot::Sender<Reply>>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PendingRequests {
    fn default() -> Self {
        Self::new()
    }
}
