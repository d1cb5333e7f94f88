//! In-process connection pair backed by Tokio channels.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, Mutex};

use crate::{Connection, ConnectionId, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// One end of an in-memory duplex pipe.
///
/// Messages written on one end arrive, in order, on the other. Closing
/// either end drops its outgoing sender, so the peer's `recv` returns
/// `Ok(None)` once it has drained what was already sent.
pub struct MemoryConnection {
    id: ConnectionId,
    /// `None` once this end has been closed.
    outgoing: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    incoming: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl MemoryConnection {
    /// Creates two connected ends.
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        let a = Self::new(a_tx, b_rx);
        let b = Self::new(b_tx, a_rx);
        tracing::debug!(a = %a.id, b = %b.id, "memory connection pair created");
        (a, b)
    }

    fn new(
        outgoing: mpsc::UnboundedSender<Vec<u8>>,
        incoming: mpsc::UnboundedReceiver<Vec<u8>>,
    ) -> Self {
        Self {
            id: ConnectionId::new(
                NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
            ),
            outgoing: Mutex::new(Some(outgoing)),
            incoming: Mutex::new(incoming),
        }
    }
}

impl Connection for MemoryConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let outgoing = self.outgoing.lock().await;
        let tx = outgoing.as_ref().ok_or(TransportError::Closed(self.id))?;
        tx.send(data.to_vec())
            .map_err(|_| TransportError::PeerClosed(self.id))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.incoming.lock().await.recv().await)
    }

    async fn close(&self) -> Result<(), TransportError> {
        // Dropping the sender signals end-of-stream to the peer. The
        // receiver may be held by a pending `recv`, so closing it is
        // best-effort.
        self.outgoing.lock().await.take();
        if let Ok(mut incoming) = self.incoming.try_lock() {
            incoming.close();
        }
        tracing::debug!(id = %self.id, "memory connection closed");
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
