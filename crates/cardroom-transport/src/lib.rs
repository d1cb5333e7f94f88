//! Connection abstraction for Cardroom.
//!
//! The command protocol only needs a reliable, ordered, message-oriented
//! duplex pipe. [`Connection`] describes that pipe; the concrete socket
//! (WebSocket, TCP framing, ...) lives outside this workspace.
//!
//! [`MemoryConnection::pair`] provides an in-process implementation used
//! by tests and the demo.

mod error;
mod memory;

pub use error::TransportError;
pub use memory::MemoryConnection;

use std::fmt;
use std::future::Future;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A single duplex connection that sends and receives whole messages.
///
/// Implementations must deliver messages reliably and in order. The
/// returned futures are `Send` so connections can be driven from spawned
/// Tokio tasks in generic code.
pub trait Connection: Send + Sync + 'static {
    /// Sends one message to the remote peer.
    fn send(
        &self,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    fn recv(
        &self,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// Closes the connection. The peer observes end-of-stream.
    fn close(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
