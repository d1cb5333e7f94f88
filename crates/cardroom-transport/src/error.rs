use crate::ConnectionId;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// This side already closed the connection.
    #[error("connection {0} is closed")]
    Closed(ConnectionId),

    /// The remote end went away; nothing can be delivered to it.
    #[error("peer of connection {0} is gone")]
    PeerClosed(ConnectionId),
}
