use cardroom_protocol::{AckError, ProtocolError, RequestId};
use cardroom_transport::TransportError;

/// Errors surfaced to code issuing commands over a channel.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with an error ack.
    #[error("rejected: {0}")]
    Rejected(AckError),

    /// No ack arrived within the configured timeout.
    #[error("request {0} timed out")]
    Timeout(RequestId),

    /// The channel shut down while the request was outstanding.
    #[error("channel closed")]
    Closed,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A game command was issued before creating or joining a game.
    #[error("not in a game")]
    NoActiveGame,
}

impl ClientError {
    /// The server's rejection, if this is one.
    pub fn rejection(&self) -> Option<&AckError> {
        match self {
            ClientError::Rejected(e) => Some(e),
            _ => None,
        }
    }
}
