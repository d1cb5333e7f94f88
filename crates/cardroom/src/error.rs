//! Unified error type for Cardroom.

use cardroom_client::ClientError;
use cardroom_protocol::ProtocolError;
use cardroom_table::TableError;
use cardroom_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum CardroomError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A table or game-rule failure.
    #[error(transparent)]
    Table(#[from] TableError),

    /// A client-side request failure.
    #[error(transparent)]
    Client(#[from] ClientError),
}
