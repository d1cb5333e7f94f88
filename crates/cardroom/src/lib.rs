//! # Cardroom
//!
//! Backend for a multiplayer card table: players create or join a game,
//! the owner deals, and everyone plays cards in turn, each seeing only
//! their own hand.
//!
//! The workspace is split by layer:
//!
//! - `cardroom-transport`: the [`Connection`](prelude::Connection) seam
//!   and an in-memory pair
//! - `cardroom-protocol`: commands, acks, events, and views on the wire
//! - `cardroom-table`: game sessions, each run by its own table actor
//! - `cardroom-client`: the correlated command channel and a player
//!   controller
//!
//! This crate ties them together with [`serve_connection`] and a single
//! [`CardroomError`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use cardroom::prelude::*;
//!
//! # async fn demo() -> Result<(), CardroomError> {
//! let state = Arc::new(ServerState::new(GameConfig::default()));
//! let (client_end, server_end) = MemoryConnection::pair();
//! spawn_connection(server_end, Arc::clone(&state));
//!
//! let channel = CommandChannel::open(client_end, ChannelConfig::default());
//! let alice = ClientController::new(channel, PlayerId::new("alice"));
//! let game_id = alice.create_game("Alice", None).await?;
//! alice.deal(0, None).await?;
//! # let _ = game_id;
//! # Ok(())
//! # }
//! ```

mod error;
mod handler;
pub mod telemetry;

pub use error::CardroomError;
pub use handler::{ServerState, serve_connection, spawn_connection};

pub mod prelude {
    pub use cardroom_client::{
        ChannelConfig, ClientController, ClientError, ClientNotice, CommandChannel, EventBus,
    };
    pub use cardroom_protocol::{
        Ack, AckError, Card, Command, ErrorKind, GameId, HandView, PlayedHand, PlayerHands,
        PlayerId, Rank, ServerEvent, Suit,
    };
    pub use cardroom_table::{GameConfig, GameError, TableError};
    pub use cardroom_transport::{Connection, MemoryConnection};

    pub use crate::{CardroomError, ServerState, serve_connection, spawn_connection};
}
