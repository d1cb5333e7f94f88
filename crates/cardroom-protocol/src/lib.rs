//! Wire protocol for Cardroom.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Identity and cards** ([`PlayerId`], [`GameId`], [`RequestId`],
//!   [`Card`]).
//! - **Messages** ([`Request`] wrapping a [`Command`]; [`ServerMessage`]
//!   carrying either an [`Ack`] or a [`ServerEvent`]).
//! - **Views** ([`PlayerHands`], [`HandView`]) describing what one player
//!   may see of the table.
//! - **Codec** ([`Codec`], [`JsonCodec`]) turning all of the above into
//!   bytes.
//!
//! It knows nothing about connections or game rules.

mod codec;
mod error;
mod message;
mod types;
mod view;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use message::{
    Ack, AckError, Command, Dealt, ErrorKind, GameCreated, GameJoined, GameStatus,
    HandPlayed, Request, ServerEvent, ServerMessage,
};
pub use types::{Card, GameId, PlayerId, Rank, RequestId, Suit};
pub use view::{HandContents, HandView, PlayedHand, PlayerHands};
