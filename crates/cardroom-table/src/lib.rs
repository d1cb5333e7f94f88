//! Card tables for Cardroom.
//!
//! The game itself is [`GameSession`]: roster, dealing, turns, and play
//! validation as a synchronous state machine. Around it:
//!
//! - [`deck`]: building and shuffling decks
//! - [`view`]: per-player partial-information views
//! - [`TableHandle`]: a session running in its own Tokio task, which
//!   serializes access and pushes view updates to seated players
//! - [`TableManager`]: allocates game ids and tracks running tables

pub mod deck;
pub mod view;

mod config;
mod error;
mod manager;
mod session;
mod table;

pub use config::GameConfig;
pub use error::{GameError, TableError};
pub use manager::TableManager;
pub use session::{GameSession, PlayOutcome, PlayerState};
pub use table::{PlayerSender, TableHandle, TableInfo};
