//! Client side of the Cardroom command protocol.
//!
//! - [`PendingRequests`]: matches acks to outstanding requests by id
//! - [`CommandChannel`]: sends commands over a connection and awaits
//!   their acks; republishes unsolicited events on an [`EventBus`]
//! - [`ClientController`]: one player's create/join/deal/play workflow

mod bus;
mod channel;
mod config;
mod controller;
mod error;
mod registry;

pub use bus::EventBus;
pub use channel::CommandChannel;
pub use config::ChannelConfig;
pub use controller::{ClientController, ClientNotice};
pub use error::ClientError;
pub use registry::{PendingRequests, Reply, Resolution};
