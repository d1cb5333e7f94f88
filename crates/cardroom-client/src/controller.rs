//! Player-side workflow on top of a [`CommandChannel`].
//!
//! The controller knows who the local player is and which game they are
//! in, so callers issue `deal(2, None)` rather than assembling commands.

use std::sync::{Mutex, MutexGuard, PoisonError};

use cardroom_protocol::{
    Card, Command, Dealt, GameCreated, GameId, GameJoined, GameStatus, HandPlayed, PlayerHands,
    PlayerId, ServerEvent,
};
use cardroom_transport::Connection;
use tokio::sync::broadcast;

use crate::{ClientError, CommandChannel, EventBus};

/// Notifications the controller raises for the local UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientNotice {
    GameCreated { game_id: GameId },
    GameJoined { game_id: GameId, game_name: String },
    /// Something the player should be told, such as a join refused
    /// because the game is underway.
    Alert { message: String },
}

#[derive(Debug, Default)]
struct ControllerState {
    game_id: Option<GameId>,
    game_started: bool,
}

/// Drives one player's session.
pub struct ClientController<C: Connection> {
    channel: CommandChannel<C>,
    player_id: PlayerId,
    state: Mutex<ControllerState>,
    notices: EventBus<ClientNotice>,
}

impl<C: Connection> ClientController<C> {
    pub fn new(channel: CommandChannel<C>, player_id: PlayerId) -> Self {
        let notices = EventBus::new(channel.config().event_capacity);
        Self {
            channel,
            player_id,
            state: Mutex::new(ControllerState::default()),
            notices,
        }
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    /// The game this player created or joined, if any.
    pub fn game_id(&self) -> Option<GameId> {
        self.state().game_id
    }

    pub fn channel(&self) -> &CommandChannel<C> {
        &self.channel
    }

    /// Server events for this player (hand updates, plays, alerts).
    pub fn events(&self) -> broadcast::Receiver<ServerEvent> {
        self.channel.subscribe()
    }

    /// Notices raised by the controller itself.
    pub fn notices(&self) -> broadcast::Receiver<ClientNotice> {
        self.notices.subscribe()
    }

    /// Opens a new game owned by this player.
    pub async fn create_game(
        &self,
        player_name: impl Into<String>,
        game_name: Option<String>,
    ) -> Result<GameId, ClientError> {
        let created: GameCreated = self
            .channel
            .request(Command::Create {
                player_id: self.player_id.clone(),
                player_name: player_name.into(),
                game_owner: true,
                game_name,
            })
            .await?;

        *self.state() = ControllerState {
            game_id: Some(created.game_id),
            game_started: false,
        };
        tracing::info!(player_id = %self.player_id, game_id = %created.game_id, "game created");
        self.notices.publish(ClientNotice::GameCreated {
            game_id: created.game_id,
        });
        Ok(created.game_id)
    }

    /// Joins an existing game. Returns its name.
    pub async fn join_game(
        &self,
        game_id: GameId,
        player_name: impl Into<String>,
    ) -> Result<String, ClientError> {
        let joined: GameJoined = self
            .channel
            .request(Command::Join {
                player_id: self.player_id.clone(),
                player_name: player_name.into(),
                game_owner: false,
                game_id,
            })
            .await?;

        *self.state() = ControllerState {
            game_id: Some(game_id),
            game_started: false,
        };
        tracing::info!(player_id = %self.player_id, %game_id, "game joined");
        self.notices.publish(ClientNotice::GameJoined {
            game_id,
            game_name: joined.game_name.clone(),
        });
        Ok(joined.game_name)
    }

    /// Asks whether a game has started.
    pub async fn game_status(&self, game_id: GameId) -> Result<bool, ClientError> {
        let status: GameStatus = self
            .channel
            .request(Command::ServerGameStatus { game_id })
            .await?;
        Ok(status.game_status)
    }

    /// Joins `game_id` unless it has already started.
    ///
    /// Returns the game name on join. If the game is underway nothing is
    /// sent, an [`ClientNotice::Alert`] is published, and `None` is
    /// returned.
    pub async fn join_if_open(
        &self,
        game_id: GameId,
        player_name: impl Into<String>,
    ) -> Result<Option<String>, ClientError> {
        if self.game_status(game_id).await? {
            tracing::debug!(player_id = %self.player_id, %game_id, "game already started, not joining");
            self.notices.publish(ClientNotice::Alert {
                message: format!("game {game_id} has already started"),
            });
            return Ok(None);
        }
        self.join_game(game_id, player_name).await.map(Some)
    }

    /// Deals the current game. Returns this player's view.
    pub async fn deal(
        &self,
        num_jokers: u32,
        dealer_id: Option<PlayerId>,
    ) -> Result<PlayerHands, ClientError> {
        let (game_id, game_started) = {
            let state = self.state();
            (state.game_id.ok_or(ClientError::NoActiveGame)?, state.game_started)
        };

        let dealt: Dealt = self
            .channel
            .request(Command::Deal {
                player_id: self.player_id.clone(),
                game_id,
                num_jokers,
                game_started,
                dealer_id,
            })
            .await?;

        self.state().game_started = dealt.players_hands.game_started;
        Ok(dealt.players_hands)
    }

    /// Plays cards from this player's hand. An empty play passes.
    pub async fn play_hand(&self, cards: Vec<Card>) -> Result<HandPlayed, ClientError> {
        let game_id = self.state().game_id.ok_or(ClientError::NoActiveGame)?;
        self.channel
            .request(Command::PlayHand {
                game_id,
                player_id: self.player_id.clone(),
                cards,
            })
            .await
    }

    /// Closes the underlying channel.
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        self.channel.shutdown().await
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
