//! Table actor: an isolated Tokio task that owns one [`GameSession`].
//!
//! `GameSession` is not re-entrant. Instead of locking it, each table
//! runs in its own task and processes commands from an mpsc mailbox one
//! at a time, which serializes every mutation of that session. Commands
//! that need an answer carry a `oneshot` reply channel.
//!
//! After each successful mutation the actor pushes every *other* seated
//! player their own refreshed view; the caller gets theirs in the reply.

use std::collections::HashMap;

use cardroom_protocol::{Card, GameId, PlayedHand, PlayerHands, PlayerId, ServerEvent};
use tokio::sync::{mpsc, oneshot};

use crate::{GameError, GameSession, TableError};

/// Channel sender for delivering unsolicited events to one player's
/// connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a table actor through its mailbox.
pub(crate) enum TableCommand {
    Join {
        player_id: PlayerId,
        player_name: String,
        is_owner: bool,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<PlayerHands, GameError>>,
    },

    Deal {
        requester: PlayerId,
        num_jokers: u32,
        dealer_id: Option<PlayerId>,
        reply: oneshot::Sender<Result<PlayerHands, GameError>>,
    },

    PlayHand {
        player_id: PlayerId,
        cards: Vec<Card>,
        reply: oneshot::Sender<Result<(PlayerHands, PlayedHand), GameError>>,
    },

    GetInfo {
        reply: oneshot::Sender<TableInfo>,
    },

    Shutdown,
}

/// A snapshot of table metadata (not the hands).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub game_id: GameId,
    pub name: String,
    pub started: bool,
    pub player_count: usize,
    pub current_player: Option<PlayerId>,
}

/// Handle to a running table actor.
///
/// Cheap to clone: it is an `mpsc::Sender` plus the table's identity.
#[derive(Debug, Clone)]
pub struct TableHandle {
    game_id: GameId,
    name: String,
    sender: mpsc::Sender<TableCommand>,
}

impl TableHandle {
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Seats a player. `sender` receives the player's future updates.
    /// Returns the new player's view.
    pub async fn join(
        &self,
        player_id: PlayerId,
        player_name: String,
        is_owner: bool,
        sender: PlayerSender,
    ) -> Result<PlayerHands, TableError> {
        self.request(|reply| TableCommand::Join {
            player_id,
            player_name,
            is_owner,
            sender,
            reply,
        })
        .await?
        .map_err(TableError::from)
    }

    /// Deals the cards. Only the table owner may deal. Returns the
    /// requester's view.
    pub async fn deal(
        &self,
        requester: PlayerId,
        num_jokers: u32,
        dealer_id: Option<PlayerId>,
    ) -> Result<PlayerHands, TableError> {
        self.request(|reply| TableCommand::Deal {
            requester,
            num_jokers,
            dealer_id,
            reply,
        })
        .await?
        .map_err(TableError::from)
    }

    /// Plays cards. Returns the player's view and the play record.
    pub async fn play_hand(
        &self,
        player_id: PlayerId,
        cards: Vec<Card>,
    ) -> Result<(PlayerHands, PlayedHand), TableError> {
        self.request(|reply| TableCommand::PlayHand {
            player_id,
            cards,
            reply,
        })
        .await?
        .map_err(TableError::from)
    }

    /// Requests the current table info.
    pub async fn info(&self) -> Result<TableInfo, TableError> {
        self.request(|reply| TableCommand::GetInfo { reply }).await
    }

    /// Tells the table to stop.
    pub async fn shutdown(&self) -> Result<(), TableError> {
        self.sender
            .send(TableCommand::Shutdown)
            .await
            .map_err(|_| TableError::Unavailable(self.game_id))
    }

    /// Sends a command built around a fresh reply channel and waits for
    /// the answer.
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> TableCommand,
    ) -> Result<T, TableError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| TableError::Unavailable(self.game_id))?;
        reply_rx
            .await
            .map_err(|_| TableError::Unavailable(self.game_id))
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct TableActor {
    session: GameSession,
    /// Per-player outbound event channels.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<TableCommand>,
}

impl TableActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        let game_id = self.session.id();
        tracing::info!(%game_id, "table actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                TableCommand::Join {
                    player_id,
                    player_name,
                    is_owner,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, player_name, is_owner, sender);
                    let _ = reply.send(result);
                }
                TableCommand::Deal {
                    requester,
                    num_jokers,
                    dealer_id,
                    reply,
                } => {
                    let result = self.handle_deal(requester, num_jokers, dealer_id);
                    let _ = reply.send(result);
                }
                TableCommand::PlayHand {
                    player_id,
                    cards,
                    reply,
                } => {
                    let result = self.handle_play(player_id, cards);
                    let _ = reply.send(result);
                }
                TableCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                TableCommand::Shutdown => {
                    tracing::info!(%game_id, "table shutting down");
                    break;
                }
            }
        }

        tracing::info!(%game_id, "table actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        player_name: String,
        is_owner: bool,
        sender: PlayerSender,
    ) -> Result<PlayerHands, GameError> {
        let views = self
            .session
            .add_player(player_id.clone(), player_name, is_owner)?;
        self.senders.insert(player_id.clone(), sender);

        tracing::info!(
            game_id = %self.session.id(),
            %player_id,
            players = self.session.player_count(),
            "player joined"
        );

        Ok(self.fan_out(&player_id, views))
    }

    fn handle_deal(
        &mut self,
        requester: PlayerId,
        num_jokers: u32,
        dealer_id: Option<PlayerId>,
    ) -> Result<PlayerHands, GameError> {
        match self.session.player(&requester) {
            None => return Err(GameError::PlayerNotFound(requester)),
            Some(p) if !p.is_owner => return Err(GameError::NotOwner(requester)),
            Some(_) => {}
        }
        let views = self.session.deal(num_jokers, dealer_id.as_ref())?;
        Ok(self.fan_out(&requester, views))
    }

    fn handle_play(
        &mut self,
        player_id: PlayerId,
        cards: Vec<Card>,
    ) -> Result<(PlayerHands, PlayedHand), GameError> {
        let outcome = self.session.play_hand(&player_id, &cards)?;

        let event = ServerEvent::HandPlayed {
            game_id: self.session.id(),
            played_hand: outcome.played_hand.clone(),
        };
        for (pid, sender) in &self.senders {
            if *pid != player_id {
                let _ = sender.send(event.clone());
            }
        }

        let own = self.fan_out(&player_id, outcome.players_hands);
        Ok((own, outcome.played_hand))
    }

    /// Sends each other player their own view and returns the
    /// requester's. Sends to departed connections are dropped silently.
    fn fan_out(&self, requester: &PlayerId, views: Vec<PlayerHands>) -> PlayerHands {
        let mut own = None;
        for view in views {
            if &view.player_id == requester {
                own = Some(view);
            } else if let Some(sender) = self.senders.get(&view.player_id) {
                let _ = sender.send(ServerEvent::HandsUpdated {
                    game_id: self.session.id(),
                    hands: view,
                });
            }
        }
        // The requester is always seated here: every caller checks it
        // before mutating, and projection covers every seat.
        own.unwrap_or_else(|| PlayerHands {
            player_id: requester.clone(),
            game_started: self.session.started(),
            hands: Vec::new(),
        })
    }

    fn info(&self) -> TableInfo {
        TableInfo {
            game_id: self.session.id(),
            name: self.session.name().to_string(),
            started: self.session.started(),
            player_count: self.session.player_count(),
            current_player: self.session.current_player_id().cloned(),
        }
    }
}

/// Spawns a new table actor and returns a handle to it.
///
/// `mailbox_size` bounds the mailbox; senders wait when it is full.
pub(crate) fn spawn_table(session: GameSession, mailbox_size: usize) -> TableHandle {
    let (tx, rx) = mpsc::channel(mailbox_size);
    let handle = TableHandle {
        game_id: session.id(),
        name: session.name().to_string(),
        sender: tx,
    };

    let actor = TableActor {
        session,
        senders: HashMap::new(),
        receiver: rx,
    };
    tokio::spawn(actor.run());

    handle
}
