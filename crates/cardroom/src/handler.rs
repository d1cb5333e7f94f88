//! Per-connection handler: request dispatch and event forwarding.
//!
//! Each connection gets its own Tokio task running [`serve_connection`].
//! The loop waits on two sources at once:
//!   1. frames from the client → decode `Request` → route to a table →
//!      answer with an `Ack` echoing the request's `messageId`
//!   2. events pushed by tables this connection is seated at → forward
//!      as `ServerMessage::Event`

use std::sync::Arc;

use cardroom_protocol::{
    Ack, AckError, Codec, Command, Dealt, ErrorKind, GameCreated, GameId, GameJoined,
    GameStatus, HandPlayed, JsonCodec, Request, RequestId, ServerMessage,
};
use cardroom_table::{GameConfig, PlayerSender, TableError, TableHandle, TableManager};
use cardroom_transport::Connection;
use serde::Serialize;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::CardroomError;

/// State shared by every connection handler.
pub struct ServerState {
    tables: Mutex<TableManager>,
    codec: JsonCodec,
}

impl ServerState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            tables: Mutex::new(TableManager::new(config)),
            codec: JsonCodec,
        }
    }

    /// Number of live tables.
    pub async fn table_count(&self) -> usize {
        self.tables.lock().await.table_count()
    }

    /// Looks up a table. The manager lock is released before returning,
    /// so callers await the table without blocking other connections.
    async fn table(&self, game_id: GameId) -> Result<TableHandle, TableError> {
        let handle = self.tables.lock().await.handle(game_id);
        if handle.is_err() {
            tracing::warn!(%game_id, "request for missing table");
        }
        handle
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

/// Spawns a task serving `conn` until it closes.
pub fn spawn_connection<C: Connection>(conn: C, state: Arc<ServerState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = serve_connection(conn, state).await {
            tracing::debug!(error = %e, "connection ended with error");
        }
    })
}

/// Handles a single connection from accept to close.
pub async fn serve_connection<C: Connection>(
    conn: C,
    state: Arc<ServerState>,
) -> Result<(), CardroomError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "serving connection");

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    loop {
        tokio::select! {
            incoming = conn.recv() => {
                let data = match incoming {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%conn_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "recv error");
                        break;
                    }
                };
                handle_frame(&conn, &state, &events_tx, &data).await?;
            }
            // `events_tx` lives as long as this loop, so this never
            // yields `None`.
            Some(event) = events_rx.recv() => {
                send_message(&conn, &state.codec, &ServerMessage::Event(event)).await?;
            }
        }
    }

    Ok(())
}

/// Decodes one frame and answers it.
async fn handle_frame<C: Connection>(
    conn: &C,
    state: &ServerState,
    events_tx: &PlayerSender,
    data: &[u8],
) -> Result<(), CardroomError> {
    let request: Request = match state.codec.decode(data) {
        Ok(request) => request,
        Err(e) => {
            let Some(message_id) = salvage_message_id(data) else {
                tracing::warn!(conn_id = %conn.id(), error = %e, "undecodable request without messageId skipped");
                return Ok(());
            };
            tracing::debug!(conn_id = %conn.id(), %message_id, error = %e, "bad request");
            let ack = Ack::failure(message_id, AckError::new(ErrorKind::BadRequest, e.to_string()));
            return send_message(conn, &state.codec, &ServerMessage::Ack(ack)).await;
        }
    };

    let Request {
        message_id,
        command,
    } = request;
    tracing::debug!(conn_id = %conn.id(), %message_id, command = command.name(), "dispatching");

    let ack = match dispatch(state, events_tx, message_id, command).await {
        Ok(ack) => ack,
        Err(error) => {
            tracing::debug!(%message_id, kind = %error.kind, "request rejected");
            Ack::failure(message_id, error)
        }
    };
    send_message(conn, &state.codec, &ServerMessage::Ack(ack)).await
}

/// Executes one command and builds its success ack.
async fn dispatch(
    state: &ServerState,
    events_tx: &PlayerSender,
    message_id: RequestId,
    command: Command,
) -> Result<Ack, AckError> {
    match command {
        Command::Create {
            player_id,
            player_name,
            game_owner,
            game_name,
        } => {
            if !game_owner {
                tracing::debug!(%player_id, "create without gameOwner; creator owns the table anyway");
            }
            let game_id = state
                .tables
                .lock()
                .await
                .open_table(player_id, player_name, game_name, events_tx.clone())
                .await
                .map_err(|e| e.to_ack_error())?;
            success(message_id, &GameCreated { game_id })
        }

        Command::Join {
            player_id,
            player_name,
            game_owner,
            game_id,
        } => {
            if game_owner {
                tracing::warn!(%player_id, %game_id, "join asked for ownership; ignored");
            }
            let table = state.table(game_id).await.map_err(|e| e.to_ack_error())?;
            table
                .join(player_id, player_name, false, events_tx.clone())
                .await
                .map_err(|e| e.to_ack_error())?;
            success(
                message_id,
                &GameJoined {
                    game_name: table.name().to_string(),
                },
            )
        }

        Command::Deal {
            player_id,
            game_id,
            num_jokers,
            game_started,
            dealer_id,
        } => {
            let table = state.table(game_id).await.map_err(|e| e.to_ack_error())?;
            tracing::debug!(%game_id, %player_id, client_thinks_started = game_started, "deal requested");
            let players_hands = table
                .deal(player_id, num_jokers, dealer_id)
                .await
                .map_err(|e| e.to_ack_error())?;
            success(message_id, &Dealt { players_hands })
        }

        Command::PlayHand {
            game_id,
            player_id,
            cards,
        } => {
            let table = state.table(game_id).await.map_err(|e| e.to_ack_error())?;
            let (players_hands, played_hand) = table
                .play_hand(player_id, cards)
                .await
                .map_err(|e| e.to_ack_error())?;
            success(
                message_id,
                &HandPlayed {
                    players_hands,
                    played_hand,
                },
            )
        }

        Command::ServerGameStatus { game_id } => {
            let table = state.table(game_id).await.map_err(|e| e.to_ack_error())?;
            let info = table.info().await.map_err(|e| e.to_ack_error())?;
            success(
                message_id,
                &GameStatus {
                    game_status: info.started,
                },
            )
        }
    }
}

fn success<T: Serialize>(message_id: RequestId, result: &T) -> Result<Ack, AckError> {
    Ack::success(message_id, result).map_err(|e| {
        tracing::error!(%message_id, error = %e, "failed to build ack");
        AckError::new(ErrorKind::Unavailable, e.to_string())
    })
}

/// Pulls `messageId` out of a frame that failed to decode as a request.
fn salvage_message_id(data: &[u8]) -> Option<RequestId> {
    let value: serde_json::Value = serde_json::from_slice(data).ok()?;
    value.get("messageId")?.as_u64().map(RequestId)
}

async fn send_message<C: Connection>(
    conn: &C,
    codec: &JsonCodec,
    msg: &ServerMessage,
) -> Result<(), CardroomError> {
    let bytes = codec.encode(msg)?;
    conn.send(&bytes).await?;
    Ok(())
}
