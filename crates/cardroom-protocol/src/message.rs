//! Commands, acknowledgements, and unsolicited server events.
//!
//! ```text
//! client ── Request { messageId, command, ...fields } ──→ server
//! client ←── Ack { messageId, error?, ...result } ──────── server
//! client ←── Event { event, ...fields } ───────────────── server
//! ```
//!
//! The ack echoes the request's `messageId`; that id is the only thing
//! tying a response to its command.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Card, GameId, PlayedHand, PlayerHands, PlayerId, ProtocolError, RequestId};

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A client command.
///
/// Internally tagged by `command` with kebab-case names (`"play-hand"`),
/// and camelCase fields (`"playerId"`), matching the browser client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Command {
    /// Open a new table with the sender as its owner.
    Create {
        player_id: PlayerId,
        player_name: String,
        game_owner: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        game_name: Option<String>,
    },

    /// Take a seat at an existing table.
    Join {
        player_id: PlayerId,
        player_name: String,
        game_owner: bool,
        game_id: GameId,
    },

    /// Shuffle and deal; starts the game.
    Deal {
        player_id: PlayerId,
        game_id: GameId,
        num_jokers: u32,
        /// The client's belief about the game state. Informational; the
        /// table's own state decides.
        game_started: bool,
        /// Dealer override. Random when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dealer_id: Option<PlayerId>,
    },

    /// Play cards from the sender's hand.
    PlayHand {
        game_id: GameId,
        player_id: PlayerId,
        cards: Vec<Card>,
    },

    /// Ask whether a table has started.
    ServerGameStatus { game_id: GameId },
}

impl Command {
    /// The wire name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::Join { .. } => "join",
            Command::Deal { .. } => "deal",
            Command::PlayHand { .. } => "play-hand",
            Command::ServerGameStatus { .. } => "server-game-status",
        }
    }

    /// The table this command targets, if it names one.
    pub fn game_id(&self) -> Option<GameId> {
        match self {
            Command::Create { .. } => None,
            Command::Join { game_id, .. }
            | Command::Deal { game_id, .. }
            | Command::PlayHand { game_id, .. }
            | Command::ServerGameStatus { game_id } => Some(*game_id),
        }
    }
}

/// A command stamped with its correlation id.
///
/// `#[serde(flatten)]` inlines the command's own fields, producing
/// `{ "messageId": 7, "command": "join", "playerId": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub message_id: RequestId,
    #[serde(flatten)]
    pub command: Command,
}

// ---------------------------------------------------------------------------
// Success payloads
// ---------------------------------------------------------------------------

/// Result fields of a successful `create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCreated {
    pub game_id: GameId,
}

/// Result fields of a successful `join`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameJoined {
    pub game_name: String,
}

/// Result fields of a successful `deal`: the caller's view after dealing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dealt {
    pub players_hands: PlayerHands,
}

/// Result fields of a successful `play-hand`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandPlayed {
    pub players_hands: PlayerHands,
    pub played_hand: PlayedHand,
}

/// Result fields of `server-game-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatus {
    pub game_status: bool,
}

// ---------------------------------------------------------------------------
// Errors on the wire
// ---------------------------------------------------------------------------

/// Why a command was rejected. Callers branch on this, not on the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    GameAlreadyStarted,
    GameNotStarted,
    PlayerNotFound,
    NotYourTurn,
    InvalidMove,
    Timeout,
    DuplicatePlayer,
    TableFull,
    NotEnoughPlayers,
    TooManyJokers,
    NotOwner,
    GameNotFound,
    Unavailable,
    BadRequest,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::GameAlreadyStarted => "game-already-started",
            ErrorKind::GameNotStarted => "game-not-started",
            ErrorKind::PlayerNotFound => "player-not-found",
            ErrorKind::NotYourTurn => "not-your-turn",
            ErrorKind::InvalidMove => "invalid-move",
            ErrorKind::Timeout => "timeout",
            ErrorKind::DuplicatePlayer => "duplicate-player",
            ErrorKind::TableFull => "table-full",
            ErrorKind::NotEnoughPlayers => "not-enough-players",
            ErrorKind::TooManyJokers => "too-many-jokers",
            ErrorKind::NotOwner => "not-owner",
            ErrorKind::GameNotFound => "game-not-found",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::BadRequest => "bad-request",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `error` field of a failed ack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct AckError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AckError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Ack
// ---------------------------------------------------------------------------

/// The server's answer to one [`Request`].
///
/// Result fields are flattened next to `messageId`, so the ack body is
/// kept as a JSON object and decoded into a typed payload on demand with
/// [`Ack::decode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    pub message_id: RequestId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AckError>,
    #[serde(flatten)]
    pub result: Map<String, Value>,
}

impl Ack {
    /// Builds a successful ack whose result fields come from `result`.
    ///
    /// # Errors
    /// `result` must serialize to a JSON object (or unit).
    pub fn success<T: Serialize>(
        message_id: RequestId,
        result: &T,
    ) -> Result<Self, ProtocolError> {
        let result = match serde_json::to_value(result).map_err(ProtocolError::Encode)? {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ProtocolError::InvalidMessage(format!(
                    "ack result must be an object, got {other}"
                )));
            }
        };
        Ok(Self {
            message_id,
            error: None,
            result,
        })
    }

    /// Builds a failed ack.
    pub fn failure(message_id: RequestId, error: AckError) -> Self {
        Self {
            message_id,
            error: Some(error),
            result: Map::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Decodes the result fields into a typed payload.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        serde_json::from_value(Value::Object(self.result.clone()))
            .map_err(ProtocolError::Decode)
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// Unsolicited notifications, not tied to any request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Someone joined, dealt, or played; here is your refreshed view.
    HandsUpdated { game_id: GameId, hands: PlayerHands },

    /// Someone played cards.
    HandPlayed {
        game_id: GameId,
        played_hand: PlayedHand,
    },

    /// Free-form notice for the player.
    Alert { message: String },

    /// Local only: published by the client when its connection ends.
    #[serde(skip)]
    Disconnected,
}

/// Everything the server sends, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    Ack(Ack),
    Event(ServerEvent),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rank, Suit};

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    #[test]
    fn test_request_create_json_format() {
        let req = Request {
            message_id: RequestId(1),
            command: Command::Create {
                player_id: pid("p1"),
                player_name: "Alice".into(),
                game_owner: true,
                game_name: None,
            },
        };
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["messageId"], 1);
        assert_eq!(json["command"], "create");
        assert_eq!(json["playerId"], "p1");
        assert_eq!(json["playerName"], "Alice");
        assert_eq!(json["gameOwner"], true);
        assert!(json.get("gameName").is_none());
    }

    #[test]
    fn test_request_play_hand_uses_kebab_case_tag() {
        let req = Request {
            message_id: RequestId(9),
            command: Command::PlayHand {
                game_id: GameId(4),
                player_id: pid("p2"),
                cards: vec![Card::new(Rank::Ten, Suit::Hearts), Card::Joker],
            },
        };
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["command"], "play-hand");
        assert_eq!(json["gameId"], 4);
        assert_eq!(json["cards"], serde_json::json!(["10H", "??"]));
    }

    #[test]
    fn test_request_decodes_browser_style_json() {
        let raw = r#"{
            "command": "deal",
            "playerId": "p1",
            "gameId": 3,
            "numJokers": 2,
            "gameStarted": false,
            "messageId": 17
        }"#;
        let req: Request = serde_json::from_str(raw).unwrap();

        assert_eq!(req.message_id, RequestId(17));
        assert_eq!(
            req.command,
            Command::Deal {
                player_id: pid("p1"),
                game_id: GameId(3),
                num_jokers: 2,
                game_started: false,
                dealer_id: None,
            }
        );
    }

    #[test]
    fn test_request_server_game_status_decodes() {
        let raw = r#"{"command":"server-game-status","gameId":8,"messageId":2}"#;
        let req: Request = serde_json::from_str(raw).unwrap();
        assert_eq!(req.command, Command::ServerGameStatus { game_id: GameId(8) });
        assert_eq!(req.command.name(), "server-game-status");
        assert_eq!(req.command.game_id(), Some(GameId(8)));
    }

    #[test]
    fn test_request_unknown_command_fails() {
        let raw = r#"{"command":"fly-to-moon","messageId":1}"#;
        assert!(serde_json::from_str::<Request>(raw).is_err());
    }

    #[test]
    fn test_ack_success_flattens_result_fields() {
        let ack = Ack::success(RequestId(5), &GameCreated { game_id: GameId(42) }).unwrap();
        let json = serde_json::to_value(&ack).unwrap();

        assert_eq!(json["messageId"], 5);
        assert_eq!(json["gameId"], 42);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_ack_decode_typed_payload() {
        let ack = Ack::success(RequestId(5), &GameStatus { game_status: true }).unwrap();
        let status: GameStatus = ack.decode().unwrap();
        assert!(status.game_status);
    }

    #[test]
    fn test_ack_decode_wrong_payload_fails() {
        let ack = Ack::success(RequestId(5), &GameStatus { game_status: true }).unwrap();
        assert!(ack.decode::<GameCreated>().is_err());
    }

    #[test]
    fn test_ack_success_rejects_non_object_result() {
        let result = Ack::success(RequestId(1), &42u32);
        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn test_ack_failure_json_format() {
        let ack = Ack::failure(
            RequestId(3),
            AckError::new(ErrorKind::NotYourTurn, "player b is not the current player"),
        );
        let json = serde_json::to_value(&ack).unwrap();

        assert_eq!(json["messageId"], 3);
        assert_eq!(json["error"]["kind"], "not-your-turn");
        assert!(ack.is_error());
    }

    #[test]
    fn test_server_message_ack_is_tagged() {
        let msg = ServerMessage::Ack(
            Ack::success(RequestId(1), &GameJoined { game_name: "friday".into() }).unwrap(),
        );
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "ack");
        assert_eq!(json["messageId"], 1);
        assert_eq!(json["gameName"], "friday");

        let decoded: ServerMessage = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_server_message_event_is_double_tagged() {
        let msg = ServerMessage::Event(ServerEvent::Alert {
            message: "game already started".into(),
        });
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "event");
        assert_eq!(json["event"], "alert");
        assert_eq!(json["message"], "game already started");

        let decoded: ServerMessage = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_error_kind_display_matches_wire_name() {
        let json = serde_json::to_string(&ErrorKind::GameAlreadyStarted).unwrap();
        assert_eq!(json, format!("\"{}\"", ErrorKind::GameAlreadyStarted));
    }

    #[test]
    fn test_disconnected_event_is_not_serializable() {
        assert!(serde_json::to_string(&ServerEvent::Disconnected).is_err());
    }
}
