//! Error types for the table layer.

use cardroom_protocol::{AckError, Card, ErrorKind, GameId, PlayerId};

/// Rule violations reported by a [`GameSession`](crate::GameSession).
///
/// Every variant is a local validation failure: the session is left
/// exactly as it was before the rejected call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("game already started")]
    GameAlreadyStarted,

    #[error("game not started")]
    GameNotStarted,

    #[error("player {0} does not exist")]
    PlayerNotFound(PlayerId),

    #[error("player {0} is not the current player")]
    NotYourTurn(PlayerId),

    /// The player tried to play a card they do not hold (or more copies
    /// of it than they hold).
    #[error("player {player} does not hold {card}")]
    InvalidMove { player: PlayerId, card: Card },

    #[error("player {0} is already seated")]
    DuplicatePlayer(PlayerId),

    #[error("table is full ({0} seats)")]
    TableFull(usize),

    #[error("need at least {needed} players to deal, have {seated}")]
    NotEnoughPlayers { needed: usize, seated: usize },

    #[error("cannot deal {requested} jokers (limit {max})")]
    TooManyJokers { requested: u32, max: u32 },

    /// Only the table owner may deal.
    #[error("player {0} does not own this table")]
    NotOwner(PlayerId),
}

impl GameError {
    /// The wire error kind for this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::GameAlreadyStarted => ErrorKind::GameAlreadyStarted,
            GameError::GameNotStarted => ErrorKind::GameNotStarted,
            GameError::PlayerNotFound(_) => ErrorKind::PlayerNotFound,
            GameError::NotYourTurn(_) => ErrorKind::NotYourTurn,
            GameError::InvalidMove { .. } => ErrorKind::InvalidMove,
            GameError::DuplicatePlayer(_) => ErrorKind::DuplicatePlayer,
            GameError::TableFull(_) => ErrorKind::TableFull,
            GameError::NotEnoughPlayers { .. } => ErrorKind::NotEnoughPlayers,
            GameError::TooManyJokers { .. } => ErrorKind::TooManyJokers,
            GameError::NotOwner(_) => ErrorKind::NotOwner,
        }
    }
}

/// Errors from table lookup and the table actors.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The game itself rejected the operation.
    #[error(transparent)]
    Game(#[from] GameError),

    /// No table with this id.
    #[error("game {0} not found")]
    NotFound(GameId),

    /// The table's actor has stopped or its mailbox is closed.
    #[error("game {0} is unavailable")]
    Unavailable(GameId),
}

impl TableError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TableError::Game(e) => e.kind(),
            TableError::NotFound(_) => ErrorKind::GameNotFound,
            TableError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    /// Converts into the `error` field of an ack.
    pub fn to_ack_error(&self) -> AckError {
        AckError::new(self.kind(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_error_kinds() {
        let p = PlayerId::new("p");
        assert_eq!(GameError::GameAlreadyStarted.kind(), ErrorKind::GameAlreadyStarted);
        assert_eq!(GameError::NotYourTurn(p.clone()).kind(), ErrorKind::NotYourTurn);
        assert_eq!(
            GameError::InvalidMove { player: p, card: Card::Joker }.kind(),
            ErrorKind::InvalidMove
        );
        assert_eq!(
            GameError::TooManyJokers { requested: 99, max: 54 }.kind(),
            ErrorKind::TooManyJokers
        );
        assert_eq!(GameError::NotOwner(PlayerId::new("b")).kind(), ErrorKind::NotOwner);
    }

    #[test]
    fn test_table_error_ack_error_carries_kind_and_text() {
        let err = TableError::NotFound(GameId(5));
        let ack = err.to_ack_error();
        assert_eq!(ack.kind, ErrorKind::GameNotFound);
        assert_eq!(ack.message, "game G-5 not found");
    }

    #[test]
    fn test_table_error_from_game_error_is_transparent() {
        let err: TableError = GameError::GameNotStarted.into();
        assert_eq!(err.to_string(), "game not started");
        assert_eq!(err.kind(), ErrorKind::GameNotStarted);
    }
}
