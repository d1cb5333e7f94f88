//! The game session state machine.
//!
//! A [`GameSession`] owns the roster, hands, turn pointer, and play
//! history of one table. It is plain synchronous state: callers must
//! serialize access (the table actor in [`crate::table`] does).
//!
//! ```text
//! add_player* ──→ deal ──→ play_hand*
//! (seating)      (started = true, exactly once)
//! ```

use std::collections::HashMap;

use cardroom_protocol::{Card, GameId, PlayedHand, PlayerHands, PlayerId};
use rand::Rng;
use rand::rngs::StdRng;

use crate::{GameConfig, GameError, deck, view};

/// One seat at the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
    pub is_owner: bool,
}

/// Everything a successful [`GameSession::play_hand`] produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    /// Fresh views for every player, in turn order.
    pub players_hands: Vec<PlayerHands>,
    /// The record appended to the play history.
    pub played_hand: PlayedHand,
}

/// A single card game.
pub struct GameSession {
    id: GameId,
    name: String,
    config: GameConfig,

    /// Seats in join order. This order is the turn order.
    players: Vec<PlayerState>,

    /// Lookup from player id to seat index, kept in sync with `players`.
    seats: HashMap<PlayerId, usize>,

    /// Index of the player to act. `Some` exactly when `started`.
    current_player: Option<usize>,
    started: bool,
    played_hands: Vec<PlayedHand>,
    rng: StdRng,
}

impl GameSession {
    pub fn new(id: GameId, name: impl Into<String>, config: GameConfig) -> Self {
        let rng = config.rng();
        Self {
            id,
            name: name.into(),
            config,
            players: Vec::new(),
            seats: HashMap::new(),
            current_player: None,
            started: false,
            played_hands: Vec::new(),
            rng,
        }
    }

    // -- Accessors ---------------------------------------------------------

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn current_player_index(&self) -> Option<usize> {
        self.current_player
    }

    pub fn current_player_id(&self) -> Option<&PlayerId> {
        self.current_player.map(|i| &self.players[i].id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Seats in turn order.
    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    /// Seat index (turn position) of a seated player.
    pub fn seat_of(&self, id: &PlayerId) -> Option<usize> {
        self.seats.get(id).copied()
    }

    pub fn player(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.seat_of(id).map(|i| &self.players[i])
    }

    pub fn hand(&self, id: &PlayerId) -> Option<&[Card]> {
        self.player(id).map(|p| p.hand.as_slice())
    }

    pub fn played_hands(&self) -> &[PlayedHand] {
        &self.played_hands
    }

    /// Every player's view of the table, in turn order.
    pub fn hands(&self) -> Vec<PlayerHands> {
        view::project_all(self)
    }

    /// One player's view of the table.
    pub fn hands_for(&self, id: &PlayerId) -> Option<PlayerHands> {
        view::project_for(self, id)
    }

    // -- Operations --------------------------------------------------------

    /// Seats a new player at the end of the turn order.
    ///
    /// # Errors
    /// - [`GameError::GameAlreadyStarted`] once the cards are dealt
    /// - [`GameError::DuplicatePlayer`] if the id is already seated
    /// - [`GameError::TableFull`] if `max_players` seats are taken
    pub fn add_player(
        &mut self,
        id: PlayerId,
        name: impl Into<String>,
        is_owner: bool,
    ) -> Result<Vec<PlayerHands>, GameError> {
        if self.started {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.seats.contains_key(&id) {
            return Err(GameError::DuplicatePlayer(id));
        }
        if let Some(max) = self.config.max_players {
            if self.players.len() >= max {
                return Err(GameError::TableFull(max));
            }
        }

        self.seats.insert(id.clone(), self.players.len());
        self.players.push(PlayerState {
            id,
            name: name.into(),
            hand: Vec::new(),
            is_owner,
        });

        Ok(self.hands())
    }

    /// Shuffles a fresh deck and deals all of it, starting with the
    /// player after the dealer.
    ///
    /// The dealer is `dealer_id` when given, otherwise a uniformly random
    /// seat. Cards go out one at a time round-robin; when the deck does
    /// not divide evenly the extra cards land on the earliest players in
    /// the round.
    ///
    /// # Errors
    /// - [`GameError::GameAlreadyStarted`] on a second deal
    /// - [`GameError::NotEnoughPlayers`] below `min_players` (at least 1)
    /// - [`GameError::TooManyJokers`] above `max_jokers`
    /// - [`GameError::PlayerNotFound`] if `dealer_id` is not seated
    pub fn deal(
        &mut self,
        num_jokers: u32,
        dealer_id: Option<&PlayerId>,
    ) -> Result<Vec<PlayerHands>, GameError> {
        if self.started {
            return Err(GameError::GameAlreadyStarted);
        }
        let seated = self.players.len();
        let needed = self.config.required_players();
        if seated < needed {
            return Err(GameError::NotEnoughPlayers { needed, seated });
        }
        let max = self.config.max_jokers;
        if num_jokers > max {
            return Err(GameError::TooManyJokers {
                requested: num_jokers,
                max,
            });
        }
        let dealer = match dealer_id {
            Some(id) => *self
                .seats
                .get(id)
                .ok_or_else(|| GameError::PlayerNotFound(id.clone()))?,
            None => self.rng.random_range(0..seated),
        };

        let start = (dealer + 1) % seated;
        let deck = deck::build_deck(num_jokers, &mut self.rng);
        for (offset, card) in deck.into_iter().enumerate() {
            self.players[(start + offset) % seated].hand.push(card);
        }

        self.current_player = Some(start);
        self.started = true;

        tracing::info!(
            game_id = %self.id,
            dealer = %self.players[dealer].id,
            first = %self.players[start].id,
            num_jokers,
            "cards dealt"
        );

        Ok(self.hands())
    }

    /// Plays `cards` out of the current player's hand and passes the turn.
    ///
    /// Validation is all-or-nothing: every card (counting repeats) must be
    /// in the hand, otherwise nothing changes. An empty `cards` is a pass.
    ///
    /// # Errors
    /// - [`GameError::GameNotStarted`] before the deal
    /// - [`GameError::PlayerNotFound`] if `player_id` is not seated
    /// - [`GameError::NotYourTurn`] if someone else is to act
    /// - [`GameError::InvalidMove`] naming the first card not held
    pub fn play_hand(
        &mut self,
        player_id: &PlayerId,
        cards: &[Card],
    ) -> Result<PlayOutcome, GameError> {
        if !self.started {
            return Err(GameError::GameNotStarted);
        }
        let seat = *self
            .seats
            .get(player_id)
            .ok_or_else(|| GameError::PlayerNotFound(player_id.clone()))?;
        let current = self.current_player.ok_or(GameError::GameNotStarted)?;
        if seat != current {
            return Err(GameError::NotYourTurn(player_id.clone()));
        }

        // Work on a copy so a bad card leaves the real hand untouched.
        let mut remaining = self.players[seat].hand.clone();
        for card in cards {
            let pos = remaining
                .iter()
                .position(|held| held == card)
                .ok_or_else(|| GameError::InvalidMove {
                    player: player_id.clone(),
                    card: *card,
                })?;
            remaining.remove(pos);
        }

        self.players[seat].hand = remaining;
        let played_hand = PlayedHand {
            player_id: player_id.clone(),
            cards: cards.to_vec(),
        };
        self.played_hands.push(played_hand.clone());
        self.current_player = Some((current + 1) % self.players.len());

        tracing::debug!(
            game_id = %self.id,
            %player_id,
            played = cards.len(),
            left = self.players[seat].hand.len(),
            "hand played"
        );

        Ok(PlayOutcome {
            players_hands: self.hands(),
            played_hand,
        })
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("players", &self.players.len())
            .field("started", &self.started)
            .field("current_player", &self.current_player)
            .field("played_hands", &self.played_hands.len())
            .finish()
    }
}
