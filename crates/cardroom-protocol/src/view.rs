//! Hand views: what one player is allowed to see of the table.

use serde::{Deserialize, Serialize};

use crate::{Card, PlayerId};

/// One seat as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandView {
    pub player_id: PlayerId,
    pub player_name: String,
    /// Either the concrete cards (the viewer's own seat) or only a count.
    #[serde(flatten)]
    pub contents: HandContents,
    /// `true` if this seat is the one to act.
    pub current_player: bool,
    /// `true` only on the owner's own seat, in the owner's own view.
    pub game_owner_button: bool,
}

impl HandView {
    /// Number of cards held, whether or not they are visible.
    pub fn card_count(&self) -> usize {
        match &self.contents {
            HandContents::Cards { cards } => cards.len(),
            HandContents::Hidden { cards_remaining } => *cards_remaining,
        }
    }

    /// The concrete cards, if this view is allowed to show them.
    pub fn cards(&self) -> Option<&[Card]> {
        match &self.contents {
            HandContents::Cards { cards } => Some(cards),
            HandContents::Hidden { .. } => None,
        }
    }
}

/// What a view reveals about a hand.
///
/// Untagged: a visible hand carries `"cards": [...]`, a hidden one only
/// `"cardsRemaining": n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HandContents {
    Cards {
        cards: Vec<Card>,
    },
    Hidden {
        #[serde(rename = "cardsRemaining")]
        cards_remaining: usize,
    },
}

/// The whole table from one player's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerHands {
    /// The viewer.
    pub player_id: PlayerId,
    pub game_started: bool,
    /// Every seat, in turn order.
    pub hands: Vec<HandView>,
}

impl PlayerHands {
    /// The viewer's own seat.
    pub fn own(&self) -> Option<&HandView> {
        self.hands.iter().find(|h| h.player_id == self.player_id)
    }

    /// The seat of whoever is to act, if the game is running.
    pub fn current(&self) -> Option<&HandView> {
        self.hands.iter().find(|h| h.current_player)
    }
}

/// Append-only record of a play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayedHand {
    pub player_id: PlayerId,
    pub cards: Vec<Card>,
}
