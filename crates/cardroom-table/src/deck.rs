//! Deck construction and shuffling.

use cardroom_protocol::{Card, Rank, Suit};
use rand::Rng;
use rand::seq::SliceRandom;

/// Number of non-joker cards in a deck.
pub const STANDARD_DECK_SIZE: usize = 52;

/// Builds the unshuffled deck: every rank in every suit (rank-major),
/// followed by `num_jokers` jokers.
pub fn ordered_deck(num_jokers: u32) -> Vec<Card> {
    let mut deck = Vec::with_capacity(STANDARD_DECK_SIZE + num_jokers as usize);
    for rank in Rank::ALL {
        for suit in Suit::ALL {
            deck.push(Card::new(rank, suit));
        }
    }
    deck.extend(std::iter::repeat_n(Card::Joker, num_jokers as usize));
    deck
}

/// Builds a deck of `52 + num_jokers` cards in uniformly random order.
///
/// `SliceRandom::shuffle` is a Fisher–Yates pass over the whole slice.
pub fn build_deck<R: Rng + ?Sized>(num_jokers: u32, rng: &mut R) -> Vec<Card> {
    let mut deck = ordered_deck(num_jokers);
    deck.shuffle(rng);
    deck
}
