//! Table configuration.

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Seating and shuffling policy for one table.
///
/// Override individual fields with struct update syntax:
///
/// ```rust
/// use cardroom_table::GameConfig;
///
/// let config = GameConfig {
///     max_players: Some(4),
///     deck_seed: Some(7),
///     ..GameConfig::default()
/// };
/// assert_eq!(config.min_players, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Players required before `deal` is allowed. Values below 1 are
    /// treated as 1: dealing to an empty table is never possible.
    pub min_players: usize,

    /// Seat limit. `None` means unlimited.
    pub max_players: Option<usize>,

    /// Largest `num_jokers` a deal accepts. The joker count comes from
    /// clients, so it is capped before any deck is built.
    pub max_jokers: u32,

    /// Fixed seed for shuffling and dealer selection. `None` seeds from
    /// the thread RNG, which is what production tables want.
    pub deck_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 1,
            max_players: None,
            max_jokers: 54,
            deck_seed: None,
        }
    }
}

impl GameConfig {
    /// Effective minimum, never below one.
    pub fn required_players(&self) -> usize {
        self.min_players.max(1)
    }

    /// Creates the RNG a session shuffles and picks dealers with.
    pub(crate) fn rng(&self) -> StdRng {
        match self.deck_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_game_config_default() {
        let config = GameConfig::default();
        assert_eq!(config.min_players, 1);
        assert_eq!(config.max_players, None);
        assert_eq!(config.max_jokers, 54);
        assert_eq!(config.deck_seed, None);
    }

    #[test]
    fn test_required_players_never_below_one() {
        let config = GameConfig {
            min_players: 0,
            ..GameConfig::default()
        };
        assert_eq!(config.required_players(), 1);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let config = GameConfig {
            deck_seed: Some(99),
            ..GameConfig::default()
        };
        let a: u64 = config.rng().random();
        let b: u64 = config.rng().random();
        assert_eq!(a, b);
    }
}
