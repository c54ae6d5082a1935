//! Casino game execution module.
//!
//! This module contains the outcome selection, payout math and state
//! machines for every game family:
//! - Bones (tile reveal)
//! - Doors (progressive tile reveal)
//! - Blackjack
//! - Cases (weighted loot)
//! - Upgrade (skin upgrade gamble)

pub mod blackjack;
pub mod bones;
pub mod cases;
pub mod doors;
#[cfg(test)]
mod integration_tests;
pub mod payout;
pub mod selector;
mod tables;
pub mod upgrade;

use arcade_types::casino::{GameFamily, Phase, RoundOutcome};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use thiserror::Error;

/// Source of uniform draws consumed by every game.
///
/// Implementations must return values in `[0, 1)`. Injecting a fixed source
/// makes every shuffle and pick reproducible.
pub trait RandomSource {
    /// Next uniform sample in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `[0, bound)`. Returns 0 when `bound` is 0.
    fn next_index(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        let index = (self.next_f64() * bound as f64) as usize;
        index.min(bound - 1)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Deterministic random number generator for game rounds.
///
/// Seeded from a table seed, a session id and a round index so every round
/// draws an independent, replayable stream.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha20Rng,
}

impl GameRng {
    /// Create a new RNG from a seed, session id and round index.
    pub fn new(seed: u64, session_id: u64, round: u64) -> Self {
        let mut key = [0u8; 32];
        key[..8].copy_from_slice(&seed.to_be_bytes());
        key[8..16].copy_from_slice(&session_id.to_be_bytes());
        key[16..24].copy_from_slice(&round.to_be_bytes());
        Self {
            inner: ChaCha20Rng::from_seed(key),
        }
    }

    /// Create an RNG from a single seed.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(seed, 0, 0)
    }
}

impl RandomSource for GameRng {
    fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }
}

/// Result of processing a game move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Game is still in progress, state updated.
    Continue,
    /// Game completed with a positive payout. Value is the total return
    /// (stake included) in whole chips.
    Win(u64),
    /// Game completed with nothing returned.
    Loss,
}

impl GameResult {
    /// Credit owed for a terminal result, `None` while the round continues.
    pub fn payout(self) -> Option<u64> {
        match self {
            GameResult::Continue => None,
            GameResult::Win(amount) => Some(amount),
            GameResult::Loss => Some(0),
        }
    }
}

/// Error during game execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// Round parameters are outside the allowed range.
    #[error("invalid round parameters")]
    InvalidParameters,
    /// Invalid move for current game state.
    #[error("invalid move for current state")]
    InvalidMove,
    /// Game session has already completed.
    #[error("game already complete")]
    GameAlreadyComplete,
    /// Internal state is inconsistent.
    #[error("invalid game state")]
    InvalidState,
    /// Deck is exhausted (no more cards to draw).
    #[error("deck exhausted")]
    DeckExhausted,
}

/// Round state of one session, keyed by game family.
#[derive(Clone, Debug)]
pub enum Round {
    Bones(bones::BonesRound),
    Doors(doors::DoorsRound),
    Blackjack(blackjack::BlackjackRound),
    Cases(cases::CaseSpin),
    Upgrade(upgrade::UpgradeRound),
}

impl Round {
    pub fn family(&self) -> GameFamily {
        match self {
            Round::Bones(_) => GameFamily::Bones,
            Round::Doors(_) => GameFamily::Doors,
            Round::Blackjack(_) => GameFamily::Blackjack,
            Round::Cases(_) => GameFamily::Cases,
            Round::Upgrade(_) => GameFamily::Upgrade,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Round::Bones(round) => Phase::Tile(round.phase()),
            Round::Doors(round) => Phase::Tile(round.phase()),
            Round::Blackjack(round) => Phase::Card(round.phase()),
            Round::Cases(spin) => Phase::Loot(spin.phase()),
            Round::Upgrade(round) => Phase::Loot(round.phase()),
        }
    }

    /// Chips owed to the player once the round is terminal. Loot rounds
    /// settle in items and never owe chips.
    pub fn payout(&self) -> Option<u64> {
        match self {
            Round::Bones(round) => round.payout(),
            Round::Doors(round) => round.payout(),
            Round::Blackjack(round) => round.payout(),
            Round::Cases(_) | Round::Upgrade(_) => None,
        }
    }

    /// Player-visible projection of the round.
    pub fn outcome(&self) -> RoundOutcome {
        match self {
            Round::Bones(round) => round.outcome(),
            Round::Doors(round) => round.outcome(),
            Round::Blackjack(round) => round.outcome(),
            Round::Cases(spin) => spin.outcome(),
            Round::Upgrade(round) => round.outcome(),
        }
    }
}
