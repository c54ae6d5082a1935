//! Bones: a tile-reveal game with an escalating payout table.
//!
//! A 25-tile grid hides `trap_count` bones. Every safe reveal moves one row
//! down the multiplier table; a bone ends the round with nothing. The player
//! may cash out after the first safe reveal.
//!
//! The full layout is shuffled before the first reveal and kept apart from
//! the player-visible tiles until the round ends.

use super::payout::{bones_max_depth, bones_multiplier, payout, to_credit};
use super::selector::shuffle;
use super::{GameError, GameResult, RandomSource};
use arcade_types::casino::{
    RoundOutcome, TileKind, TilePhase, BONES_GRID_SIZE, BONES_MAX_TRAPS, BONES_MIN_TRAPS,
};

/// Bones move types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    /// Reveal the tile at an index (0-24).
    Reveal(u8),
    /// Take the current payout.
    Cashout,
}

/// Validated bones parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BonesSetup {
    trap_count: u8,
}

impl BonesSetup {
    pub fn new(trap_count: u8) -> Result<Self, GameError> {
        if !(BONES_MIN_TRAPS..=BONES_MAX_TRAPS).contains(&trap_count) {
            return Err(GameError::InvalidParameters);
        }
        Ok(Self { trap_count })
    }

    pub fn trap_count(&self) -> u8 {
        self.trap_count
    }
}

impl Default for BonesSetup {
    fn default() -> Self {
        Self { trap_count: 3 }
    }
}

#[derive(Clone, Debug)]
pub struct BonesRound {
    wager: u64,
    trap_count: u8,
    hidden: Vec<TileKind>,
    visible: Vec<Option<TileKind>>,
    depth: u8,
    current_payout: f64,
    phase: TilePhase,
}

impl BonesRound {
    /// Shuffle a fresh grid and open the round.
    pub fn start<R: RandomSource + ?Sized>(wager: u64, setup: BonesSetup, rng: &mut R) -> Self {
        let safe = (BONES_GRID_SIZE - setup.trap_count) as usize;
        let mut hidden = vec![TileKind::Safe; safe];
        hidden.resize(BONES_GRID_SIZE as usize, TileKind::Trap);
        shuffle(&mut hidden, rng);
        Self::open(wager, setup.trap_count, hidden)
    }

    /// Open a round over a fixed layout.
    pub fn with_layout(wager: u64, hidden: Vec<TileKind>) -> Result<Self, GameError> {
        if hidden.len() != BONES_GRID_SIZE as usize {
            return Err(GameError::InvalidParameters);
        }
        let traps = hidden.iter().filter(|&&kind| kind == TileKind::Trap).count() as u8;
        let setup = BonesSetup::new(traps)?;
        Ok(Self::open(wager, setup.trap_count, hidden))
    }

    fn open(wager: u64, trap_count: u8, hidden: Vec<TileKind>) -> Self {
        Self {
            wager,
            trap_count,
            visible: vec![None; hidden.len()],
            hidden,
            depth: 0,
            current_payout: payout(wager, 1.0),
            phase: TilePhase::Active,
        }
    }

    pub fn process_move(&mut self, mv: Move) -> Result<GameResult, GameError> {
        match self.phase {
            TilePhase::Active => {}
            TilePhase::Busted | TilePhase::CashedOut => return Err(GameError::GameAlreadyComplete),
            TilePhase::Config => return Err(GameError::InvalidState),
        }

        match mv {
            Move::Reveal(index) => self.reveal(index),
            Move::Cashout => {
                if self.depth == 0 {
                    return Err(GameError::InvalidMove);
                }
                Ok(self.cash_out())
            }
        }
    }

    fn reveal(&mut self, index: u8) -> Result<GameResult, GameError> {
        let slot = index as usize;
        let kind = *self.hidden.get(slot).ok_or(GameError::InvalidMove)?;
        if self.visible[slot].is_some() {
            return Err(GameError::InvalidMove);
        }
        self.visible[slot] = Some(kind);

        if kind == TileKind::Trap {
            self.phase = TilePhase::Busted;
            self.current_payout = 0.0;
            self.disclose();
            return Ok(GameResult::Loss);
        }

        self.depth += 1;
        let multiplier =
            bones_multiplier(self.trap_count, self.depth).ok_or(GameError::InvalidState)?;
        self.current_payout = payout(self.wager, multiplier);

        // Every safe tile found
        if self.depth == bones_max_depth(self.trap_count) {
            return Ok(self.cash_out());
        }
        Ok(GameResult::Continue)
    }

    fn cash_out(&mut self) -> GameResult {
        self.phase = TilePhase::CashedOut;
        self.disclose();
        match to_credit(self.current_payout) {
            0 => GameResult::Loss,
            amount => GameResult::Win(amount),
        }
    }

    /// Copy the answer key into the visible grid.
    fn disclose(&mut self) {
        self.visible = self.hidden.iter().copied().map(Some).collect();
    }

    pub fn wager(&self) -> u64 {
        self.wager
    }

    pub fn trap_count(&self) -> u8 {
        self.trap_count
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn phase(&self) -> TilePhase {
        self.phase
    }

    /// Unrounded payout if the player cashed out now.
    pub fn current_payout(&self) -> f64 {
        self.current_payout
    }

    pub fn visible(&self) -> &[Option<TileKind>] {
        &self.visible
    }

    /// Full layout, for tests that need to steer reveals.
    #[cfg(any(test, feature = "mocks"))]
    pub fn answer_key(&self) -> &[TileKind] {
        &self.hidden
    }

    /// Chips owed once the round is terminal.
    pub fn payout(&self) -> Option<u64> {
        match self.phase {
            TilePhase::CashedOut => Some(to_credit(self.current_payout)),
            TilePhase::Busted => Some(0),
            TilePhase::Config | TilePhase::Active => None,
        }
    }

    pub fn outcome(&self) -> RoundOutcome {
        RoundOutcome::TileGrid {
            size: BONES_GRID_SIZE,
            trap_count: self.trap_count,
            tiles: self.visible.clone(),
            depth: self.depth,
            current_payout: self.current_payout,
        }
    }
}
