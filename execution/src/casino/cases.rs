//! Case opening.
//!
//! A spin of N cases draws N independent items from the case's weighted
//! pool the moment it starts. A single full-animation spin stays `Spinning`
//! until the presentation layer reports the animation for its outcome is
//! done; batch and quick spins settle immediately.

use super::selector::{PoolError, Weighted, WeightedPool};
use super::{GameError, RandomSource};
use arcade_types::casino::{
    Case, Item, LootPhase, LootPick, RoundOutcome, SpinMode, MAX_BATCH_SPIN,
};

/// A case with its validated item pool.
#[derive(Clone, Debug)]
pub struct LootTable {
    case: Case,
    pool: WeightedPool<Item>,
}

impl LootTable {
    /// Validate a case definition. Odds must sum to 100.
    pub fn new(case: Case) -> Result<Self, PoolError> {
        let entries = case
            .items
            .iter()
            .map(|entry| Weighted::new(entry.odds, entry.item.clone()))
            .collect();
        let pool = WeightedPool::percent(entries)?;
        Ok(Self { case, pool })
    }

    pub fn case(&self) -> &Case {
        &self.case
    }

    pub fn id(&self) -> u32 {
        self.case.id
    }

    pub fn price(&self) -> u64 {
        self.case.price
    }

    /// Price of opening `count` cases at once.
    pub fn spin_cost(&self, count: u8) -> u64 {
        self.case.price.saturating_mul(count as u64)
    }

    pub fn pool(&self) -> &WeightedPool<Item> {
        &self.pool
    }

    /// Draw one item.
    pub fn draw<R: RandomSource + ?Sized>(&self, outcome_id: u64, rng: &mut R) -> LootPick {
        let entry = self.pool.pick_entry(rng);
        LootPick {
            outcome_id,
            item: entry.value.clone(),
            odds: entry.weight,
        }
    }

    /// Expected item value of one opening.
    pub fn expected_value(&self) -> f64 {
        self.pool
            .entries()
            .iter()
            .map(|entry| entry.weight / self.pool.total_weight() * entry.value.price as f64)
            .sum()
    }
}

#[derive(Clone, Debug)]
pub struct CaseSpin {
    case_id: u32,
    mode: SpinMode,
    demo: bool,
    picks: Vec<LootPick>,
    /// Outcomes still waiting on their animation.
    pending: Vec<u64>,
    phase: LootPhase,
}

impl CaseSpin {
    /// Draw `count` outcomes. Outcome ids are assigned consecutively from
    /// `first_outcome_id`.
    pub fn start<R: RandomSource + ?Sized>(
        table: &LootTable,
        count: u8,
        mode: SpinMode,
        demo: bool,
        first_outcome_id: u64,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if count == 0 || count > MAX_BATCH_SPIN {
            return Err(GameError::InvalidParameters);
        }
        let picks: Vec<LootPick> = (0..count as u64)
            .map(|i| table.draw(first_outcome_id + i, rng))
            .collect();

        let deferred = count == 1 && mode == SpinMode::Full;
        let (pending, phase) = if deferred {
            (
                picks.iter().map(|pick| pick.outcome_id).collect(),
                LootPhase::Spinning,
            )
        } else {
            (Vec::new(), LootPhase::Settled)
        };

        Ok(Self {
            case_id: table.id(),
            mode,
            demo,
            picks,
            pending,
            phase,
        })
    }

    /// Record that the animation for `outcome_id` has finished.
    ///
    /// Returns `true` once no outcome is left pending and the spin settles.
    pub fn animation_complete(&mut self, outcome_id: u64) -> Result<bool, GameError> {
        if self.phase == LootPhase::Settled {
            return Err(GameError::GameAlreadyComplete);
        }
        let Some(slot) = self.pending.iter().position(|&id| id == outcome_id) else {
            return Err(GameError::InvalidMove);
        };
        self.pending.swap_remove(slot);
        if self.pending.is_empty() {
            self.phase = LootPhase::Settled;
            return Ok(true);
        }
        Ok(false)
    }

    /// Whether settlement waited on an animation signal.
    pub fn is_deferred(&self) -> bool {
        self.picks.len() == 1 && self.mode == SpinMode::Full
    }

    pub fn case_id(&self) -> u32 {
        self.case_id
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }

    pub fn picks(&self) -> &[LootPick] {
        &self.picks
    }

    pub fn items(&self) -> Vec<Item> {
        self.picks.iter().map(|pick| pick.item.clone()).collect()
    }

    /// Summed reference price of everything drawn.
    pub fn value(&self) -> u64 {
        self.picks
            .iter()
            .map(|pick| pick.item.price)
            .fold(0u64, u64::saturating_add)
    }

    pub fn phase(&self) -> LootPhase {
        self.phase
    }

    pub fn outcome(&self) -> RoundOutcome {
        RoundOutcome::LootPick {
            picks: self.picks.clone(),
            demo: self.demo,
        }
    }
}

/// Build a decorative reel of `len` items with `winner` at index `stop`.
///
/// Filler slots are drawn from the case's own pool so the reel looks like
/// the odds; the winner was decided before this is called.
pub fn reel_strip<R: RandomSource + ?Sized>(
    table: &LootTable,
    winner: &Item,
    len: usize,
    stop: usize,
    rng: &mut R,
) -> Vec<Item> {
    if len == 0 {
        return Vec::new();
    }
    let stop = stop.min(len - 1);
    (0..len)
        .map(|slot| {
            if slot == stop {
                winner.clone()
            } else {
                table.pool.pick(rng).clone()
            }
        })
        .collect()
}
