//! Skin upgrade gamble.
//!
//! The player puts up items worth `V` for a shot at a target item priced `P`.
//! Success chance is `min(95, V / P * 95)` percent and one uniform draw
//! decides it. The attempt resolves as soon as it is made.

use super::payout::upgrade_chance;
use super::{GameError, RandomSource};
use arcade_types::casino::{Item, LootPhase, RoundOutcome, ODDS_TOTAL};

#[derive(Clone, Debug)]
pub struct UpgradeRound {
    input_value: u64,
    target: Item,
    success_chance: f64,
    success: bool,
    landing: f64,
    phase: LootPhase,
}

impl UpgradeRound {
    /// Roll an upgrade of `input_value` worth of items into `target`.
    pub fn attempt<R: RandomSource + ?Sized>(
        input_value: u64,
        target: Item,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if input_value == 0 || target.price == 0 {
            return Err(GameError::InvalidParameters);
        }
        let success_chance = upgrade_chance(input_value, target.price);
        let roll = rng.next_f64() * ODDS_TOTAL;
        let success = roll < success_chance;
        let landing = landing_position(success, success_chance, rng);

        Ok(Self {
            input_value,
            target,
            success_chance,
            success,
            landing,
            phase: LootPhase::Settled,
        })
    }

    pub fn input_value(&self) -> u64 {
        self.input_value
    }

    pub fn target(&self) -> &Item {
        &self.target
    }

    /// Success chance in percent.
    pub fn success_chance(&self) -> f64 {
        self.success_chance
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn landing(&self) -> f64 {
        self.landing
    }

    pub fn phase(&self) -> LootPhase {
        self.phase
    }

    pub fn outcome(&self) -> RoundOutcome {
        RoundOutcome::UpgradeAttempt {
            input_value: self.input_value,
            target: self.target.clone(),
            success_chance: self.success_chance,
            success: self.success,
        }
    }
}

/// Pointer position in `[0, 100)` for the result wheel.
///
/// The success arc covers `[0, chance)`. The position is drawn after the
/// result and only lands inside the arc on a success.
pub fn landing_position<R: RandomSource + ?Sized>(success: bool, chance: f64, rng: &mut R) -> f64 {
    let chance = chance.clamp(0.0, ODDS_TOTAL);
    let draw = rng.next_f64();
    if success {
        draw * chance
    } else {
        chance + draw * (ODDS_TOTAL - chance)
    }
}
