//! Payout tables and formulas.
//!
//! Multipliers are kept as `f64` through a round; an amount only becomes
//! whole chips when it is credited, via [to_credit].

use super::tables::BONES_MULTIPLIERS;
use arcade_types::casino::{
    RiskTier, BONES_GRID_SIZE, BONES_MAX_TRAPS, BONES_MIN_TRAPS, DOORS_HOUSE_EDGE,
    UPGRADE_MAX_CHANCE,
};

/// Bones multiplier after `depth` safe reveals on a grid hiding `trap_count`
/// traps.
///
/// Depth 0 is the stake itself (1x). Returns `None` for a trap count outside
/// 1..=24 or a depth beyond the number of safe tiles.
pub fn bones_multiplier(trap_count: u8, depth: u8) -> Option<f64> {
    if !(BONES_MIN_TRAPS..=BONES_MAX_TRAPS).contains(&trap_count) {
        return None;
    }
    if depth == 0 {
        return Some(1.0);
    }
    BONES_MULTIPLIERS[(trap_count - 1) as usize]
        .get((depth - 1) as usize)
        .copied()
}

/// Deepest reachable depth on a bones grid (every safe tile revealed).
pub fn bones_max_depth(trap_count: u8) -> u8 {
    BONES_GRID_SIZE.saturating_sub(trap_count)
}

/// Number of trap doors on a level with `doors` doors for a risk tier.
///
/// `max(1, round(doors * pct / 100))`, never more than the doors present.
pub fn trap_count_for_tier(risk: RiskTier, doors: u8) -> u8 {
    if doors == 0 {
        return 0;
    }
    let scaled = (doors as u32 * risk.trap_percent() + 50) / 100;
    scaled.clamp(1, doors as u32) as u8
}

/// Cumulative door multiplier after `pick_count` successful picks.
///
/// `prod(doors_i / safe_i) * 0.99` with `doors_i = initial_doors - i`; any
/// level without a safe door zeroes the product. Zero picks is the stake
/// (1x).
pub fn door_multiplier(risk: RiskTier, initial_doors: u8, pick_count: u8) -> f64 {
    if pick_count == 0 {
        return 1.0;
    }
    let mut product = 1.0;
    for i in 0..pick_count {
        let doors = initial_doors.saturating_sub(i);
        let safe = doors.saturating_sub(trap_count_for_tier(risk, doors));
        if safe == 0 {
            return 0.0;
        }
        product *= doors as f64 / safe as f64;
    }
    product * DOORS_HOUSE_EDGE
}

/// Unrounded payout for a wager at a multiplier.
pub fn payout(wager: u64, multiplier: f64) -> f64 {
    wager as f64 * multiplier
}

/// Whole chips credited for an unrounded payout (floored, never negative).
pub fn to_credit(amount: f64) -> u64 {
    if !amount.is_finite() || amount <= 0.0 {
        return 0;
    }
    amount.floor() as u64
}

/// Upgrade success chance in percent: `min(95, input / target * 95)`.
pub fn upgrade_chance(input_value: u64, target_price: u64) -> f64 {
    if target_price == 0 {
        return UPGRADE_MAX_CHANCE;
    }
    let chance = input_value as f64 / target_price as f64 * UPGRADE_MAX_CHANCE;
    chance.min(UPGRADE_MAX_CHANCE)
}
