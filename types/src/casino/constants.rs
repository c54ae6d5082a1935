/// Number of tiles on a bones grid.
pub const BONES_GRID_SIZE: u8 = 25;

/// Fewest traps a bones grid may hide.
pub const BONES_MIN_TRAPS: u8 = 1;

/// Most traps a bones grid may hide (at least one safe tile must remain).
pub const BONES_MAX_TRAPS: u8 = BONES_GRID_SIZE - 1;

/// Long-run return of the transcribed bones multiplier table.
pub const BONES_TARGET_RTP: f64 = 0.97;

/// Doors on the first level of a door run.
pub const DOORS_INITIAL: u8 = 10;

/// House edge applied once to a door run's cumulative multiplier.
pub const DOORS_HOUSE_EDGE: f64 = 0.99;

/// Dealer keeps drawing while below this value.
pub const DEALER_STAND_VALUE: u8 = 17;

/// Best possible blackjack hand value.
pub const BLACKJACK_VALUE: u8 = 21;

/// Maximum number of hands a split sequence may produce.
pub const MAX_HANDS: usize = 4;

/// Maximum cards in a blackjack hand.
pub const MAX_HAND_SIZE: usize = 11;

/// Upper bound on upgrade success chance, in percent.
pub const UPGRADE_MAX_CHANCE: f64 = 95.0;

/// Case item odds must sum to this value.
pub const ODDS_TOTAL: f64 = 100.0;

/// Allowed drift when checking that odds sum to [ODDS_TOTAL].
pub const ODDS_TOLERANCE: f64 = 1e-6;

/// Most cases that can be opened in one batch spin.
pub const MAX_BATCH_SPIN: u8 = 10;
