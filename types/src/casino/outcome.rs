use super::{Card, HandStatus, Item, LootPick, RiskTier, TileKind};
use serde::{Deserialize, Serialize};

/// A blackjack hand as shown to the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandView {
    pub cards: Vec<Card>,
    pub value: u8,
    pub status: HandStatus,
    /// 1 for the base bet, 2 once doubled.
    pub bet_mult: u8,
}

/// Player-visible projection of a round, keyed by family.
///
/// Tiles and doors are `None` until revealed; the hidden answer key never
/// appears here before the round reaches a terminal phase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundOutcome {
    TileGrid {
        size: u8,
        trap_count: u8,
        tiles: Vec<Option<TileKind>>,
        depth: u8,
        current_payout: f64,
    },
    DoorLevel {
        risk: RiskTier,
        doors: Vec<Option<TileKind>>,
        /// Every level already passed, disclosed once the run ends.
        cleared: Vec<Vec<TileKind>>,
        trap_count: u8,
        depth: u8,
        current_payout: f64,
    },
    CardHand {
        hands: Vec<HandView>,
        active_hand: usize,
        /// The dealer's hole card is hidden while the player acts.
        dealer: Vec<Option<Card>>,
    },
    LootPick {
        picks: Vec<LootPick>,
        demo: bool,
    },
    UpgradeAttempt {
        input_value: u64,
        target: Item,
        success_chance: f64,
        success: bool,
    },
}
