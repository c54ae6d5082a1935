use super::{GameFamily, InstanceId, InventoryItem, LootPick, Phase, TileKind};
use serde::{Deserialize, Serialize};

/// Why a wager was added to a running blackjack round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WagerReason {
    Double,
    Split,
}

/// Notifications emitted by a session as it moves through a round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    BetPlaced {
        round: u64,
        family: GameFamily,
        wager: u64,
    },
    PhaseChanged {
        round: u64,
        from: Phase,
        to: Phase,
    },
    TileRevealed {
        round: u64,
        index: u8,
        kind: TileKind,
        depth: u8,
        current_payout: f64,
    },
    LevelAdvanced {
        round: u64,
        depth: u8,
        doors: u8,
        trap_count: u8,
    },
    AdditionalWager {
        round: u64,
        amount: u64,
        reason: WagerReason,
    },
    SpinStarted {
        round: u64,
        picks: Vec<LootPick>,
        demo: bool,
        /// Settlement waits for the animation-complete signal.
        deferred: bool,
    },
    ItemsForfeited {
        round: u64,
        instance_ids: Vec<InstanceId>,
    },
    ItemsGranted {
        round: u64,
        items: Vec<InventoryItem>,
    },
    UpgradeResolved {
        round: u64,
        success_chance: f64,
        success: bool,
        /// Pointer position in [0, 100) for the result wheel.
        landing: f64,
    },
    Settled {
        round: u64,
        payout: u64,
    },
}
