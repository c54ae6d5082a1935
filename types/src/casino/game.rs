use serde::{Deserialize, Serialize};

/// Game families offered by the arcade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameFamily {
    /// Tile-reveal grid with an escalating payout table.
    Bones,
    /// Progressive multi-level door run.
    Doors,
    Blackjack,
    /// Weighted case opening.
    Cases,
    /// Skin-upgrade gamble.
    Upgrade,
}

impl GameFamily {
    pub const ALL: [GameFamily; 5] = [
        GameFamily::Bones,
        GameFamily::Doors,
        GameFamily::Blackjack,
        GameFamily::Cases,
        GameFamily::Upgrade,
    ];
}

/// Risk tier of a door run; selects how many doors on a level are traps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Share of doors that hide a trap, in percent.
    pub fn trap_percent(self) -> u32 {
        match self {
            RiskTier::Low => 10,
            RiskTier::Medium => 30,
            RiskTier::High => 50,
        }
    }
}

/// Contents of a tile or door.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Safe,
    Trap,
}

/// Phases of the tile-reveal family (bones and doors).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TilePhase {
    Config,
    Active,
    Busted,
    CashedOut,
}

/// Phases of the card game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardPhase {
    Betting,
    PlayerTurn,
    DealerTurn,
    Finished,
}

/// Phases of the loot family (case opening and upgrades).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LootPhase {
    Idle,
    Spinning,
    Settled,
}

/// Phase of any session, keyed by family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", content = "phase", rename_all = "snake_case")]
pub enum Phase {
    Tile(TilePhase),
    Card(CardPhase),
    Loot(LootPhase),
}

impl Phase {
    /// Phase a session of `family` starts in and returns to on reset.
    pub fn initial(family: GameFamily) -> Self {
        match family {
            GameFamily::Bones | GameFamily::Doors => Phase::Tile(TilePhase::Config),
            GameFamily::Blackjack => Phase::Card(CardPhase::Betting),
            GameFamily::Cases | GameFamily::Upgrade => Phase::Loot(LootPhase::Idle),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::Tile(TilePhase::Busted | TilePhase::CashedOut)
                | Phase::Card(CardPhase::Finished)
                | Phase::Loot(LootPhase::Settled)
        )
    }

    /// Position in the forward order of the family's phases. Terminal
    /// phases share the last position.
    pub fn ordinal(self) -> u8 {
        match self {
            Phase::Tile(TilePhase::Config) => 0,
            Phase::Tile(TilePhase::Active) => 1,
            Phase::Tile(TilePhase::Busted | TilePhase::CashedOut) => 2,
            Phase::Card(CardPhase::Betting) => 0,
            Phase::Card(CardPhase::PlayerTurn) => 1,
            Phase::Card(CardPhase::DealerTurn) => 2,
            Phase::Card(CardPhase::Finished) => 3,
            Phase::Loot(LootPhase::Idle) => 0,
            Phase::Loot(LootPhase::Spinning) => 1,
            Phase::Loot(LootPhase::Settled) => 2,
        }
    }

    /// Whether moving from `self` to `next` goes forward within one family.
    pub fn can_advance_to(self, next: Phase) -> bool {
        let same_family = matches!(
            (self, next),
            (Phase::Tile(_), Phase::Tile(_))
                | (Phase::Card(_), Phase::Card(_))
                | (Phase::Loot(_), Phase::Loot(_))
        );
        same_family && !self.is_terminal() && next.ordinal() > self.ordinal()
    }
}

/// Status of a single blackjack hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandStatus {
    Playing,
    Stood,
    Bust,
    Blackjack,
}

impl HandStatus {
    pub fn is_resolved(self) -> bool {
        !matches!(self, HandStatus::Playing)
    }
}

/// How a single case opening is presented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinMode {
    /// Settlement waits for the presentation layer to finish its animation.
    #[default]
    Full,
    /// Settle as soon as the outcome is drawn.
    Quick,
}
