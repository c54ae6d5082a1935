use serde::{Deserialize, Serialize};

/// Unique handle of one owned copy of an item.
pub type InstanceId = u64;

/// A collectible item (skin) with a reference price in chips.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub name: String,
    pub price: u64,
}

/// An entry of a case's item pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseItem {
    #[serde(flatten)]
    pub item: Item,
    /// Probability of this item, in percent. A case's odds sum to 100.
    pub odds: f64,
}

/// A case definition: its opening price and weighted item pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: u32,
    pub name: String,
    pub price: u64,
    pub items: Vec<CaseItem>,
}

impl Case {
    /// Sum of the pool's odds.
    pub fn total_odds(&self) -> f64 {
        self.items.iter().map(|entry| entry.odds).sum()
    }
}

/// An item held in a player's inventory.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryItem {
    pub instance_id: InstanceId,
    pub item: Item,
}

/// One drawn case outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LootPick {
    /// Identifies the outcome for the animation-complete signal.
    pub outcome_id: u64,
    pub item: Item,
    pub odds: f64,
}
