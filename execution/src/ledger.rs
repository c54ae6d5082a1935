use arcade_types::casino::{InstanceId, InventoryItem, Item};
use std::{
    collections::BTreeMap,
    future::Future,
    sync::{Mutex, MutexGuard, PoisonError},
};
use thiserror::Error;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("insufficient funds: have {balance}, need {requested}")]
    InsufficientFunds { balance: u64, requested: u64 },
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("unknown item instance {0}")]
    UnknownItem(InstanceId),
    #[error("no items given")]
    Empty,
}

/// Balance collaborator.
///
/// Debits are authoritative: an implementation may reject one for any
/// reason and callers must not assume a debit will go through because a
/// balance looked sufficient earlier. Both calls may suspend.
pub trait Ledger {
    /// Take a positive amount from the balance.
    fn debit(&self, amount: u64) -> impl Future<Output = Result<(), LedgerError>>;

    /// Add a non-negative amount to the balance.
    fn credit(&self, amount: u64) -> impl Future<Output = Result<(), LedgerError>>;
}

/// Item collaborator for the loot family.
pub trait Inventory {
    /// Store items, returning the owned copies with fresh instance ids.
    fn add(&self, items: Vec<Item>) -> Result<Vec<InventoryItem>, InventoryError>;

    /// Remove every listed instance, or none of them.
    fn remove(&self, instance_ids: &[InstanceId]) -> Result<Vec<InventoryItem>, InventoryError>;

    /// Look up an owned instance.
    fn get(&self, instance_id: InstanceId) -> Option<InventoryItem>;
}

/// A completed ledger call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entry {
    Debit(u64),
    Credit(u64),
}

#[derive(Default)]
struct Book {
    balance: u64,
    journal: Vec<Entry>,
    items: BTreeMap<InstanceId, Item>,
    next_instance: InstanceId,
}

/// In-memory ledger and inventory.
#[derive(Default)]
pub struct Memory {
    book: Mutex<Book>,
}

impl Memory {
    pub fn new(balance: u64) -> Self {
        Self {
            book: Mutex::new(Book {
                balance,
                ..Book::default()
            }),
        }
    }

    fn book(&self) -> MutexGuard<'_, Book> {
        self.book.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn balance(&self) -> u64 {
        self.book().balance
    }

    /// Every applied debit and credit, oldest first.
    pub fn journal(&self) -> Vec<Entry> {
        self.book().journal.clone()
    }

    pub fn credits(&self) -> Vec<u64> {
        self.book()
            .journal
            .iter()
            .filter_map(|entry| match entry {
                Entry::Credit(amount) => Some(*amount),
                Entry::Debit(_) => None,
            })
            .collect()
    }

    pub fn debits(&self) -> Vec<u64> {
        self.book()
            .journal
            .iter()
            .filter_map(|entry| match entry {
                Entry::Debit(amount) => Some(*amount),
                Entry::Credit(_) => None,
            })
            .collect()
    }

    pub fn items(&self) -> Vec<InventoryItem> {
        self.book()
            .items
            .iter()
            .map(|(&instance_id, item)| InventoryItem {
                instance_id,
                item: item.clone(),
            })
            .collect()
    }
}

impl Ledger for Memory {
    async fn debit(&self, amount: u64) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let mut book = self.book();
        if book.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                balance: book.balance,
                requested: amount,
            });
        }
        book.balance -= amount;
        book.journal.push(Entry::Debit(amount));
        debug!(amount, balance = book.balance, "debited");
        Ok(())
    }

    async fn credit(&self, amount: u64) -> Result<(), LedgerError> {
        let mut book = self.book();
        book.balance = book.balance.saturating_add(amount);
        book.journal.push(Entry::Credit(amount));
        debug!(amount, balance = book.balance, "credited");
        Ok(())
    }
}

impl Inventory for Memory {
    fn add(&self, items: Vec<Item>) -> Result<Vec<InventoryItem>, InventoryError> {
        if items.is_empty() {
            return Err(InventoryError::Empty);
        }
        let mut book = self.book();
        let mut added = Vec::with_capacity(items.len());
        for item in items {
            let instance_id = book.next_instance;
            book.next_instance += 1;
            book.items.insert(instance_id, item.clone());
            added.push(InventoryItem { instance_id, item });
        }
        Ok(added)
    }

    fn remove(&self, instance_ids: &[InstanceId]) -> Result<Vec<InventoryItem>, InventoryError> {
        if instance_ids.is_empty() {
            return Err(InventoryError::Empty);
        }
        let mut book = self.book();
        let mut seen = Vec::with_capacity(instance_ids.len());
        for &id in instance_ids {
            if !book.items.contains_key(&id) || seen.contains(&id) {
                return Err(InventoryError::UnknownItem(id));
            }
            seen.push(id);
        }
        Ok(instance_ids
            .iter()
            .filter_map(|&instance_id| {
                book.items
                    .remove(&instance_id)
                    .map(|item| InventoryItem { instance_id, item })
            })
            .collect())
    }

    fn get(&self, instance_id: InstanceId) -> Option<InventoryItem> {
        self.book()
            .items
            .get(&instance_id)
            .map(|item| InventoryItem {
                instance_id,
                item: item.clone(),
            })
    }
}
