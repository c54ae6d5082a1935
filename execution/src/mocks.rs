//! Test doubles for random sources and ledgers.

use crate::casino::RandomSource;
use crate::ledger::{Inventory, InventoryError, Ledger, LedgerError, Memory};
use crate::scope::Scope;
use arcade_types::casino::{InstanceId, InventoryItem, Item};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Replays a fixed list of draws, starting over at the end.
///
/// An empty script always draws 0.0.
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, cursor: 0 }
    }

    /// Draws consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedSource {
    fn next_f64(&mut self) -> f64 {
        if self.draws.is_empty() {
            return 0.0;
        }
        let draw = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        draw
    }
}

/// When a [TeardownLedger] tears its scope down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Teardown {
    /// Close during the first debit, after it is applied.
    OnDebit,
    /// Close during the first credit, after it is applied.
    OnCredit,
}

/// A [Memory] ledger whose owning context goes away mid-call.
///
/// The ledger call still completes: only the scope is closed.
pub struct TeardownLedger {
    pub inner: Memory,
    scope: Scope,
    when: Teardown,
}

impl TeardownLedger {
    pub fn new(balance: u64, when: Teardown) -> Self {
        Self {
            inner: Memory::new(balance),
            scope: Scope::new(),
            when,
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl Ledger for TeardownLedger {
    async fn debit(&self, amount: u64) -> Result<(), LedgerError> {
        let result = self.inner.debit(amount).await;
        if self.when == Teardown::OnDebit {
            self.scope.close();
        }
        result
    }

    async fn credit(&self, amount: u64) -> Result<(), LedgerError> {
        let result = self.inner.credit(amount).await;
        if self.when == Teardown::OnCredit {
            self.scope.close();
        }
        result
    }
}

impl Inventory for TeardownLedger {
    fn add(&self, items: Vec<Item>) -> Result<Vec<InventoryItem>, InventoryError> {
        self.inner.add(items)
    }

    fn remove(&self, instance_ids: &[InstanceId]) -> Result<Vec<InventoryItem>, InventoryError> {
        self.inner.remove(instance_ids)
    }

    fn get(&self, instance_id: InstanceId) -> Option<InventoryItem> {
        self.inner.get(instance_id)
    }
}

/// A [Memory] ledger that fails its first `failures` credits.
pub struct FlakyLedger {
    pub inner: Memory,
    failures: AtomicUsize,
}

impl FlakyLedger {
    pub fn new(balance: u64, failures: usize) -> Self {
        Self {
            inner: Memory::new(balance),
            failures: AtomicUsize::new(failures),
        }
    }
}

impl Ledger for FlakyLedger {
    async fn debit(&self, amount: u64) -> Result<(), LedgerError> {
        self.inner.debit(amount).await
    }

    async fn credit(&self, amount: u64) -> Result<(), LedgerError> {
        let failed = self
            .failures
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(LedgerError::Unavailable("credit timed out".to_string()));
        }
        self.inner.credit(amount).await
    }
}
