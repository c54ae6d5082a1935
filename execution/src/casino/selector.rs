//! Weighted selection and shuffling over an injected [RandomSource].
//!
//! Neither operation keeps memory between calls: the same source state
//! always yields the same result.

use super::RandomSource;
use arcade_types::casino::{ODDS_TOLERANCE, ODDS_TOTAL};
use thiserror::Error;

/// A value with its selection weight.
#[derive(Clone, Debug, PartialEq)]
pub struct Weighted<T> {
    pub weight: f64,
    pub value: T,
}

impl<T> Weighted<T> {
    pub fn new(weight: f64, value: T) -> Self {
        Self { weight, value }
    }
}

/// Reasons a weighted pool is rejected at load time.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PoolError {
    #[error("pool is empty")]
    Empty,
    #[error("entry {index} has invalid weight {weight}")]
    InvalidWeight { index: usize, weight: f64 },
    #[error("pool has no positive weight")]
    ZeroTotal,
    #[error("weights sum to {actual}, expected {expected}")]
    BadTotal { expected: f64, actual: f64 },
}

/// A validated, non-empty set of weighted values.
#[derive(Clone, Debug)]
pub struct WeightedPool<T> {
    entries: Vec<Weighted<T>>,
    total: f64,
}

impl<T> WeightedPool<T> {
    /// Build a pool with arbitrary non-negative weights.
    pub fn new(entries: Vec<Weighted<T>>) -> Result<Self, PoolError> {
        if entries.is_empty() {
            return Err(PoolError::Empty);
        }
        for (index, entry) in entries.iter().enumerate() {
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(PoolError::InvalidWeight {
                    index,
                    weight: entry.weight,
                });
            }
        }
        let total: f64 = entries.iter().map(|entry| entry.weight).sum();
        if total <= 0.0 {
            return Err(PoolError::ZeroTotal);
        }
        Ok(Self { entries, total })
    }

    /// Build a pool whose weights are percentages summing to 100.
    pub fn percent(entries: Vec<Weighted<T>>) -> Result<Self, PoolError> {
        let pool = Self::new(entries)?;
        if (pool.total - ODDS_TOTAL).abs() > ODDS_TOLERANCE {
            return Err(PoolError::BadTotal {
                expected: ODDS_TOTAL,
                actual: pool.total,
            });
        }
        Ok(pool)
    }

    pub fn total_weight(&self) -> f64 {
        self.total
    }

    pub fn entries(&self) -> &[Weighted<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the entry selected by one draw.
    ///
    /// A single cumulative left-to-right scan: the first entry whose running
    /// weight exceeds the sample wins. Rounding past the end lands on the
    /// last entry.
    pub fn pick_index<R: RandomSource + ?Sized>(&self, source: &mut R) -> usize {
        let sample = source.next_f64() * self.total;
        let mut cumulative = 0.0;
        for (index, entry) in self.entries.iter().enumerate() {
            cumulative += entry.weight;
            if cumulative > sample {
                return index;
            }
        }
        self.entries.len() - 1
    }

    /// Entry selected by one draw.
    pub fn pick_entry<R: RandomSource + ?Sized>(&self, source: &mut R) -> &Weighted<T> {
        &self.entries[self.pick_index(source)]
    }

    /// Value selected by one draw.
    pub fn pick<R: RandomSource + ?Sized>(&self, source: &mut R) -> &T {
        &self.pick_entry(source).value
    }
}

/// Select one value from `pool` with a single uniform draw.
pub fn pick_weighted<'a, T, R: RandomSource + ?Sized>(
    pool: &'a WeightedPool<T>,
    source: &mut R,
) -> &'a T {
    pool.pick(source)
}

/// Shuffle a slice in place using Fisher-Yates.
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], source: &mut R) {
    for i in (1..items.len()).rev() {
        let j = source.next_index(i + 1);
        items.swap(i, j);
    }
}
