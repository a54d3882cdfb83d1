//! Thread-safe directed debt accumulation
//!
//! `AsyncDebtAggregator` holds the running undivided sums keyed by
//! `(debtor, creditor, ways)` in a `DashMap` so that tasks working on
//! different payers can record expenses concurrently.

use crate::core::aggregator::{expense_splits, SplitSums};
use crate::types::{Expense, ParticipantId, SettlementError};
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Concurrent store of undivided debt sums
///
/// Operations on different keys proceed in parallel; operations on the same
/// key are serialized by the map's shard locks.
#[derive(Debug, Default)]
pub struct AsyncDebtAggregator {
    /// Running sums keyed by `(debtor, creditor, ways)`
    sums: DashMap<(ParticipantId, ParticipantId, u64), Decimal>,
}

impl AsyncDebtAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self {
            sums: DashMap::new(),
        }
    }

    /// Record the debts of one expense
    ///
    /// # Arguments
    ///
    /// * `expense` - The expense to record; inert expenses add nothing
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - The number of directed debts the expense contributed
    /// * `Err(SettlementError)` - A sum would leave the decimal range
    pub fn record(&self, expense: &Expense) -> Result<usize, SettlementError> {
        let splits = expense_splits(expense);
        for split in &splits {
            let mut entry = self
                .sums
                .entry((split.debtor, split.creditor, split.ways))
                .or_insert(Decimal::ZERO);
            let sum = entry.value_mut();
            *sum = sum.checked_add(split.amount).ok_or_else(|| {
                SettlementError::arithmetic_overflow("debt accumulation", split.debtor)
            })?;
        }
        Ok(splits.len())
    }

    /// Copy the current sums into an ordered map
    ///
    /// The snapshot is taken entry by entry; call it only after all writers
    /// have finished.
    pub fn snapshot(&self) -> SplitSums {
        self.sums
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect()
    }

    /// Number of `(debtor, creditor, ways)` keys recorded so far
    pub fn len(&self) -> usize {
        self.sums.len()
    }

    /// Whether no debt has been recorded
    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }
}
