//! Batch processing with payer-based partitioning
//!
//! This module provides the `BatchProcessor` struct, which accumulates
//! batches of validated expenses concurrently by splitting each batch into
//! one sub-batch per payer.
//!
//! A failure in any payer task fails the whole batch: an overflowing sum or a
//! panicked task leaves the shared sums incomplete, so no settlement may be
//! computed from them.
//!
//! # Design
//!
//! Every directed debt an expense produces is owed to its payer, so two
//! expenses with different payers never touch the same `(debtor, creditor)`
//! key. Sub-batches for different payers can run on separate tokio tasks
//! while each payer's expenses are still applied sequentially, in the order
//! they were read.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── Arc<AsyncDebtAggregator>  (shared directed debt sums)
//! ```
//!
//! # Thread Safety
//!
//! The processor is cloneable and can be shared across async tasks. All
//! mutable state lives in the aggregator's DashMap.

use std::collections::HashMap;
use std::sync::Arc;

use super::AsyncDebtAggregator;
use crate::types::{Expense, ParticipantId, SettlementError};

/// Batch processor with payer-based partitioning
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    /// Shared debt accumulator
    ///
    /// Wrapped in Arc so spawned tasks can record into the same map.
    aggregator: Arc<AsyncDebtAggregator>,
}

impl BatchProcessor {
    /// Create a new BatchProcessor
    ///
    /// # Arguments
    ///
    /// * `aggregator` - Arc-wrapped AsyncDebtAggregator the batches are recorded into
    pub fn new(aggregator: Arc<AsyncDebtAggregator>) -> Self {
        Self { aggregator }
    }

    /// The aggregator this processor records into
    pub fn aggregator(&self) -> &Arc<AsyncDebtAggregator> {
        &self.aggregator
    }

    /// Partition a batch of expenses by payer
    ///
    /// # Arguments
    ///
    /// * `batch` - Validated expenses in read order
    ///
    /// # Returns
    ///
    /// A HashMap from payer id to that payer's expenses, in their original
    /// order. Expenses without a payer produce no debts and are dropped.
    pub fn partition_by_payer(&self, batch: Vec<Expense>) -> HashMap<ParticipantId, Vec<Expense>> {
        let mut payer_batches: HashMap<ParticipantId, Vec<Expense>> = HashMap::new();

        for expense in batch {
            match expense.payer {
                Some(payer) => payer_batches.entry(payer).or_default().push(expense),
                None => {
                    tracing::trace!(expense = expense.id, "Dropping expense without payer")
                }
            }
        }

        payer_batches
    }

    /// Record all expenses of a single payer sequentially
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - The number of directed debts recorded
    /// * `Err(SettlementError)` - The first expense whose sums overflowed;
    ///   later expenses are not recorded
    pub async fn process_payer_expenses(
        &self,
        expenses: Vec<Expense>,
    ) -> Result<usize, SettlementError> {
        let mut recorded = 0;
        for expense in &expenses {
            recorded += self.aggregator.record(expense)?;
        }
        Ok(recorded)
    }

    /// Record a batch of expenses with payer-based partitioning
    ///
    /// This method:
    /// 1. Partitions the batch by payer
    /// 2. Spawns one tokio task per payer
    /// 3. Waits for every task before returning
    ///
    /// Waiting for the whole batch keeps batches strictly ordered, so a payer
    /// whose expenses span several batches still has them applied in file
    /// order.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - The number of directed debts recorded across the batch
    /// * `Err(SettlementError)` - A payer task overflowed or panicked. Every
    ///   task is still awaited; the error of the lowest failing payer id is
    ///   returned.
    pub async fn process_batch(&self, batch: Vec<Expense>) -> Result<usize, SettlementError> {
        let mut payer_batches: Vec<_> = self.partition_by_payer(batch).into_iter().collect();
        payer_batches.sort_unstable_by_key(|(payer, _)| *payer);

        let mut tasks = Vec::with_capacity(payer_batches.len());
        for (payer, expenses) in payer_batches {
            let processor = self.clone();
            let task = tokio::spawn(async move {
                processor.process_payer_expenses(expenses).await
            });
            tasks.push((payer, task));
        }

        let mut recorded = 0;
        let mut failure = None;
        for (payer, task) in tasks {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => Err(SettlementError::task_failed(e)),
            };
            match result {
                Ok(count) => recorded += count,
                Err(e) => {
                    tracing::error!(payer, error = %e, "Payer task failed");
                    failure.get_or_insert(e);
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(recorded),
        }
    }
}
