//! Asynchronous batch processing strategy
//!
//! This module provides an asynchronous, multi-threaded implementation of the
//! ProcessingStrategy trait. Expenses are read in batches and their directed
//! debts are accumulated in parallel with payer-based partitioning.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── ExpenseLedger (sequential validation)
//!     ├── BatchProcessor (payer partitioning + tokio tasks)
//!     │   └── AsyncDebtAggregator (DashMap of undivided debt sums)
//!     └── SettlementEngine (netting, balances, matching on the snapshot)
//! ```
//!
//! # Ordering
//!
//! - Batches are processed sequentially, each one awaited before the next read
//! - Within a batch, every payer's expenses run on their own task in file order
//! - Validation happens before partitioning, in file order, so duplicate and
//!   unknown-participant checks see exactly what the sync strategy sees
//! - A failed payer task aborts the run; no settlement is computed from
//!   partial sums

use crate::core::aggregator::resolve_splits;
use crate::core::r#async::{AsyncDebtAggregator, BatchProcessor};
use crate::core::{ExpenseLedger, SettlementEngine};
use crate::io::async_reader::AsyncReader;
use crate::strategy::{admit_expense, admit_participant, LedgerFiles, ProcessingStrategy};
use crate::types::{Expense, Participant, Settlement, SettlementConfig, SettlementError};
use std::path::Path;
use std::sync::Arc;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

/// Configuration for batch processing
///
/// Controls how expenses are batched and the number of worker threads
/// for parallel accumulation within each batch.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of expense rows per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                batch_size,
                default = default.batch_size,
                "Invalid batch_size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            tracing::warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "Invalid max_concurrent_batches, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// Produces the same ledger and settlement as `SyncProcessingStrategy`; only
/// debt accumulation is spread across tasks.
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    /// Batch processing configuration
    config: BatchConfig,
    /// Tolerance and output options
    settlement: SettlementConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy
    ///
    /// # Arguments
    ///
    /// * `config` - BatchConfig with batch_size and max_concurrent_batches
    /// * `settlement` - Tolerance and output options
    pub fn new(config: BatchConfig, settlement: SettlementConfig) -> Self {
        Self { config, settlement }
    }

    /// Batch configuration in use
    pub fn batch_config(&self) -> &BatchConfig {
        &self.config
    }

    async fn open(path: &Path) -> Result<Compat<tokio::fs::File>, SettlementError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| SettlementError::open_failed(path, e))?;

        // csv-async reads futures::io::AsyncRead
        Ok(file.compat())
    }

    async fn load_participants(
        &self,
        files: &LedgerFiles,
        ledger: &mut ExpenseLedger,
    ) -> Result<(), SettlementError> {
        let Some(path) = &files.participants else {
            return Ok(());
        };

        let mut reader: AsyncReader<_, Participant> = AsyncReader::new(Self::open(path).await?);
        for (line, participant) in reader.read_all(self.config.batch_size).await {
            admit_participant(ledger, line, participant);
        }

        Ok(())
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Load and settle the ledger with batched, partitioned accumulation
    ///
    /// This method:
    /// 1. Creates a tokio multi-threaded runtime
    /// 2. Loads the participants file, if any, into a closed ledger
    /// 3. Reads expenses in batches using AsyncReader
    /// 4. Validates each batch through the ledger in file order
    /// 5. Accumulates the accepted expenses with the BatchProcessor,
    ///    waiting for completion before reading the next batch
    /// 6. Resolves a sorted snapshot of the sums and settles the debts
    ///
    /// Fatal errors (file not found, I/O errors, runtime errors, arithmetic
    /// overflow, failed tasks) are returned immediately. Malformed or rejected rows are logged and skipped.
    fn settle(&self, files: &LedgerFiles) -> Result<(ExpenseLedger, Settlement), SettlementError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| SettlementError::IoError {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(async {
            let mut ledger = files.empty_ledger();
            self.load_participants(files, &mut ledger).await?;

            let aggregator = Arc::new(AsyncDebtAggregator::new());
            let processor = BatchProcessor::new(Arc::clone(&aggregator));

            let mut reader: AsyncReader<_, Expense> =
                AsyncReader::new(Self::open(&files.expenses).await?);
            let mut rejected = 0usize;

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                let mut accepted = Vec::with_capacity(batch.len());
                for (line, expense) in batch {
                    if admit_expense(&mut ledger, line, expense.clone()) {
                        accepted.push(expense);
                    } else {
                        rejected += 1;
                    }
                }

                let recorded = processor.process_batch(accepted).await?;
                tracing::debug!(recorded, keys = aggregator.len(), "Batch accumulated");
            }

            let engine = SettlementEngine::new(self.settlement.clone());
            let debts = resolve_splits(&aggregator.snapshot())?;
            let settlement = engine.compute_from_debts(&debts)?;

            tracing::info!(
                participants = ledger.participants().len(),
                expenses = ledger.expenses().len(),
                skipped = reader.skipped() + rejected,
                transactions = settlement.transactions.len(),
                "Settlement complete"
            );

            Ok((ledger, settlement))
        })
    }

    fn config(&self) -> &SettlementConfig {
        &self.settlement
    }
}
