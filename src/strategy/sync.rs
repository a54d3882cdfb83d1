//! Synchronous processing strategy
//!
//! This module provides a synchronous, single-threaded implementation of the
//! ProcessingStrategy trait. It orchestrates a settlement run by coordinating
//! between the SyncReader (for CSV input), the ExpenseLedger (for validation)
//! and the SettlementEngine (for the settlement itself).
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Record validation to `ExpenseLedger`
//! - Settlement to `SettlementEngine`
//! - CSV output to `csv_format::write_settlements_csv` (via the trait default)

use crate::core::{ExpenseLedger, SettlementEngine};
use crate::io::sync_reader::SyncReader;
use crate::strategy::{admit_expense, admit_participant, LedgerFiles, ProcessingStrategy};
use crate::types::{Expense, Participant, Settlement, SettlementConfig, SettlementError};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use expense_settlement_engine::strategy::{LedgerFiles, ProcessingStrategy, SyncProcessingStrategy};
/// use expense_settlement_engine::types::SettlementConfig;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(SettlementConfig::default());
/// let mut output = io::stdout();
///
/// strategy
///     .process(&LedgerFiles::new("expenses.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone)]
pub struct SyncProcessingStrategy {
    config: SettlementConfig,
}

impl SyncProcessingStrategy {
    /// Create a new SyncProcessingStrategy
    pub fn new(config: SettlementConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Load and settle the ledger one row at a time
    ///
    /// This method:
    /// 1. Streams the participants file, if any, into a closed ledger
    /// 2. Streams the expenses file through the ledger's validation
    /// 3. Settles the ledger with a SettlementEngine
    ///
    /// Fatal errors (file not found, I/O errors, arithmetic overflow) are
    /// returned immediately. Malformed or rejected rows are logged and
    /// processing continues.
    fn settle(&self, files: &LedgerFiles) -> Result<(ExpenseLedger, Settlement), SettlementError> {
        let mut ledger = files.empty_ledger();

        if let Some(path) = &files.participants {
            let mut reader = SyncReader::<Participant>::new(path)?;
            while let Some(result) = reader.next() {
                match result {
                    Ok(participant) => {
                        admit_participant(&mut ledger, reader.line(), participant);
                    }
                    Err(e) => tracing::warn!(error = %e, "Skipping participant row"),
                }
            }
        }

        let mut skipped = 0usize;
        let mut reader = SyncReader::<Expense>::new(&files.expenses)?;
        while let Some(result) = reader.next() {
            match result {
                Ok(expense) => {
                    if !admit_expense(&mut ledger, reader.line(), expense) {
                        skipped += 1;
                    }
                }
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(error = %e, "Skipping expense row");
                }
            }
        }

        let engine = SettlementEngine::new(self.config.clone());
        let settlement = ledger.settle(&engine)?;

        tracing::info!(
            participants = ledger.participants().len(),
            expenses = ledger.expenses().len(),
            skipped,
            transactions = settlement.transactions.len(),
            "Settlement complete"
        );

        Ok((ledger, settlement))
    }

    fn config(&self) -> &SettlementConfig {
        &self.config
    }
}
