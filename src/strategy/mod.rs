//! Processing strategy module for settlement pipelines
//!
//! This module defines the Strategy pattern for complete settlement
//! pipelines, encompassing CSV parsing, ledger validation, the settlement
//! engine and CSV output. This allows different processing implementations
//! (synchronous, asynchronous batch) to be selected at runtime.
//!
//! Both strategies produce identical output for the same input.

use crate::cli::StrategyType;
use crate::core::ExpenseLedger;
use crate::io::csv_format::write_settlements_csv;
use crate::types::{Expense, Participant, Settlement, SettlementConfig, SettlementError};
use std::io::Write;
use std::path::PathBuf;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Input files of one settlement run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerFiles {
    /// Expenses CSV
    pub expenses: PathBuf,
    /// Optional participants CSV
    ///
    /// When present the ledger is closed: expenses may only reference these
    /// participants. Without it every referenced id is registered on first use.
    pub participants: Option<PathBuf>,
}

impl LedgerFiles {
    /// Expenses only, with an open ledger
    pub fn new(expenses: impl Into<PathBuf>) -> Self {
        Self {
            expenses: expenses.into(),
            participants: None,
        }
    }

    /// Add a participants file
    pub fn with_participants(mut self, participants: impl Into<PathBuf>) -> Self {
        self.participants = Some(participants.into());
        self
    }

    /// Empty ledger matching these files
    fn empty_ledger(&self) -> ExpenseLedger {
        if self.participants.is_some() {
            ExpenseLedger::new()
        } else {
            ExpenseLedger::open()
        }
    }
}

/// Processing strategy trait for complete settlement pipelines
///
/// Each strategy must be able to load a ledger from CSV files and compute
/// its settlement. Writing the result is shared by all strategies.
pub trait ProcessingStrategy: Send + Sync {
    /// Load the ledger from `files` and settle it
    ///
    /// # Returns
    ///
    /// * `Ok((ledger, settlement))` if processing completed, possibly with
    ///   skipped rows
    /// * `Err(SettlementError)` if a fatal error occurred
    ///
    /// # Errors
    ///
    /// Returns an error if an input file cannot be opened or read, or if
    /// the accumulated debts leave the decimal range.
    ///
    /// Malformed rows and rows rejected by the ledger are logged and skipped;
    /// they never cause this method to return an error.
    fn settle(&self, files: &LedgerFiles) -> Result<(ExpenseLedger, Settlement), SettlementError>;

    /// Settlement options used by this strategy
    fn config(&self) -> &SettlementConfig;

    /// Settle the ledger in `files` and write the transactions as CSV
    ///
    /// # Errors
    ///
    /// Everything `settle` can return, plus `Output` if writing fails.
    fn process(&self, files: &LedgerFiles, output: &mut dyn Write) -> Result<(), SettlementError> {
        let (ledger, settlement) = self.settle(files)?;
        write_settlements_csv(
            &settlement.transactions,
            ledger.participants(),
            self.config(),
            output,
        )
    }
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `batch` - Optional configuration for async batch processing (ignored for sync)
/// * `settlement` - Tolerance and output options shared by both strategies
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    batch: Option<BatchConfig>,
    settlement: SettlementConfig,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(settlement)),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(
            batch.unwrap_or_default(),
            settlement,
        )),
    }
}

/// Register a participant row, logging and skipping rejected ones
fn admit_participant(ledger: &mut ExpenseLedger, line: u64, participant: Participant) -> bool {
    match ledger.add_participant(participant) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(line, error = %e, "Skipping participant");
            false
        }
    }
}

/// Add an expense row to the ledger, logging and skipping rejected ones
fn admit_expense(ledger: &mut ExpenseLedger, line: u64, expense: Expense) -> bool {
    match ledger.add_expense(expense) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(line, error = %e, "Skipping expense");
            false
        }
    }
}
