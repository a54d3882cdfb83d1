//! Core settlement logic
//!
//! This module contains the settlement pipeline:
//! - `ledger` - Validated participant and expense records
//! - `aggregator` - Per-pair debt accumulation and netting
//! - `balance` - Per-participant net balances
//! - `matcher` - Greedy minimum cash flow matching
//! - `engine` - Orchestration of the three stages
//! - `async` - Concurrent debt accumulation for batched input

pub mod aggregator;
pub mod r#async;
pub mod balance;
pub mod engine;
pub mod ledger;
pub mod matcher;

pub use aggregator::{DebtAggregator, DebtMap, SplitSums};
pub use balance::BalanceCalculator;
pub use engine::{settle, SettlementEngine};
pub use ledger::ExpenseLedger;
pub use matcher::SettlementMatcher;
pub use r#async::{AsyncDebtAggregator, BatchProcessor};
