//! Expense Settlement Engine Library
//! # Overview
//!
//! This library turns a list of shared expenses into the payments that settle
//! them, using a greedy minimum cash flow matching. CSV input can be
//! processed with either a sync or an async strategy.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Participant, Expense, Settlement, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Settlement logic:
//!   - [`core::ledger`] - Validated participants and expenses
//!   - [`core::aggregator`] - Per-pair debt accumulation and netting
//!   - [`core::balance`] - Net balance per participant
//!   - [`core::matcher`] - Debtor to creditor matching
//!   - [`core::engine`] - Orchestration of the stages
//! - [`io`] - CSV reading and writing
//! - [`strategy`] - Complete sync and async pipelines
//! - [`logging`] - tracing subscriber setup
//!
//! # Settlement
//!
//! Every contributor of an expense owes its payer an equal share. Debts
//! between the same two participants are netted, reduced to one balance per
//! participant, and then matched: the largest debtor pays the largest
//! creditor until one of them is settled. Amounts stay exact decimals until
//! they are printed.
//!
//! An expense without a payer or without contributors is inert and takes no
//! part in the settlement.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{
    settle, BalanceCalculator, DebtAggregator, ExpenseLedger, SettlementEngine, SettlementMatcher,
};
pub use io::write_settlements_csv;
pub use types::{
    Balances, Expense, ExpenseId, NettedPair, Participant, ParticipantId, Settlement,
    SettlementConfig, SettlementError, SettlementTransaction,
};
