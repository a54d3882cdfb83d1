//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `participant`: Participant identities
//! - `expense`: Shared-expense records
//! - `settlement`: Debt edges, balances and settlement transactions
//! - `config`: Settlement tolerance and output precision
//! - `error`: Error types for the settlement engine

pub mod config;
pub mod error;
pub mod expense;
pub mod participant;
pub mod settlement;

pub use config::{SettlementConfig, DEFAULT_EPSILON, DEFAULT_PRECISION};
pub use error::SettlementError;
pub use expense::{Expense, ExpenseId};
pub use participant::{Participant, ParticipantId};
pub use settlement::{Balances, ExpenseSplit, NettedPair, Settlement, SettlementTransaction};
