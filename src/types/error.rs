//! Error types for the expense settlement engine
//!
//! This module defines all error types that can occur while loading a ledger
//! and producing a settlement. Errors are designed to be descriptive and
//! user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, output failures
//! - **CSV Parsing Errors**: Malformed CSV, invalid amounts or participant ids
//! - **Ledger Errors**: Negative amounts, unknown participants, duplicate ids
//! - **Arithmetic Errors**: Debt sums or balances outside the decimal range
//!
//! Invalid expenses are excluded from the settlement computation rather than
//! reported. The computation only fails when a sum overflows, or when an
//! accumulation task dies.

use crate::types::{ExpenseId, ParticipantId};
use rust_decimal::Decimal;
use std::path::Path;
use thiserror::Error;

/// Main error type for the settlement engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettlementError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading input files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// This is a recoverable error - the malformed record is skipped
    /// and processing continues with the next record.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Amount field could not be read as a decimal number
    #[error("Invalid amount '{amount}' for expense {expense}")]
    InvalidAmount {
        /// The invalid amount string
        amount: String,
        /// Expense ID
        expense: ExpenseId,
    },

    /// Expense amount is negative
    ///
    /// Rejected at the ledger boundary; the aggregator also excludes such
    /// records if one reaches it.
    #[error("Negative amount {amount} for expense {expense}")]
    NegativeAmount {
        /// The rejected amount
        amount: Decimal,
        /// Expense ID
        expense: ExpenseId,
    },

    /// A payer or contributor field is not a participant id
    #[error("Invalid participant id '{value}' for expense {expense}")]
    InvalidParticipantId {
        /// The text that failed to parse
        value: String,
        /// Expense ID
        expense: ExpenseId,
    },

    /// Expense refers to a participant the ledger does not know
    #[error("Unknown participant {participant} referenced by expense {expense}")]
    UnknownParticipant {
        /// Participant ID that was not found
        participant: ParticipantId,
        /// Expense ID
        expense: ExpenseId,
    },

    /// Participant ID registered twice
    #[error("Duplicate participant ID {participant}")]
    DuplicateParticipant {
        /// Participant ID that is duplicated
        participant: ParticipantId,
    },

    /// Expense ID added twice
    #[error("Duplicate expense ID {expense}")]
    DuplicateExpense {
        /// Expense ID that is duplicated
        expense: ExpenseId,
    },

    /// Expense not found for an edit operation
    #[error("Expense {expense} not found for {operation}")]
    ExpenseNotFound {
        /// Expense ID that was not found
        expense: ExpenseId,
        /// Operation that failed
        operation: String,
    },

    /// A CSV record was read but rejected, with its line for context
    #[error("Line {line}: {source}")]
    InvalidRecord {
        /// Line number of the record, header is line 1
        line: u64,
        /// Why the record was rejected
        source: Box<SettlementError>,
    },

    /// A debt sum or balance left the decimal range
    ///
    /// This is a fatal error: no settlement is produced from partial sums.
    #[error("Arithmetic overflow in {operation} for participant {participant}")]
    ArithmeticOverflow {
        /// Stage that would overflow
        operation: String,
        /// Participant whose sum overflowed
        participant: ParticipantId,
    },

    /// A concurrent accumulation task failed to complete
    #[error("Accumulation task failed: {message}")]
    TaskFailed {
        /// Description of the failure
        message: String,
    },

    /// Settlement output could not be written
    #[error("Output error: {message}")]
    Output {
        /// Description of the write failure
        message: String,
    },
}

// Conversion from io::Error to SettlementError
impl From<std::io::Error> for SettlementError {
    fn from(error: std::io::Error) -> Self {
        SettlementError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to SettlementError
impl From<csv::Error> for SettlementError {
    fn from(error: csv::Error) -> Self {
        // Extract line number if available
        let line = error.position().map(|pos| pos.line());

        SettlementError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Conversion from csv_async::Error to SettlementError
// The message already carries the record position.
impl From<csv_async::Error> for SettlementError {
    fn from(error: csv_async::Error) -> Self {
        SettlementError::ParseError {
            line: None,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl SettlementError {
    /// Create an error for a file that could not be opened
    ///
    /// Missing files map to `FileNotFound`; anything else keeps the path in
    /// an `IoError` message.
    pub fn open_failed(path: &Path, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            SettlementError::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            SettlementError::IoError {
                message: format!("Failed to open file '{}': {}", path.display(), error),
            }
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: &str, expense: ExpenseId) -> Self {
        SettlementError::InvalidAmount {
            amount: amount.to_string(),
            expense,
        }
    }

    /// Create a NegativeAmount error
    pub fn negative_amount(amount: Decimal, expense: ExpenseId) -> Self {
        SettlementError::NegativeAmount { amount, expense }
    }

    /// Create an InvalidParticipantId error
    pub fn invalid_participant_id(value: &str, expense: ExpenseId) -> Self {
        SettlementError::InvalidParticipantId {
            value: value.to_string(),
            expense,
        }
    }

    /// Create an UnknownParticipant error
    pub fn unknown_participant(participant: ParticipantId, expense: ExpenseId) -> Self {
        SettlementError::UnknownParticipant {
            participant,
            expense,
        }
    }

    /// Create a DuplicateParticipant error
    pub fn duplicate_participant(participant: ParticipantId) -> Self {
        SettlementError::DuplicateParticipant { participant }
    }

    /// Create a DuplicateExpense error
    pub fn duplicate_expense(expense: ExpenseId) -> Self {
        SettlementError::DuplicateExpense { expense }
    }

    /// Create an ExpenseNotFound error
    pub fn expense_not_found(expense: ExpenseId, operation: &str) -> Self {
        SettlementError::ExpenseNotFound {
            expense,
            operation: operation.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, participant: ParticipantId) -> Self {
        SettlementError::ArithmeticOverflow {
            operation: operation.to_string(),
            participant,
        }
    }

    /// Create a TaskFailed error
    pub fn task_failed(error: impl std::fmt::Display) -> Self {
        SettlementError::TaskFailed {
            message: error.to_string(),
        }
    }

    /// Attach a line number to a record-level error
    pub fn at_line(self, line: u64) -> Self {
        SettlementError::InvalidRecord {
            line,
            source: Box::new(self),
        }
    }

    /// Create an Output error
    pub fn output(message: impl std::fmt::Display) -> Self {
        SettlementError::Output {
            message: message.to_string(),
        }
    }
}
