//! Expense records for the expense settlement engine
//!
//! An expense says who paid, how much, and who shares the cost. Only
//! expenses with a payer and at least one contributor produce debts; the
//! rest are inert and skipped by the aggregator.

use super::participant::ParticipantId;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Expense identifier
pub type ExpenseId = u64;

/// A single shared expense
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    /// Unique expense identifier
    pub id: ExpenseId,

    /// Free-form label (e.g. "dinner"); not used by the computation
    pub description: String,

    /// Total cost, must be non-negative
    pub amount: Decimal,

    /// Participant who paid, if chosen yet
    pub payer: Option<ParticipantId>,

    /// Participants sharing the cost equally
    ///
    /// May include the payer, whose own share produces no debt.
    pub contributors: BTreeSet<ParticipantId>,
}

impl Expense {
    /// Create an inert expense with no payer and no contributors
    pub fn new(id: ExpenseId, amount: Decimal) -> Self {
        Expense {
            id,
            description: String::new(),
            amount,
            payer: None,
            contributors: BTreeSet::new(),
        }
    }

    /// Set the payer
    pub fn paid_by(mut self, payer: ParticipantId) -> Self {
        self.payer = Some(payer);
        self
    }

    /// Set the contributors, replacing any existing ones
    pub fn shared_by(mut self, contributors: impl IntoIterator<Item = ParticipantId>) -> Self {
        self.contributors = contributors.into_iter().collect();
        self
    }

    /// Set the description
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether the expense takes part in the computation
    ///
    /// Requires a payer, at least one contributor and a non-negative amount.
    pub fn is_settleable(&self) -> bool {
        self.payer.is_some() && !self.contributors.is_empty() && self.amount >= Decimal::ZERO
    }

    /// Per-contributor share of the amount
    ///
    /// Exact decimal division, no rounding. Returns `None` for expenses that
    /// are not settleable or whose division cannot be represented.
    pub fn share(&self) -> Option<Decimal> {
        if !self.is_settleable() {
            return None;
        }
        let divisor = Decimal::from(self.contributors.len() as u64);
        self.amount.checked_div(divisor)
    }

    /// Every participant id the expense refers to, payer included
    pub fn participant_ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.payer.into_iter().chain(self.contributors.iter().copied())
    }
}
