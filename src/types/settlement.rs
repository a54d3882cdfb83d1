//! Settlement-related types
//!
//! These are the values flowing between the settlement stages:
//! expense splits into the accumulation step, netted pairs out of the
//! aggregator, balances out of the balance calculator, and settlement
//! transactions out of the matcher.

use super::participant::ParticipantId;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// One contributor's part of an expense, before division
///
/// Carries the whole expense amount and the number of contributors it is
/// split between. The debt itself is `amount / ways`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpenseSplit {
    pub debtor: ParticipantId,
    pub creditor: ParticipantId,
    pub ways: u64,
    pub amount: Decimal,
}

/// Net debt between two participants after opposite directions cancel
///
/// At most one exists per unordered pair and its amount is strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NettedPair {
    pub debtor: ParticipantId,
    pub creditor: ParticipantId,
    pub amount: Decimal,
}

/// Signed net position per participant
///
/// Negative means the participant owes, positive means they are owed.
pub type Balances = BTreeMap<ParticipantId, Decimal>;

/// One payment that, together with the rest of the list, zeroes every balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementTransaction {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Decimal,
}

impl SettlementTransaction {
    pub fn new(from: ParticipantId, to: ParticipantId, amount: Decimal) -> Self {
        SettlementTransaction { from, to, amount }
    }
}

/// Result of one settlement computation
///
/// Keeps the intermediate stages alongside the transaction list so callers
/// can show who owes what before and after simplification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settlement {
    /// Netted pairwise debts, ordered by pair
    pub netted: Vec<NettedPair>,
    /// Net balance per participant touched by a netted pair
    pub balances: Balances,
    /// Payments to make, in matcher order
    pub transactions: Vec<SettlementTransaction>,
}

impl Settlement {
    /// Whether nobody owes anybody anything
    pub fn is_settled(&self) -> bool {
        self.transactions.is_empty()
    }
}
