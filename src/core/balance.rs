//! Balance calculation
//!
//! Reduces netted pairwise debts to one signed balance per participant.
//! Every edge moves the same amount out of the debtor and into the creditor,
//! so the balances always sum to zero.

use crate::types::{Balances, NettedPair, SettlementError};
use rust_decimal::Decimal;

/// Reduces netted pairs to per-participant balances
#[derive(Debug, Clone, Copy, Default)]
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Signed net balance of every participant touched by an edge
    ///
    /// Debtors lose the edge amount, creditors gain it. Participants with no
    /// edges are absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if a balance leaves the decimal range.
    pub fn compute(edges: &[NettedPair]) -> Result<Balances, SettlementError> {
        let mut balances = Balances::new();

        for edge in edges {
            let debtor = balances.entry(edge.debtor).or_insert(Decimal::ZERO);
            *debtor = debtor
                .checked_sub(edge.amount)
                .ok_or_else(|| SettlementError::arithmetic_overflow("balance", edge.debtor))?;

            let creditor = balances.entry(edge.creditor).or_insert(Decimal::ZERO);
            *creditor = creditor
                .checked_add(edge.amount)
                .ok_or_else(|| SettlementError::arithmetic_overflow("balance", edge.creditor))?;
        }

        Ok(balances)
    }

    /// Sum of all balances, zero when money is conserved
    ///
    /// Returns `None` if a partial sum leaves the decimal range.
    pub fn total(balances: &Balances) -> Option<Decimal> {
        balances
            .values()
            .try_fold(Decimal::ZERO, |total, &balance| total.checked_add(balance))
    }
}
