//! Settlement engine
//!
//! This module provides the SettlementEngine that orchestrates one settlement
//! computation by chaining the DebtAggregator, the BalanceCalculator and the
//! SettlementMatcher.
//!
//! The engine holds no state between calls: every computation starts from the
//! expense snapshot it is given and returns freshly built data, so calling it
//! twice on the same input yields the same result. It fails only when a sum
//! leaves the decimal range, in which case no partial settlement is returned.

use crate::core::aggregator::{DebtAggregator, DebtMap};
use crate::core::balance::BalanceCalculator;
use crate::core::matcher::SettlementMatcher;
use crate::types::{
    Expense, Participant, Settlement, SettlementConfig, SettlementError, SettlementTransaction,
};

/// Settlement computation pipeline
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    config: SettlementConfig,
    aggregator: DebtAggregator,
    matcher: SettlementMatcher,
}

impl SettlementEngine {
    /// Create a new SettlementEngine
    ///
    /// The configured epsilon is shared by the aggregator and the matcher.
    pub fn new(config: SettlementConfig) -> Self {
        SettlementEngine {
            aggregator: DebtAggregator::new(config.epsilon),
            matcher: SettlementMatcher::new(config.epsilon),
            config,
        }
    }

    /// The configuration this engine was built with
    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    /// Compute the full settlement for a set of expenses
    ///
    /// `participants` is used only to validate expense references; expenses
    /// naming anyone else are excluded.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if a debt sum or balance leaves the
    /// decimal range.
    pub fn compute(
        &self,
        participants: &[Participant],
        expenses: &[Expense],
    ) -> Result<Settlement, SettlementError> {
        let debts = self.aggregator.accumulate(participants, expenses)?;
        self.compute_from_debts(&debts)
    }

    /// Compute the settlement from already accumulated directed debts
    pub fn compute_from_debts(&self, debts: &DebtMap) -> Result<Settlement, SettlementError> {
        let netted = self.aggregator.collapse(debts);
        let balances = BalanceCalculator::compute(&netted)?;
        let transactions = self.matcher.settle(&balances);

        tracing::debug!(
            directed = debts.len(),
            netted = netted.len(),
            participants = balances.len(),
            transactions = transactions.len(),
            "Settlement computed"
        );

        Ok(Settlement {
            netted,
            balances,
            transactions,
        })
    }

    /// Payments that settle every obligation among `participants`
    pub fn settle(
        &self,
        participants: &[Participant],
        expenses: &[Expense],
    ) -> Result<Vec<SettlementTransaction>, SettlementError> {
        Ok(self.compute(participants, expenses)?.transactions)
    }
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self::new(SettlementConfig::default())
    }
}

/// Settle expenses with the default tolerance
///
/// ```
/// use expense_settlement_engine::{settle, Expense, Participant};
/// use rust_decimal::Decimal;
///
/// let people = vec![Participant::new(1, "A"), Participant::new(2, "B")];
/// let expenses = vec![
///     Expense::new(1, Decimal::new(100, 0)).paid_by(1).shared_by([1, 2]),
///     Expense::new(2, Decimal::new(60, 0)).paid_by(2).shared_by([1, 2]),
/// ];
///
/// let payments = settle(&people, &expenses)?;
/// assert_eq!(payments.len(), 1);
/// assert_eq!((payments[0].from, payments[0].to), (2, 1));
/// assert_eq!(payments[0].amount, Decimal::new(20, 0));
/// # Ok::<(), expense_settlement_engine::SettlementError>(())
/// ```
pub fn settle(
    participants: &[Participant],
    expenses: &[Expense],
) -> Result<Vec<SettlementTransaction>, SettlementError> {
    SettlementEngine::default().settle(participants, expenses)
}
