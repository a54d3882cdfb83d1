//! Debt aggregation
//!
//! This module turns expense records into netted pairwise debts. It works in
//! three steps:
//!
//! 1. **Accumulate**: every contributor of a settleable expense owes the payer
//!    an equal share. Expense amounts are summed per `(debtor, creditor, ways)`
//!    before any division, so the sums are exact and independent of the order
//!    expenses arrive in.
//! 2. **Resolve**: each sum is divided by its number of ways and the shares
//!    are added per `(debtor, creditor)` direction, in key order.
//! 3. **Collapse**: opposite directions between the same two participants are
//!    cancelled against each other, leaving at most one positive edge per pair.
//!
//! Shares are exact decimal quotients and are never rounded here. Every sum is
//! checked; leaving the decimal range is an `ArithmeticOverflow` error.

use crate::types::{
    Expense, ExpenseSplit, NettedPair, Participant, ParticipantId, SettlementError,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Directed debts keyed by `(debtor, creditor)`
///
/// A `BTreeMap` so that iteration, and therefore the collapse output, has a
/// fixed order independent of insertion order.
pub type DebtMap = BTreeMap<(ParticipantId, ParticipantId), Decimal>;

/// Undivided expense amounts keyed by `(debtor, creditor, ways)`
pub type SplitSums = BTreeMap<(ParticipantId, ParticipantId, u64), Decimal>;

/// Splits produced by a single expense
///
/// Each contributor other than the payer owes the payer one share of the
/// amount. Returns an empty vector for inert or invalid expenses (no payer,
/// no contributors, or a negative amount).
pub fn expense_splits(expense: &Expense) -> Vec<ExpenseSplit> {
    let Some(payer) = expense.payer.filter(|_| expense.is_settleable()) else {
        tracing::debug!(expense = expense.id, "Skipping expense excluded from settlement");
        return Vec::new();
    };
    let ways = expense.contributors.len() as u64;

    expense
        .contributors
        .iter()
        .filter(|&&contributor| contributor != payer)
        .map(|&contributor| ExpenseSplit {
            debtor: contributor,
            creditor: payer,
            ways,
            amount: expense.amount,
        })
        .collect()
}

/// Add splits into a map of undivided sums
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if a sum leaves the decimal range. Splits
/// before the failing one stay applied.
pub fn add_splits(
    sums: &mut SplitSums,
    splits: impl IntoIterator<Item = ExpenseSplit>,
) -> Result<(), SettlementError> {
    for split in splits {
        let sum = sums
            .entry((split.debtor, split.creditor, split.ways))
            .or_insert(Decimal::ZERO);
        *sum = sum
            .checked_add(split.amount)
            .ok_or_else(|| SettlementError::arithmetic_overflow("debt accumulation", split.debtor))?;
    }
    Ok(())
}

/// Divide every undivided sum and add the shares per direction
///
/// # Errors
///
/// Returns `ArithmeticOverflow` if the debt in one direction leaves the
/// decimal range.
pub fn resolve_splits(sums: &SplitSums) -> Result<DebtMap, SettlementError> {
    let mut debts = DebtMap::new();

    for (&(debtor, creditor, ways), &sum) in sums {
        let overflow = || SettlementError::arithmetic_overflow("debt resolution", debtor);
        let share = sum.checked_div(Decimal::from(ways)).ok_or_else(overflow)?;
        let debt = debts.entry((debtor, creditor)).or_insert(Decimal::ZERO);
        *debt = debt.checked_add(share).ok_or_else(overflow)?;
    }

    Ok(debts)
}

/// Turns expenses into netted pairwise debts
#[derive(Debug, Clone, Copy)]
pub struct DebtAggregator {
    epsilon: Decimal,
}

impl DebtAggregator {
    /// Create a DebtAggregator using `epsilon` as the zero tolerance for netting
    pub fn new(epsilon: Decimal) -> Self {
        DebtAggregator { epsilon }
    }

    /// Sum directed debts across all expenses
    ///
    /// Expenses that reference a participant missing from `participants` are
    /// excluded, as are inert and invalid expenses.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if a sum leaves the decimal range.
    pub fn accumulate(
        &self,
        participants: &[Participant],
        expenses: &[Expense],
    ) -> Result<DebtMap, SettlementError> {
        let known: BTreeSet<ParticipantId> = participants.iter().map(|p| p.id).collect();
        let mut sums = SplitSums::new();

        for expense in expenses {
            if let Some(unknown) = expense.participant_ids().find(|id| !known.contains(id)) {
                tracing::debug!(
                    expense = expense.id,
                    participant = unknown,
                    "Skipping expense with unknown participant"
                );
                continue;
            }
            add_splits(&mut sums, expense_splits(expense))?;
        }

        resolve_splits(&sums)
    }

    /// Cancel opposite directions between each pair of participants
    ///
    /// For every unordered pair `{a, b}` with a debt in either direction,
    /// `net = D[a→b] − D[b→a]`. A net above epsilon becomes `a→b`, one below
    /// minus epsilon becomes `b→a`, anything else cancels out.
    ///
    /// The result is ordered by `(smaller id, larger id)` of each pair.
    pub fn collapse(&self, debts: &DebtMap) -> Vec<NettedPair> {
        let mut seen: BTreeSet<(ParticipantId, ParticipantId)> = BTreeSet::new();
        let mut pairs = Vec::new();

        for (&(debtor, creditor), &amount) in debts {
            let pair = (debtor.min(creditor), debtor.max(creditor));
            if !seen.insert(pair) {
                continue;
            }

            let reverse = debts
                .get(&(creditor, debtor))
                .copied()
                .unwrap_or(Decimal::ZERO);
            let net = amount - reverse;

            if net > self.epsilon {
                pairs.push(NettedPair {
                    debtor,
                    creditor,
                    amount: net,
                });
            } else if net < -self.epsilon {
                pairs.push(NettedPair {
                    debtor: creditor,
                    creditor: debtor,
                    amount: -net,
                });
            }
        }

        pairs.sort_by_key(|p| (p.debtor.min(p.creditor), p.debtor.max(p.creditor)));
        pairs
    }

    /// Accumulate and collapse in one step
    pub fn aggregate(
        &self,
        participants: &[Participant],
        expenses: &[Expense],
    ) -> Result<Vec<NettedPair>, SettlementError> {
        Ok(self.collapse(&self.accumulate(participants, expenses)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_EPSILON;

    fn participants(ids: &[ParticipantId]) -> Vec<Participant> {
        ids.iter().map(|&id| Participant::unnamed(id)).collect()
    }

    fn pair(debtor: ParticipantId, creditor: ParticipantId, amount: Decimal) -> NettedPair {
        NettedPair {
            debtor,
            creditor,
            amount,
        }
    }

    fn split(debtor: ParticipantId, creditor: ParticipantId, ways: u64, amount: i64) -> ExpenseSplit {
        ExpenseSplit {
            debtor,
            creditor,
            ways,
            amount: Decimal::new(amount, 0),
        }
    }

    #[test]
    fn test_expense_splits_exclude_payer() {
        let expense = Expense::new(1, Decimal::new(300, 0))
            .paid_by(1)
            .shared_by([1, 2, 3]);

        assert_eq!(
            expense_splits(&expense),
            vec![split(2, 1, 3, 300), split(3, 1, 3, 300)]
        );
    }

    #[test]
    fn test_expense_splits_inert_expenses() {
        let no_payer = Expense::new(1, Decimal::new(10, 0)).shared_by([1, 2]);
        let no_contributors = Expense::new(2, Decimal::new(10, 0)).paid_by(1);
        let negative = Expense::new(3, Decimal::new(-10, 0))
            .paid_by(1)
            .shared_by([1, 2]);
        let only_payer = Expense::new(4, Decimal::new(10, 0))
            .paid_by(1)
            .shared_by([1]);

        assert!(expense_splits(&no_payer).is_empty());
        assert!(expense_splits(&no_contributors).is_empty());
        assert!(expense_splits(&negative).is_empty());
        assert!(expense_splits(&only_payer).is_empty());
    }

    #[test]
    fn test_resolve_divides_each_group_once() {
        let mut sums = SplitSums::new();
        add_splits(&mut sums, [split(2, 1, 3, 100), split(2, 1, 3, 200), split(2, 1, 2, 50)]).unwrap();

        assert_eq!(sums.len(), 2);
        assert_eq!(sums[&(2, 1, 3)], Decimal::new(300, 0));

        let debts = resolve_splits(&sums).unwrap();
        assert_eq!(debts[&(2, 1)], Decimal::new(125, 0));
    }

    #[test]
    fn test_add_splits_overflow() {
        let mut sums = SplitSums::new();
        let large = ExpenseSplit {
            debtor: 2,
            creditor: 1,
            ways: 1,
            amount: "50000000000000000000000000000".parse().unwrap(),
        };

        add_splits(&mut sums, [large]).unwrap();
        assert_eq!(
            add_splits(&mut sums, [large]).unwrap_err(),
            SettlementError::ArithmeticOverflow {
                operation: "debt accumulation".to_string(),
                participant: 2
            }
        );
    }

    #[test]
    fn test_resolve_overflow_across_groups() {
        let mut sums = SplitSums::new();
        sums.insert((2, 1, 1), Decimal::MAX);
        sums.insert((2, 1, 2), Decimal::MAX);

        assert!(matches!(
            resolve_splits(&sums),
            Err(SettlementError::ArithmeticOverflow { participant: 2, .. })
        ));
    }

    #[test]
    fn test_aggregate_single_expense() {
        let aggregator = DebtAggregator::new(DEFAULT_EPSILON);
        let expenses = vec![Expense::new(1, Decimal::new(300, 0))
            .paid_by(1)
            .shared_by([1, 2, 3])];

        let pairs = aggregator
            .aggregate(&participants(&[1, 2, 3]), &expenses)
            .unwrap();
        assert_eq!(
            pairs,
            vec![
                pair(2, 1, Decimal::new(100, 0)),
                pair(3, 1, Decimal::new(100, 0))
            ]
        );
    }

    #[test]
    fn test_aggregate_nets_opposite_directions() {
        let aggregator = DebtAggregator::new(DEFAULT_EPSILON);
        let expenses = vec![
            Expense::new(1, Decimal::new(100, 0))
                .paid_by(1)
                .shared_by([1, 2]),
            Expense::new(2, Decimal::new(60, 0))
                .paid_by(2)
                .shared_by([1, 2]),
        ];

        let pairs = aggregator
            .aggregate(&participants(&[1, 2]), &expenses)
            .unwrap();
        assert_eq!(pairs, vec![pair(2, 1, Decimal::new(20, 0))]);
    }

    #[test]
    fn test_aggregate_reverses_direction_when_net_negative() {
        let aggregator = DebtAggregator::new(DEFAULT_EPSILON);
        let expenses = vec![
            Expense::new(1, Decimal::new(20, 0))
                .paid_by(1)
                .shared_by([1, 2]),
            Expense::new(2, Decimal::new(100, 0))
                .paid_by(2)
                .shared_by([1, 2]),
        ];

        let pairs = aggregator
            .aggregate(&participants(&[1, 2]), &expenses)
            .unwrap();
        assert_eq!(pairs, vec![pair(1, 2, Decimal::new(40, 0))]);
    }

    #[test]
    fn test_aggregate_drops_exactly_cancelled_pair() {
        let aggregator = DebtAggregator::new(DEFAULT_EPSILON);
        let expenses = vec![
            Expense::new(1, Decimal::new(50, 0))
                .paid_by(1)
                .shared_by([1, 2]),
            Expense::new(2, Decimal::new(50, 0))
                .paid_by(2)
                .shared_by([1, 2]),
        ];

        assert!(aggregator
            .aggregate(&participants(&[1, 2]), &expenses)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_collapse_absorbs_drift_below_epsilon() {
        let aggregator = DebtAggregator::new(DEFAULT_EPSILON);
        let mut debts = DebtMap::new();
        debts.insert((1, 2), Decimal::new(100_000_000_001, 10));
        debts.insert((2, 1), Decimal::new(10, 0));

        assert!(aggregator.collapse(&debts).is_empty());
    }

    #[test]
    fn test_collapse_keeps_small_genuine_debt() {
        let aggregator = DebtAggregator::new(DEFAULT_EPSILON);
        let mut debts = DebtMap::new();
        debts.insert((1, 2), Decimal::new(1, 2));

        assert_eq!(
            aggregator.collapse(&debts),
            vec![pair(1, 2, Decimal::new(1, 2))]
        );
    }

    #[test]
    fn test_collapse_one_edge_per_pair_all_positive() {
        let aggregator = DebtAggregator::new(DEFAULT_EPSILON);
        let mut debts = DebtMap::new();
        debts.insert((1, 2), Decimal::new(30, 0));
        debts.insert((2, 1), Decimal::new(10, 0));
        debts.insert((3, 1), Decimal::new(5, 0));
        debts.insert((1, 3), Decimal::new(25, 0));
        debts.insert((2, 3), Decimal::new(7, 0));

        let pairs = aggregator.collapse(&debts);
        assert_eq!(
            pairs,
            vec![
                pair(1, 2, Decimal::new(20, 0)),
                pair(1, 3, Decimal::new(20, 0)),
                pair(2, 3, Decimal::new(7, 0)),
            ]
        );
        assert!(pairs.iter().all(|p| p.amount > Decimal::ZERO));
    }

    #[test]
    fn test_accumulate_sums_same_direction() {
        let aggregator = DebtAggregator::new(DEFAULT_EPSILON);
        let expenses = vec![
            Expense::new(1, Decimal::new(10, 0))
                .paid_by(1)
                .shared_by([1, 2]),
            Expense::new(2, Decimal::new(30, 0))
                .paid_by(1)
                .shared_by([2]),
        ];

        let debts = aggregator
            .accumulate(&participants(&[1, 2]), &expenses)
            .unwrap();
        assert_eq!(debts.len(), 1);
        assert_eq!(debts[&(2, 1)], Decimal::new(35, 0));
    }

    #[test]
    fn test_accumulate_skips_unknown_participants() {
        let aggregator = DebtAggregator::new(DEFAULT_EPSILON);
        let expenses = vec![
            Expense::new(1, Decimal::new(10, 0))
                .paid_by(1)
                .shared_by([1, 9]),
            Expense::new(2, Decimal::new(10, 0))
                .paid_by(9)
                .shared_by([1, 2]),
            Expense::new(3, Decimal::new(10, 0))
                .paid_by(1)
                .shared_by([1, 2]),
        ];

        let debts = aggregator
            .accumulate(&participants(&[1, 2]), &expenses)
            .unwrap();
        assert_eq!(debts.len(), 1);
        assert_eq!(debts[&(2, 1)], Decimal::new(5, 0));
    }

    #[test]
    fn test_cycle_collapses_to_three_edges() {
        let aggregator = DebtAggregator::new(DEFAULT_EPSILON);
        let expenses = vec![
            Expense::new(1, Decimal::new(30, 0)).paid_by(2).shared_by([1]),
            Expense::new(2, Decimal::new(30, 0)).paid_by(3).shared_by([2]),
            Expense::new(3, Decimal::new(30, 0)).paid_by(1).shared_by([3]),
        ];

        let pairs = aggregator
            .aggregate(&participants(&[1, 2, 3]), &expenses)
            .unwrap();
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn test_accumulate_independent_of_expense_order() {
        let aggregator = DebtAggregator::new(DEFAULT_EPSILON);
        let mut expenses = vec![
            Expense::new(1, Decimal::new(10000, 2)).paid_by(1).shared_by([1, 2, 3]),
            Expense::new(2, Decimal::new(1000, 2)).paid_by(1).shared_by([1, 2, 3, 4, 5, 6, 7]),
            Expense::new(3, Decimal::new(4999, 2)).paid_by(1).shared_by([2, 3, 4, 5, 6, 7]),
            Expense::new(4, Decimal::new(12345, 2)).paid_by(1).shared_by([1, 2, 3]),
            Expense::new(5, Decimal::new(7, 1)).paid_by(1).shared_by([2, 3, 4, 5, 6, 7]),
        ];
        let people = participants(&[1, 2, 3, 4, 5, 6, 7]);

        let forward = aggregator.accumulate(&people, &expenses).unwrap();
        expenses.reverse();
        let backward = aggregator.accumulate(&people, &expenses).unwrap();
        expenses.swap(0, 3);
        let shuffled = aggregator.accumulate(&people, &expenses).unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_accumulate_rejects_overflowing_sum() {
        let aggregator = DebtAggregator::new(DEFAULT_EPSILON);
        let large: Decimal = "50000000000000000000000000000".parse().unwrap();
        let expenses = vec![
            Expense::new(1, large).paid_by(1).shared_by([2]),
            Expense::new(2, large).paid_by(1).shared_by([2]),
        ];

        assert!(matches!(
            aggregator.accumulate(&participants(&[1, 2]), &expenses),
            Err(SettlementError::ArithmeticOverflow { participant: 2, .. })
        ));
    }
}
