//! Settlement matching
//!
//! Greedy minimum-cash-flow matching: the participant owing the most pays the
//! participant owed the most, as much as either side allows, until one side
//! runs out.
//!
//! Both sides are sorted by descending magnitude with ties broken by
//! ascending participant id. That fixed order is what makes repeated runs on
//! the same balances produce the same transaction list.

use crate::types::{Balances, ParticipantId, SettlementTransaction};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Remaining debt or credit of one participant during matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    id: ParticipantId,
    remaining: Decimal,
}

/// Matches net debtors to net creditors
#[derive(Debug, Clone, Copy)]
pub struct SettlementMatcher {
    epsilon: Decimal,
}

impl SettlementMatcher {
    /// Create a SettlementMatcher using `epsilon` as the settled threshold
    pub fn new(epsilon: Decimal) -> Self {
        SettlementMatcher { epsilon }
    }

    /// Split balances into sorted payers and receivers
    ///
    /// Payers hold debt magnitudes (`-balance`), receivers hold credits.
    /// Balances within epsilon of zero are settled and left out.
    fn partition(&self, balances: &Balances) -> (Vec<Position>, Vec<Position>) {
        let mut payers = Vec::new();
        let mut receivers = Vec::new();

        for (&id, &balance) in balances {
            if balance < -self.epsilon {
                payers.push(Position {
                    id,
                    remaining: -balance,
                });
            } else if balance > self.epsilon {
                receivers.push(Position {
                    id,
                    remaining: balance,
                });
            }
        }

        let canonical = |a: &Position, b: &Position| {
            b.remaining.cmp(&a.remaining).then(a.id.cmp(&b.id))
        };
        payers.sort_by(canonical);
        receivers.sort_by(canonical);

        (payers, receivers)
    }

    /// Produce the payments that settle every balance
    ///
    /// Each step pays `min(payer remaining, receiver remaining)` and advances
    /// whichever cursor dropped to epsilon or below. A repeated `(from, to)`
    /// pair is summed into its first transaction. Leftovers within epsilon are
    /// never emitted.
    pub fn settle(&self, balances: &Balances) -> Vec<SettlementTransaction> {
        let (mut payers, mut receivers) = self.partition(balances);

        let mut transactions: Vec<SettlementTransaction> = Vec::new();
        let mut index: HashMap<(ParticipantId, ParticipantId), usize> = HashMap::new();

        let (mut i, mut j) = (0, 0);
        while i < payers.len() && j < receivers.len() {
            let payer = &mut payers[i];
            let receiver = &mut receivers[j];
            let amount = payer.remaining.min(receiver.remaining);

            match index.get(&(payer.id, receiver.id)) {
                Some(&position) => transactions[position].amount += amount,
                None => {
                    index.insert((payer.id, receiver.id), transactions.len());
                    transactions.push(SettlementTransaction::new(payer.id, receiver.id, amount));
                }
            }

            payer.remaining -= amount;
            receiver.remaining -= amount;

            if payer.remaining <= self.epsilon {
                i += 1;
            }
            if receiver.remaining <= self.epsilon {
                j += 1;
            }
        }

        if let Some(payer) = payers.get(i) {
            tracing::trace!(participant = payer.id, remaining = %payer.remaining, "Unmatched debt left after matching");
        }
        if let Some(receiver) = receivers.get(j) {
            tracing::trace!(participant = receiver.id, remaining = %receiver.remaining, "Unmatched credit left after matching");
        }

        transactions
    }
}
