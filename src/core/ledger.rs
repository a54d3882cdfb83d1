//! Expense ledger
//!
//! This module provides the `ExpenseLedger`, the validation boundary in front
//! of the settlement engine. It holds the current participants and expenses
//! and offers the editing operations of a shared-expense form: adding and
//! removing expenses, choosing the payer, changing the amount and toggling
//! contributors.
//!
//! The ledger rejects records that could never be settled correctly
//! (negative amounts, duplicate ids, unknown participants). Records that are
//! merely incomplete, such as an expense without a payer yet, are accepted
//! and stay inert until completed.
//!
//! A ledger is either *closed*, where every participant must be registered
//! up front, or *open*, where participants referenced by an expense are
//! registered on first use under their id.

use crate::core::engine::SettlementEngine;
use crate::types::{Expense, ExpenseId, Participant, ParticipantId, Settlement, SettlementError};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Participants and expenses awaiting settlement
#[derive(Debug, Clone, Default)]
pub struct ExpenseLedger {
    /// Registered participants in registration order
    participants: Vec<Participant>,
    /// Position of each registered participant in `participants`
    participant_index: HashMap<ParticipantId, usize>,
    /// Expenses in insertion order
    expenses: Vec<Expense>,
    /// Position of each current expense in `expenses`
    expense_index: HashMap<ExpenseId, usize>,
    /// Register unknown participants instead of rejecting them
    open: bool,
}

impl ExpenseLedger {
    /// Create an empty closed ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty open ledger
    pub fn open() -> Self {
        ExpenseLedger {
            open: true,
            ..Self::default()
        }
    }

    /// Create a closed ledger with the given participants
    ///
    /// # Errors
    ///
    /// Returns `DuplicateParticipant` if an id appears twice.
    pub fn with_participants(
        participants: impl IntoIterator<Item = Participant>,
    ) -> Result<Self, SettlementError> {
        let mut ledger = Self::new();
        for participant in participants {
            ledger.add_participant(participant)?;
        }
        Ok(ledger)
    }

    /// Whether unknown participants are registered on first use
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Register a participant
    ///
    /// # Errors
    ///
    /// Returns `DuplicateParticipant` if the id is already registered.
    pub fn add_participant(&mut self, participant: Participant) -> Result<(), SettlementError> {
        if self.participant_index.contains_key(&participant.id) {
            return Err(SettlementError::duplicate_participant(participant.id));
        }
        self.register(participant);
        Ok(())
    }

    /// Look up a participant by id
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participant_index
            .get(&id)
            .map(|&index| &self.participants[index])
    }

    /// Registered participants in registration order
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Current expenses in insertion order
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Look up an expense by id
    pub fn expense(&self, id: ExpenseId) -> Option<&Expense> {
        self.expense_index
            .get(&id)
            .map(|&index| &self.expenses[index])
    }

    /// Add an expense
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The expense id is already in the ledger
    /// - The amount is negative
    /// - The ledger is closed and the expense names an unregistered participant
    pub fn add_expense(&mut self, expense: Expense) -> Result<(), SettlementError> {
        if self.expense_index.contains_key(&expense.id) {
            return Err(SettlementError::duplicate_expense(expense.id));
        }
        Self::check_amount(expense.amount, expense.id)?;

        let referenced: Vec<ParticipantId> = expense.participant_ids().collect();
        for &id in &referenced {
            self.check_participant(id, expense.id)?;
        }
        for id in referenced {
            self.register_on_use(id);
        }

        self.expense_index.insert(expense.id, self.expenses.len());
        self.expenses.push(expense);
        Ok(())
    }

    /// Remove an expense, returning it
    ///
    /// # Errors
    ///
    /// Returns `ExpenseNotFound` if no expense has this id.
    pub fn remove_expense(&mut self, id: ExpenseId) -> Result<Expense, SettlementError> {
        let index = self.position(id, "remove")?;
        self.expense_index.remove(&id);
        let removed = self.expenses.remove(index);
        for (position, expense) in self.expenses.iter().enumerate().skip(index) {
            self.expense_index.insert(expense.id, position);
        }
        Ok(removed)
    }

    /// Choose or clear the payer of an expense
    ///
    /// # Errors
    ///
    /// Returns an error if the expense does not exist or, in a closed
    /// ledger, the payer is not registered.
    pub fn set_payer(
        &mut self,
        id: ExpenseId,
        payer: Option<ParticipantId>,
    ) -> Result<(), SettlementError> {
        let index = self.position(id, "set payer")?;
        if let Some(payer) = payer {
            self.check_participant(payer, id)?;
            self.register_on_use(payer);
        }

        self.expenses[index].payer = payer;
        Ok(())
    }

    /// Change the amount of an expense
    ///
    /// # Errors
    ///
    /// Returns an error if the expense does not exist or the amount is negative.
    pub fn set_amount(&mut self, id: ExpenseId, amount: Decimal) -> Result<(), SettlementError> {
        let index = self.position(id, "set amount")?;
        Self::check_amount(amount, id)?;
        self.expenses[index].amount = amount;
        Ok(())
    }

    /// Add a contributor to an expense, or remove them if already present
    ///
    /// Returns `true` if the participant now shares the expense.
    ///
    /// # Errors
    ///
    /// Returns an error if the expense does not exist or, in a closed
    /// ledger, the participant is not registered.
    pub fn toggle_contributor(
        &mut self,
        id: ExpenseId,
        participant: ParticipantId,
    ) -> Result<bool, SettlementError> {
        let index = self.position(id, "toggle contributor")?;
        self.check_participant(participant, id)?;
        self.register_on_use(participant);

        let contributors = &mut self.expenses[index].contributors;
        if contributors.remove(&participant) {
            Ok(false)
        } else {
            contributors.insert(participant);
            Ok(true)
        }
    }

    /// Compute the settlement of the current expenses
    ///
    /// Works on a snapshot: the ledger is not modified and later edits do
    /// not affect the returned value.
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the expenses sum beyond the decimal
    /// range.
    pub fn settle(&self, engine: &SettlementEngine) -> Result<Settlement, SettlementError> {
        engine.compute(&self.participants, &self.expenses)
    }

    fn position(&self, id: ExpenseId, operation: &str) -> Result<usize, SettlementError> {
        self.expense_index
            .get(&id)
            .copied()
            .ok_or_else(|| SettlementError::expense_not_found(id, operation))
    }

    fn check_amount(amount: Decimal, expense: ExpenseId) -> Result<(), SettlementError> {
        if amount < Decimal::ZERO {
            return Err(SettlementError::negative_amount(amount, expense));
        }
        Ok(())
    }

    fn check_participant(
        &self,
        participant: ParticipantId,
        expense: ExpenseId,
    ) -> Result<(), SettlementError> {
        if self.open || self.participant_index.contains_key(&participant) {
            Ok(())
        } else {
            Err(SettlementError::unknown_participant(participant, expense))
        }
    }

    fn register_on_use(&mut self, participant: ParticipantId) {
        if self.open && !self.participant_index.contains_key(&participant) {
            self.register(Participant::unnamed(participant));
        }
    }

    fn register(&mut self, participant: Participant) {
        self.participant_index
            .insert(participant.id, self.participants.len());
        self.participants.push(participant);
    }
}
