use crate::domain::ledger::{Expense, LedgerSnapshot, Payment};
use crate::domain::money::{Amount, Balance};
use crate::domain::participant::ParticipantId;
use crate::domain::settlement::{Balances, Settlement};
use crate::domain::split::{EqualSplit, SplitPolicy};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

/// Turns a ledger into net balances and suggested settlements.
///
/// `SettlementEngine` is stateless: both operations are pure functions of
/// their input, so the same snapshot always yields the same result.
///
/// Settlement suggestions come from a greedy heuristic. It never needs more
/// than `participants - 1` transfers, but it does not always find the
/// smallest possible set (that problem is NP-hard in general).
pub struct SettlementEngine<P: SplitPolicy = EqualSplit> {
    policy: P,
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self::new(EqualSplit)
    }
}

impl<P: SplitPolicy> SettlementEngine<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    /// Computes the net balance of every participant.
    ///
    /// Each expense credits its payer with the full amount and debits every
    /// sharer their share. Each payment credits its payer and debits its
    /// receiver. Fails with a consistency error if a record references an
    /// unknown participant or the result does not sum to zero.
    pub fn compute_balances(
        &self,
        expenses: &[Expense],
        payments: &[Payment],
        participants: &[ParticipantId],
    ) -> Result<Balances> {
        let balances = self
            .tally(expenses, payments, participants)
            .inspect_err(|e| {
                if let LedgerError::ConsistencyError(msg) = e {
                    tracing::error!(%msg, "ledger is inconsistent");
                }
            })?;

        tracing::debug!(
            participants = balances.len(),
            expenses = expenses.len(),
            payments = payments.len(),
            "balances computed"
        );
        Ok(balances)
    }

    fn tally(
        &self,
        expenses: &[Expense],
        payments: &[Payment],
        participants: &[ParticipantId],
    ) -> Result<Balances> {
        let mut table: BTreeMap<ParticipantId, Balance> = participants
            .iter()
            .map(|&id| (id, Balance::ZERO))
            .collect();

        for expense in expenses {
            let shares = self.policy.split(expense, participants)?;
            let charged = shares
                .iter()
                .try_fold(Balance::ZERO, |acc, s| acc.checked_add(s.amount))
                .ok_or_else(|| {
                    LedgerError::consistency(format!("shares of expense {} overflowed", expense.id))
                })?;
            if charged != Balance::from(expense.amount) {
                return Err(LedgerError::consistency(format!(
                    "shares of expense {} sum to {charged}, expected {}",
                    expense.id, expense.amount
                )));
            }

            credit(&mut table, expense.payer, expense.amount.into())?;
            for share in shares {
                debit(&mut table, share.participant, share.amount)?;
            }
        }

        for payment in payments {
            credit(&mut table, payment.payer, payment.amount.into())?;
            debit(&mut table, payment.receiver, payment.amount.into())?;
        }

        Balances::try_from_map(table)
    }

    /// Computes balances over a whole ledger snapshot.
    pub fn balances_for(&self, snapshot: &LedgerSnapshot) -> Result<Balances> {
        self.compute_balances(
            &snapshot.expenses,
            &snapshot.payments,
            &snapshot.participant_ids(),
        )
    }

    /// Suggests transfers that bring every balance to exactly zero.
    ///
    /// Repeatedly matches the largest debtor with the largest creditor,
    /// breaking ties by ascending participant id, and transfers the smaller
    /// of the two magnitudes.
    pub fn suggest_settlements(&self, balances: &Balances) -> Vec<Settlement> {
        let mut debtors = BinaryHeap::new();
        let mut creditors = BinaryHeap::new();
        for (&id, balance) in balances {
            if balance.is_negative() {
                debtors.push(Position::new(id, balance.abs()));
            } else if balance.is_positive() {
                creditors.push(Position::new(id, balance.abs()));
            }
        }

        let mut settlements = Vec::new();
        while let (Some(debtor), Some(creditor)) = (debtors.pop(), creditors.pop()) {
            let amount = debtor.magnitude.min(creditor.magnitude);
            settlements.push(Settlement {
                payer: debtor.id(),
                receiver: creditor.id(),
                amount: Amount::from_positive(amount),
            });

            if let Some(rest) = debtor.reduced_by(amount) {
                debtors.push(rest);
            }
            if let Some(rest) = creditor.reduced_by(amount) {
                creditors.push(rest);
            }
        }
        // Zero-sum input drains both sides together.
        debug_assert!(debtors.is_empty() && creditors.is_empty());

        tracing::debug!(transfers = settlements.len(), "settlements suggested");
        settlements
    }
}

/// One side of an open position, ordered so the heap yields the largest
/// magnitude first and the lowest id among equals.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Position {
    magnitude: Decimal,
    id: Reverse<ParticipantId>,
}

impl Position {
    fn new(id: ParticipantId, magnitude: Decimal) -> Self {
        Self {
            magnitude,
            id: Reverse(id),
        }
    }

    fn id(&self) -> ParticipantId {
        self.id.0
    }

    fn reduced_by(self, amount: Decimal) -> Option<Self> {
        let magnitude = self.magnitude - amount;
        (magnitude > Decimal::ZERO).then_some(Self { magnitude, ..self })
    }
}

fn credit(
    table: &mut BTreeMap<ParticipantId, Balance>,
    id: ParticipantId,
    amount: Balance,
) -> Result<()> {
    let balance = entry(table, id)?;
    *balance = balance
        .checked_add(amount)
        .ok_or_else(|| overflowed(id))?;
    Ok(())
}

fn debit(
    table: &mut BTreeMap<ParticipantId, Balance>,
    id: ParticipantId,
    amount: Balance,
) -> Result<()> {
    let balance = entry(table, id)?;
    *balance = balance
        .checked_sub(amount)
        .ok_or_else(|| overflowed(id))?;
    Ok(())
}

fn entry(
    table: &mut BTreeMap<ParticipantId, Balance>,
    id: ParticipantId,
) -> Result<&mut Balance> {
    table.get_mut(&id).ok_or_else(|| {
        LedgerError::consistency(format!("ledger references unknown participant {id}"))
    })
}

fn overflowed(id: ParticipantId) -> LedgerError {
    LedgerError::consistency(format!("balance of participant {id} overflowed"))
}
