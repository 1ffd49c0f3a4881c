use super::ledger::Expense;
use super::money::{Balance, round_cents};
use super::participant::ParticipantId;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;

/// The portion of an expense charged to one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Share {
    pub participant: ParticipantId,
    pub amount: Balance,
}

/// Decides how an expense is divided among participants.
///
/// Implementations must return shares that sum exactly to the expense amount.
pub trait SplitPolicy: Send + Sync {
    /// `participants` is every registered participant, ordered by id.
    fn split(&self, expense: &Expense, participants: &[ParticipantId]) -> Result<Vec<Share>>;
}

pub type SplitPolicyBox = Box<dyn SplitPolicy>;

impl<P: SplitPolicy + ?Sized> SplitPolicy for Box<P> {
    fn split(&self, expense: &Expense, participants: &[ParticipantId]) -> Result<Vec<Share>> {
        (**self).split(expense, participants)
    }
}

/// Divides an expense evenly among its sharing participants.
///
/// The sharing set is `expense.shared_with`, or every participant when that
/// list is empty. Each share is rounded half-to-even to the cent; whatever
/// cents rounding leaves over are absorbed by the payer's own share, so the
/// payer's credit is exactly what the others are debited. When the payer is
/// not sharing, the lowest-id sharer absorbs them instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualSplit;

impl SplitPolicy for EqualSplit {
    fn split(&self, expense: &Expense, participants: &[ParticipantId]) -> Result<Vec<Share>> {
        let mut sharers = if expense.shared_with.is_empty() {
            participants.to_vec()
        } else {
            expense.shared_with.clone()
        };
        sharers.sort_unstable();
        sharers.dedup();

        let Some(&first) = sharers.first() else {
            return Err(LedgerError::consistency(format!(
                "expense {} has nobody to share it",
                expense.id
            )));
        };

        let total = expense.amount.value();
        let count = Decimal::from(sharers.len());
        let even = round_cents(total / count);
        let residual = total - even * count;
        let absorber = if sharers.contains(&expense.payer) {
            expense.payer
        } else {
            first
        };

        Ok(sharers
            .into_iter()
            .map(|participant| {
                let amount = if participant == absorber {
                    even + residual
                } else {
                    even
                };
                Share {
                    participant,
                    amount: Balance::new(amount),
                }
            })
            .collect())
    }
}
