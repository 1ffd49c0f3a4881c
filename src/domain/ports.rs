use super::ledger::{Expense, LedgerSnapshot, NewExpense, NewPayment, Payment};
use super::participant::Participant;
use crate::error::Result;
use async_trait::async_trait;

/// Append-only persistence for a single ledger.
///
/// Every append is atomic: a concurrent `snapshot` sees it entirely or not at all.
/// Records are never updated or removed once stored.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fails with a validation error if the id or username is already taken.
    async fn register_participant(&self, participant: Participant) -> Result<()>;
    /// All participants, ordered by id.
    async fn participants(&self) -> Result<Vec<Participant>>;
    async fn append_expense(&self, expense: NewExpense) -> Result<Expense>;
    async fn append_payment(&self, payment: NewPayment) -> Result<Payment>;
    async fn snapshot(&self) -> Result<LedgerSnapshot>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
