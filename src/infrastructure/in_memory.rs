use crate::domain::ledger::{
    Expense, ExpenseId, LedgerSnapshot, NewExpense, NewPayment, Payment, PaymentId,
};
use crate::domain::participant::{Participant, ParticipantId};
use crate::domain::ports::LedgerStore;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct LedgerState {
    participants: BTreeMap<ParticipantId, Participant>,
    expenses: Vec<Expense>,
    payments: Vec<Payment>,
}

/// A thread-safe in-memory ledger.
///
/// All state lives behind one `Arc<RwLock<..>>`: appends take the write lock,
/// snapshots take the read lock, so a snapshot never observes half an append.
/// Ideal for testing or deployments where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn register_participant(&self, participant: Participant) -> Result<()> {
        let mut state = self.state.write().await;
        if state.participants.contains_key(&participant.id) {
            return Err(LedgerError::validation(format!(
                "Participant {} already exists",
                participant.id
            )));
        }
        if state
            .participants
            .values()
            .any(|p| p.username == participant.username)
        {
            return Err(LedgerError::validation(format!(
                "Username {} is taken",
                participant.username
            )));
        }
        state.participants.insert(participant.id, participant);
        Ok(())
    }

    async fn participants(&self) -> Result<Vec<Participant>> {
        let state = self.state.read().await;
        Ok(state.participants.values().cloned().collect())
    }

    async fn append_expense(&self, expense: NewExpense) -> Result<Expense> {
        let mut state = self.state.write().await;
        let id = ExpenseId(state.expenses.len() as u64 + 1);
        let expense = expense.with_id(id);
        state.expenses.push(expense.clone());
        Ok(expense)
    }

    async fn append_payment(&self, payment: NewPayment) -> Result<Payment> {
        let mut state = self.state.write().await;
        let id = PaymentId(state.payments.len() as u64 + 1);
        let payment = payment.with_id(id);
        state.payments.push(payment.clone());
        Ok(payment)
    }

    async fn snapshot(&self) -> Result<LedgerSnapshot> {
        let state = self.state.read().await;
        Ok(LedgerSnapshot {
            participants: state.participants.values().cloned().collect(),
            expenses: state.expenses.clone(),
            payments: state.payments.clone(),
        })
    }
}
