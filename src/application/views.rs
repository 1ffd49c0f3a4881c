use crate::domain::ledger::{Expense, ExpenseId, LedgerSnapshot, Payment, PaymentId};
use crate::domain::money::{Amount, Balance};
use crate::domain::participant::ParticipantId;
use crate::domain::settlement::Settlement;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Which expenses a listing should include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseFilter {
    #[default]
    All,
    /// Only expenses the caller paid for.
    Mine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedPayment {
    pub from: String,
    pub to: String,
    pub payer_id: ParticipantId,
    pub receiver_id: ParticipantId,
    pub amount: Amount,
}

impl SuggestedPayment {
    pub fn new(settlement: &Settlement, snapshot: &LedgerSnapshot) -> Self {
        Self {
            from: snapshot.name_of(settlement.payer),
            to: snapshot.name_of(settlement.receiver),
            payer_id: settlement.payer,
            receiver_id: settlement.receiver,
            amount: settlement.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseView {
    pub id: ExpenseId,
    pub description: String,
    pub amount: Amount,
    pub payer: String,
    pub is_mine: bool,
    pub date: DateTime<Utc>,
}

impl ExpenseView {
    pub fn new(expense: &Expense, payer_name: String, viewer: ParticipantId) -> Self {
        Self {
            id: expense.id,
            description: expense.description.clone(),
            amount: expense.amount,
            payer: payer_name,
            is_mine: expense.payer == viewer,
            date: expense.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentView {
    pub id: PaymentId,
    pub payer: String,
    pub receiver: String,
    pub amount: Amount,
    pub date: DateTime<Utc>,
}

impl PaymentView {
    pub fn new(payment: &Payment, snapshot: &LedgerSnapshot) -> Self {
        Self {
            id: payment.id,
            payer: snapshot.name_of(payment.payer),
            receiver: snapshot.name_of(payment.receiver),
            amount: payment.amount,
            date: payment.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceView {
    pub participant: ParticipantId,
    pub name: String,
    pub balance: Balance,
}

/// Everything the home screen shows for one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub my_balance: Balance,
    pub suggested_payments: Vec<SuggestedPayment>,
    /// Newest first.
    pub recent_expenses: Vec<ExpenseView>,
}

/// Balances of everyone plus the transfers that would settle them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerReport {
    pub balances: Vec<BalanceView>,
    pub settlements: Vec<SuggestedPayment>,
}
