use super::money::Amount;
use super::participant::{Participant, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(pub u64);

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An expense paid by one participant on behalf of others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    pub amount: Amount,
    pub payer: ParticipantId,
    pub date: DateTime<Utc>,
    /// Participants sharing the cost, fixed when the expense is recorded.
    /// An empty list means everyone known when balances are computed.
    #[serde(default)]
    pub shared_with: Vec<ParticipantId>,
}

/// An expense that has been validated but not yet assigned an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub description: String,
    pub amount: Amount,
    pub payer: ParticipantId,
    pub date: DateTime<Utc>,
    pub shared_with: Vec<ParticipantId>,
}

impl NewExpense {
    pub fn with_id(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            description: self.description,
            amount: self.amount,
            payer: self.payer,
            date: self.date,
            shared_with: self.shared_with,
        }
    }
}

/// A confirmed transfer from `payer` to `receiver`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub payer: ParticipantId,
    pub receiver: ParticipantId,
    pub amount: Amount,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub payer: ParticipantId,
    pub receiver: ParticipantId,
    pub amount: Amount,
    pub date: DateTime<Utc>,
}

impl NewPayment {
    pub fn with_id(self, id: PaymentId) -> Payment {
        Payment {
            id,
            payer: self.payer,
            receiver: self.receiver,
            amount: self.amount,
            date: self.date,
        }
    }
}

/// A consistent, point-in-time copy of the whole ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    /// Ordered by id.
    pub participants: Vec<Participant>,
    /// In append order.
    pub expenses: Vec<Expense>,
    /// In append order.
    pub payments: Vec<Payment>,
}

impl LedgerSnapshot {
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id).collect()
    }

    /// Display name for `id`, falling back to the raw id for unknown participants.
    pub fn name_of(&self, id: ParticipantId) -> String {
        self.participant(id)
            .map(|p| p.full_name.clone())
            .unwrap_or_else(|| format!("#{id}"))
    }
}
