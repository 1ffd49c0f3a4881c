use super::money::{Amount, Balance, CURRENCY_SCALE};
use super::participant::ParticipantId;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Net position of every participant.
///
/// Always sums to exactly zero: the only ways to build one check it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Balances(BTreeMap<ParticipantId, Balance>);

impl Balances {
    /// Builds a balance table, rejecting entries that do not sum to zero.
    pub fn try_from_iter<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (ParticipantId, Balance)>,
    {
        let mut map = BTreeMap::new();
        for (id, balance) in entries {
            let slot = map.entry(id).or_insert(Balance::ZERO);
            *slot = slot
                .checked_add(balance)
                .ok_or_else(|| overflow(id))?;
        }
        Self::try_from_map(map)
    }

    pub(crate) fn try_from_map(mut map: BTreeMap<ParticipantId, Balance>) -> Result<Self> {
        // Settled participants read as plain zero, never "-0.00".
        for balance in map.values_mut().filter(|b| b.is_zero()) {
            *balance = Balance::new(Decimal::new(0, CURRENCY_SCALE));
        }
        let total = map
            .values()
            .try_fold(Balance::ZERO, |acc, &b| acc.checked_add(b))
            .ok_or_else(|| LedgerError::consistency("balance total overflowed"))?;
        if !total.is_zero() {
            return Err(LedgerError::consistency(format!(
                "balances sum to {total} instead of zero"
            )));
        }
        Ok(Self(map))
    }

    /// Balance of `id`, zero when the participant is unknown.
    pub fn get(&self, id: ParticipantId) -> Balance {
        self.0.get(&id).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ParticipantId, Balance> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> Balance {
        self.0.values().sum()
    }

    /// Whether every participant is settled.
    pub fn is_settled(&self) -> bool {
        self.0.values().all(Balance::is_zero)
    }

    /// Applies a transfer: the payer's debt shrinks, and so does what the receiver is owed.
    ///
    /// Moves the same amount in both directions, so the table stays zero-sum.
    pub fn apply(&mut self, payer: ParticipantId, receiver: ParticipantId, amount: Amount) {
        let amount = Balance::from(amount);
        *self.0.entry(payer).or_insert(Balance::ZERO) += amount;
        *self.0.entry(receiver).or_insert(Balance::ZERO) -= amount;
    }
}

fn overflow(id: ParticipantId) -> LedgerError {
    LedgerError::consistency(format!("balance of participant {id} overflowed"))
}

impl<'a> IntoIterator for &'a Balances {
    type Item = (&'a ParticipantId, &'a Balance);
    type IntoIter = btree_map::Iter<'a, ParticipantId, Balance>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A suggested transfer that moves the ledger toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub payer: ParticipantId,
    pub receiver: ParticipantId,
    pub amount: Amount,
}
