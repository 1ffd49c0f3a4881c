use super::engine::SettlementEngine;
use super::session::Session;
use super::views::{
    BalanceView, Dashboard, ExpenseFilter, ExpenseView, LedgerReport, PaymentView,
    SuggestedPayment,
};
use crate::domain::ledger::{Expense, LedgerSnapshot, NewExpense, NewPayment, Payment};
use crate::domain::money::Amount;
use crate::domain::participant::{Participant, ParticipantId};
use crate::domain::ports::LedgerStoreBox;
use crate::domain::settlement::Balances;
use crate::domain::split::{EqualSplit, SplitPolicyBox};
use crate::error::{LedgerError, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashSet;

/// How many expenses the dashboard lists.
pub const RECENT_EXPENSES: usize = 20;

/// Entry point for every ledger operation.
///
/// `LedgerService` validates user actions before they reach the store and
/// assembles read views from a single snapshot, so a view never mixes
/// states from before and after a concurrent append. It never caches
/// balances: every read recomputes them from the ledger.
pub struct LedgerService {
    store: LedgerStoreBox,
    engine: SettlementEngine<SplitPolicyBox>,
}

impl LedgerService {
    /// Creates a service that splits expenses equally.
    pub fn new(store: LedgerStoreBox) -> Self {
        Self::with_policy(store, Box::new(EqualSplit))
    }

    pub fn with_policy(store: LedgerStoreBox, policy: SplitPolicyBox) -> Self {
        Self {
            store,
            engine: SettlementEngine::new(policy),
        }
    }

    /// Registers every roster entry the store does not know yet.
    ///
    /// Returns how many participants were added.
    pub async fn sync_roster(&self, roster: Vec<Participant>) -> Result<usize> {
        let known: HashSet<ParticipantId> = self
            .store
            .participants()
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        let mut added = 0;
        for participant in roster {
            if known.contains(&participant.id) {
                continue;
            }
            tracing::info!(participant = %participant.id, username = %participant.username, "registering participant");
            self.store.register_participant(participant).await?;
            added += 1;
        }
        Ok(added)
    }

    pub async fn participants(&self) -> Result<Vec<Participant>> {
        self.store.participants().await
    }

    pub async fn participant(&self, id: ParticipantId) -> Result<Participant> {
        self.store
            .participants()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| LedgerError::validation(format!("Unknown participant {id}")))
    }

    /// Records an expense paid by the session's participant.
    ///
    /// An empty `shared_with` shares the expense among everyone registered
    /// right now. The resolved list is stored with the expense, so later
    /// arrivals never take part in it.
    pub async fn add_expense(
        &self,
        session: &Session,
        description: &str,
        amount: Decimal,
        shared_with: Vec<ParticipantId>,
    ) -> Result<Expense> {
        let description = description.trim();
        if description.is_empty() {
            return Err(LedgerError::validation("Description must not be empty"));
        }
        let amount = Amount::new(amount)?;

        let known = self.known_ids().await?;
        ensure_known(&known, session.participant)?;
        let mut seen = HashSet::new();
        for &id in &shared_with {
            ensure_known(&known, id)?;
            if !seen.insert(id) {
                return Err(LedgerError::validation(format!(
                    "Participant {id} is listed twice"
                )));
            }
        }
        let shared_with = if shared_with.is_empty() {
            known
        } else {
            shared_with
        };

        let expense = self
            .store
            .append_expense(NewExpense {
                description: description.to_string(),
                amount,
                payer: session.participant,
                date: Utc::now(),
                shared_with,
            })
            .await?;

        tracing::info!(expense = %expense.id, payer = %expense.payer, amount = %expense.amount, "expense recorded");
        Ok(expense)
    }

    /// Records a payment from the session's participant to `receiver`.
    pub async fn record_payment(
        &self,
        session: &Session,
        receiver: ParticipantId,
        amount: Decimal,
    ) -> Result<Payment> {
        self.record_payment_between(session.participant, receiver, amount)
            .await
    }

    /// Appends a confirmed payment. Balances are not recomputed here; the
    /// next read observes the payment.
    pub async fn record_payment_between(
        &self,
        payer: ParticipantId,
        receiver: ParticipantId,
        amount: Decimal,
    ) -> Result<Payment> {
        let amount = Amount::new(amount)?;
        if payer == receiver {
            return Err(LedgerError::validation("Cannot pay yourself"));
        }
        let known = self.known_ids().await?;
        ensure_known(&known, payer)?;
        ensure_known(&known, receiver)?;

        let payment = self
            .store
            .append_payment(NewPayment {
                payer,
                receiver,
                amount,
                date: Utc::now(),
            })
            .await?;

        tracing::info!(payment = %payment.id, payer = %payer, receiver = %receiver, amount = %amount, "payment recorded");
        Ok(payment)
    }

    pub async fn dashboard(&self, session: &Session) -> Result<Dashboard> {
        let snapshot = self.store.snapshot().await?;
        ensure_known(&snapshot.participant_ids(), session.participant)?;

        let balances = self.engine.balances_for(&snapshot)?;
        let suggested_payments = self.suggestions(&balances, &snapshot);
        let recent_expenses = newest_first(&snapshot, session, ExpenseFilter::All)
            .into_iter()
            .take(RECENT_EXPENSES)
            .collect();

        Ok(Dashboard {
            my_balance: balances.get(session.participant),
            suggested_payments,
            recent_expenses,
        })
    }

    pub async fn expenses(
        &self,
        session: &Session,
        filter: ExpenseFilter,
    ) -> Result<Vec<ExpenseView>> {
        let snapshot = self.store.snapshot().await?;
        Ok(newest_first(&snapshot, session, filter))
    }

    /// All payments, newest first.
    pub async fn settlement_history(&self) -> Result<Vec<PaymentView>> {
        let snapshot = self.store.snapshot().await?;
        let mut payments: Vec<&Payment> = snapshot.payments.iter().collect();
        payments.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(payments
            .into_iter()
            .map(|p| PaymentView::new(p, &snapshot))
            .collect())
    }

    /// Every participant's balance and the suggested settlements.
    pub async fn report(&self) -> Result<LedgerReport> {
        let snapshot = self.store.snapshot().await?;
        let balances = self.engine.balances_for(&snapshot)?;
        let settlements = self.suggestions(&balances, &snapshot);
        let balances = balances
            .iter()
            .map(|(&participant, &balance)| BalanceView {
                participant,
                name: snapshot.name_of(participant),
                balance,
            })
            .collect();
        Ok(LedgerReport {
            balances,
            settlements,
        })
    }

    fn suggestions(&self, balances: &Balances, snapshot: &LedgerSnapshot) -> Vec<SuggestedPayment> {
        self.engine
            .suggest_settlements(balances)
            .iter()
            .map(|s| SuggestedPayment::new(s, snapshot))
            .collect()
    }

    async fn known_ids(&self) -> Result<Vec<ParticipantId>> {
        Ok(self
            .store
            .participants()
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect())
    }
}

// Participants are never removed, so an id checked here is still valid when
// the append lands.
fn ensure_known(known: &[ParticipantId], id: ParticipantId) -> Result<()> {
    if known.contains(&id) {
        Ok(())
    } else {
        Err(LedgerError::validation(format!("Unknown participant {id}")))
    }
}

fn newest_first(
    snapshot: &LedgerSnapshot,
    session: &Session,
    filter: ExpenseFilter,
) -> Vec<ExpenseView> {
    let mut expenses: Vec<&Expense> = snapshot
        .expenses
        .iter()
        .filter(|e| filter == ExpenseFilter::All || e.payer == session.participant)
        .collect();
    expenses.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    expenses
        .into_iter()
        .map(|e| ExpenseView::new(e, snapshot.name_of(e.payer), session.participant))
        .collect()
}
