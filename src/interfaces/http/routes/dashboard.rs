use crate::application::session::Session;
use crate::application::views::{ExpenseView, SuggestedPayment};
use crate::domain::ledger::ExpenseId;
use crate::domain::participant::ParticipantId;
use crate::interfaces::http::error::AppError;
use crate::interfaces::http::routes::calendar_day;
use crate::interfaces::http::state::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub my_balance: Decimal,
    pub suggested_payments: Vec<SuggestedPaymentResponse>,
    pub expenses: Vec<RecentExpenseResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestedPaymentResponse {
    pub from: String,
    pub to: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub payer_id: ParticipantId,
    pub receiver_id: ParticipantId,
}

impl From<SuggestedPayment> for SuggestedPaymentResponse {
    fn from(s: SuggestedPayment) -> Self {
        Self {
            from: s.from,
            to: s.to,
            amount: s.amount.value(),
            payer_id: s.payer_id,
            receiver_id: s.receiver_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecentExpenseResponse {
    pub id: ExpenseId,
    pub desc: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub payer: String,
    pub date: String,
}

impl From<ExpenseView> for RecentExpenseResponse {
    fn from(e: ExpenseView) -> Self {
        Self {
            id: e.id,
            date: calendar_day(&e.date),
            desc: e.description,
            amount: e.amount.value(),
            payer: e.payer,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

async fn dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<DashboardResponse>, AppError> {
    let dashboard = state.service.dashboard(&session).await?;
    Ok(Json(DashboardResponse {
        my_balance: dashboard.my_balance.value(),
        suggested_payments: dashboard
            .suggested_payments
            .into_iter()
            .map(Into::into)
            .collect(),
        expenses: dashboard
            .recent_expenses
            .into_iter()
            .map(Into::into)
            .collect(),
    }))
}
