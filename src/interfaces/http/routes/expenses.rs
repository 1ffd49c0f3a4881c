use crate::application::session::Session;
use crate::application::views::{ExpenseFilter, ExpenseView};
use crate::domain::ledger::ExpenseId;
use crate::domain::participant::ParticipantId;
use crate::interfaces::http::error::AppError;
use crate::interfaces::http::routes::calendar_day;
use crate::interfaces::http::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct ExpenseQuery {
    #[serde(default)]
    pub filter: ExpenseFilter,
}

#[derive(Debug, Deserialize)]
pub struct NewExpenseRequest {
    pub description: String,
    pub amount: Decimal,
    /// Empty means everyone registered at the time of the request.
    #[serde(default)]
    pub shared_with: Vec<ParticipantId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExpenseResponse {
    pub id: ExpenseId,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub payer: String,
    pub is_mine: bool,
    pub date: String,
}

impl From<ExpenseView> for ExpenseResponse {
    fn from(e: ExpenseView) -> Self {
        Self {
            id: e.id,
            date: calendar_day(&e.date),
            description: e.description,
            amount: e.amount.value(),
            payer: e.payer,
            is_mine: e.is_mine,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/expenses", get(list_expenses).post(add_expense))
}

async fn list_expenses(
    State(state): State<AppState>,
    session: Session,
    query: Result<Query<ExpenseQuery>, QueryRejection>,
) -> Result<Json<Vec<ExpenseResponse>>, AppError> {
    let Query(query) = query?;
    let expenses = state.service.expenses(&session, query.filter).await?;
    Ok(Json(expenses.into_iter().map(Into::into).collect()))
}

async fn add_expense(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<NewExpenseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ExpenseResponse>), AppError> {
    let Json(request) = body?;
    let expense = state
        .service
        .add_expense(
            &session,
            &request.description,
            request.amount,
            request.shared_with,
        )
        .await?;
    let payer = state.service.participant(session.participant).await?;
    let view = ExpenseView::new(&expense, payer.full_name, session.participant);
    Ok((StatusCode::CREATED, Json(view.into())))
}
