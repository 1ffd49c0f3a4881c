use crate::application::session::Session;
use crate::application::views::PaymentView;
use crate::domain::ledger::PaymentId;
use crate::domain::participant::ParticipantId;
use crate::interfaces::http::error::AppError;
use crate::interfaces::http::routes::calendar_day;
use crate::interfaces::http::state::AppState;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub receiver_id: ParticipantId,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: PaymentId,
    pub payer: String,
    pub receiver: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: String,
}

impl From<PaymentView> for PaymentResponse {
    fn from(p: PaymentView) -> Self {
        Self {
            id: p.id,
            date: calendar_day(&p.date),
            payer: p.payer,
            receiver: p.receiver,
            amount: p.amount.value(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/settlements", post(record_payment))
        .route("/settlements/history", get(history))
}

async fn history(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<Vec<PaymentResponse>>, AppError> {
    let payments = state.service.settlement_history().await?;
    Ok(Json(payments.into_iter().map(Into::into).collect()))
}

async fn record_payment(
    State(state): State<AppState>,
    session: Session,
    body: Result<Json<RecordPaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PaymentResponse>), AppError> {
    let Json(request) = body?;
    let payment = state
        .service
        .record_payment(&session, request.receiver_id, request.amount)
        .await?;
    let payer = state.service.participant(payment.payer).await?;
    let receiver = state.service.participant(payment.receiver).await?;
    let view = PaymentView {
        id: payment.id,
        payer: payer.full_name,
        receiver: receiver.full_name,
        amount: payment.amount,
        date: payment.date,
    };
    Ok((StatusCode::CREATED, Json(view.into())))
}
