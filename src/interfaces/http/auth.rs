//! Login and bearer-token sessions.
//!
//! `POST /login` trades a username and password for an opaque token. Every
//! other ledger route resolves that token into a [`Session`] through the
//! extractor below, so handlers receive the caller explicitly.

use super::error::AppError;
use super::state::AppState;
use crate::application::session::Session;
use crate::domain::participant::ParticipantId;
use crate::interfaces::roster::password_digest;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Issued tokens and the participant each one belongs to.
#[derive(Debug, Clone, Default)]
pub struct SessionTable {
    tokens: Arc<RwLock<HashMap<String, ParticipantId>>>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn issue(&self, participant: ParticipantId) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.write().await.insert(token.clone(), participant);
        token
    }

    pub async fn resolve(&self, token: &str) -> Option<ParticipantId> {
        self.tokens.read().await.get(token).copied()
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: ParticipantId,
    pub full_name: String,
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = body?;
    let digest = password_digest(&request.password);

    let participant = state
        .service
        .participants()
        .await?
        .into_iter()
        .find(|p| p.username == request.username)
        .filter(|p| bool::from(p.password_sha256.as_bytes().ct_eq(digest.as_bytes())))
        .ok_or_else(|| {
            tracing::warn!(username = %request.username, "login rejected");
            AppError::Unauthorized("Invalid credentials".to_string())
        })?;

    let token = state.sessions.issue(participant.id).await;
    tracing::info!(participant = %participant.id, "login succeeded");

    Ok(Json(LoginResponse {
        token,
        user_id: participant.id,
        full_name: participant.full_name,
    }))
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Unauthorized("Missing token".to_string()))?;

        let participant = state
            .sessions
            .resolve(token)
            .await
            .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

        Ok(Session::new(participant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_table_round_trip() {
        let sessions = SessionTable::new();
        let token = sessions.issue(ParticipantId(7)).await;
        assert_eq!(token.len(), 32);
        assert_eq!(sessions.resolve(&token).await, Some(ParticipantId(7)));
        assert_eq!(sessions.resolve("not-a-token").await, None);
    }
}
