//! Maps ledger errors to HTTP responses with a structured JSON body.
//!
//! Consistency and internal failures are reported to the client with a
//! generic message only. Internal failures are logged here; consistency
//! failures are logged by the settlement engine that detects them.

use crate::error::LedgerError;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR").
    pub code: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Missing, unknown or rejected credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The request was understood but breaks a ledger rule (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// The ledger failed an invariant check (500).
    #[error("ledger inconsistency: {0}")]
    Consistency(String),

    /// Storage or other infrastructure failure (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Consistency(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONSISTENCY_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            // Already logged where the ledger was balanced.
            Self::Consistency(_) => "The ledger could not be balanced".to_string(),
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                "An internal error occurred".to_string()
            }
            Self::Unauthorized(msg) | Self::Validation(msg) => msg.clone(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::ValidationError(msg) => Self::Validation(msg),
            LedgerError::ConsistencyError(msg) => Self::Consistency(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_422() {
        let err = AppError::from(LedgerError::validation("Cannot pay yourself"));
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "VALIDATION_ERROR");
    }

    #[test]
    fn consistency_is_distinct_from_internal() {
        let consistency = AppError::from(LedgerError::consistency("sum is 0.01"));
        assert_eq!(consistency.status_and_code().1, "CONSISTENCY_ERROR");

        let io = AppError::from(LedgerError::from(std::io::Error::other("disk")));
        assert_eq!(io.status_and_code().1, "INTERNAL_ERROR");
    }

    #[test]
    fn consistency_response_hides_details_without_logging_again() {
        let (resp, logs) = crate::error::capture_logs(|| {
            AppError::from(LedgerError::consistency("sum is 0.01")).into_response()
        });
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let resp = AppError::Unauthorized("Missing token".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
