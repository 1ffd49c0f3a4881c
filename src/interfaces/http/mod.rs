//! JSON API over the ledger service.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use state::AppState;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the application router. Everything except `/health` and `/login`
/// requires a bearer token.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/login", post(auth::login))
        .merge(routes::dashboard::router())
        .merge(routes::expenses::router())
        .merge(routes::settlements::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
