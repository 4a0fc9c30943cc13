//! Route handlers for the token handoff endpoint.
//!
//! The protocol is a one-time key-value relay: the bridge page stores a
//! token pair under a caller-generated nonce, and the native shell claims
//! it exactly once. A claim deletes the record before the caller is told
//! it succeeded, so a replayed nonce always comes back 404.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::RelayError;
use crate::SharedState;

pub fn relay_router(state: SharedState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route(
            "/",
            post(handoff_store)
                .get(handoff_claim)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

async fn status() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "flarelog-auth",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// Handoff Endpoints
// =============================================================================

/// Reject a missing or empty request field with a 400.
fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, RelayError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RelayError::Validation(name.into())),
    }
}

#[derive(Deserialize)]
struct StoreHandoffBody {
    #[serde(default)]
    nonce: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// POST / — Store a token pair under a nonce.
///
/// Upsert-by-nonce: a second store for the same nonce overwrites the first
/// (last-writer-wins). Validation runs before any database access, so a
/// rejected request never creates a record.
async fn handoff_store(
    State(state): State<SharedState>,
    Json(body): Json<StoreHandoffBody>,
) -> Result<Json<serde_json::Value>, RelayError> {
    let nonce = required(&body.nonce, "nonce")?;
    let access_token = required(&body.access_token, "access_token")?;
    let refresh_token = required(&body.refresh_token, "refresh_token")?;

    state
        .store
        .put_handoff(&state.crypto, nonce, access_token, refresh_token)
        .await?;

    let _ = state.store.log_event("handoff.stored", nonce, json!({})).await;

    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
struct ClaimQuery {
    #[serde(default)]
    nonce: Option<String>,
}

/// GET /?nonce= — Claim a token pair (one-time read).
///
/// The record is gone by the time the response is sent; an expired or
/// already-consumed nonce is indistinguishable from one never stored.
async fn handoff_claim(
    State(state): State<SharedState>,
    Query(q): Query<ClaimQuery>,
) -> Result<Json<serde_json::Value>, RelayError> {
    let nonce = required(&q.nonce, "nonce")?;

    let tokens = state
        .store
        .take_handoff(&state.crypto, nonce, state.config.handoff_ttl_minutes)
        .await?
        .ok_or_else(|| RelayError::NotFound("handoff".into()))?;

    let _ = state.store.log_event("handoff.claimed", nonce, json!({})).await;

    Ok(Json(json!({
        "access_token": tokens.access_token,
        "refresh_token": tokens.refresh_token,
    })))
}

/// OPTIONS / — CORS preflight. Never touches the database.
async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Any other method on the endpoint.
async fn method_not_allowed() -> RelayError {
    RelayError::MethodNotAllowed
}
