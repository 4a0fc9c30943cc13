//! HTTP surface for the relay service.
//!
//! One endpoint group at the root (the endpoint is deployed standalone, so
//! the store/claim operations live at `/` exactly as callers address it),
//! plus `/status` for health checks.
//!
//! Every response carries permissive CORS headers — the endpoint must be
//! callable from both the app's web origin and the wrapped native shell.

pub mod routes;

use crate::SharedState;
use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    routes::relay_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
