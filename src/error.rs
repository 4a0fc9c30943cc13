use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified error type for the relay service.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    // ── Request Errors ──────────────────────────────────────────────────
    #[error("Missing required field: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    // ── Internal ────────────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl From<sqlx::Error> for RelayError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Database error: {e}");
        RelayError::Storage(e.to_string())
    }
}

impl From<anyhow::Error> for RelayError {
    fn from(e: anyhow::Error) -> Self {
        RelayError::Storage(e.to_string())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::NotFound(_) => StatusCode::NOT_FOUND,
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RelayError::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Callers (the bridge page and the native shell) only ever show a
        // generic failure state, so the body stays a flat message.
        let body = json!({ "error": self.to_string() });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: RelayError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(RelayError::Validation("nonce".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(RelayError::NotFound("handoff".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(RelayError::MethodNotAllowed),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            status_of(RelayError::Storage("connection reset".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(RelayError::Crypto("bad key".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            RelayError::Validation("refresh_token".into()).to_string(),
            "Missing required field: refresh_token"
        );
        assert_eq!(
            RelayError::NotFound("handoff".into()).to_string(),
            "handoff not found"
        );
    }
}
