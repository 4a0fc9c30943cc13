//! Shell-side auth types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A token pair in flight between the identity provider and the shell.
///
/// Field names match the wire format used in both the deep-link fragment
/// and the handoff endpoint's responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// An installed session. Once installed, this pair is the single source of
/// truth for "is the user signed in".
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub installed_at: DateTime<Utc>,
}

/// Sign-in flow state.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    /// No pending OAuth flow.
    Idle,
    /// A system-browser OAuth flow has been launched.
    AwaitingCallback {
        started_at: DateTime<Utc>,
    },
}

impl Default for FlowState {
    fn default() -> Self {
        FlowState::Idle
    }
}

/// Error types for the shell half of the handshake.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("Deep link missing token fields: {0}")]
    TokenParse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Relay error: {0}")]
    Api(String),

    #[error("Handoff not found or already claimed")]
    HandoffNotFound,

    #[error("Session install failed: {0}")]
    SessionSet(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_state_default_is_idle() {
        assert_eq!(FlowState::default(), FlowState::Idle);
    }

    #[test]
    fn test_session_tokens_deserialize_wire_format() {
        let json = r#"{"access_token": "AT1", "refresh_token": "RT1"}"#;
        let tokens: SessionTokens = serde_json::from_str(json).unwrap();
        assert_eq!(tokens.access_token, "AT1");
        assert_eq!(tokens.refresh_token, "RT1");
    }

    #[test]
    fn test_shell_error_display() {
        assert_eq!(
            ShellError::TokenParse("refresh_token".into()).to_string(),
            "Deep link missing token fields: refresh_token"
        );
        assert_eq!(
            ShellError::HandoffNotFound.to_string(),
            "Handoff not found or already claimed"
        );
        assert_eq!(
            ShellError::SessionSet("storage full".into()).to_string(),
            "Session install failed: storage full"
        );
    }
}
