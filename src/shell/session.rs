//! Session installation.
//!
//! The deep-link listener delegates session installation through the
//! `SessionSink` seam so the host shell can plug in whatever its auth
//! subsystem exposes. `SessionManager` is the default in-process
//! implementation: a single guarded slot, so installing a new pair
//! supersedes any prior session atomically from the caller's point of view.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use tracing::info;

use super::types::{AuthSession, SessionTokens, ShellError};

/// The external auth subsystem's session-set operation.
#[async_trait]
pub trait SessionSink: Send + Sync {
    /// Install a token pair as the active session, superseding any prior one.
    async fn set_session(&self, tokens: SessionTokens) -> Result<(), ShellError>;
}

/// In-memory session slot.
#[derive(Default)]
pub struct SessionManager {
    current: Mutex<Option<AuthSession>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently installed session, if any.
    pub fn current(&self) -> Option<AuthSession> {
        self.current.lock().unwrap().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.lock().unwrap().is_some()
    }

    /// Drop the active session.
    pub fn clear(&self) {
        *self.current.lock().unwrap() = None;
        info!("Session cleared");
    }
}

#[async_trait]
impl SessionSink for SessionManager {
    async fn set_session(&self, tokens: SessionTokens) -> Result<(), ShellError> {
        let session = AuthSession {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            installed_at: Utc::now(),
        };

        *self.current.lock().unwrap() = Some(session);
        info!("Session installed");
        Ok(())
    }
}
