//! Sign-in flow: hosted-auth URL construction and browser handoff.
//!
//! Two states: Idle and AwaitingCallback. `begin` launches the system
//! browser at the identity provider with the redirect target pinned to the
//! bridge page; the flow then sits in AwaitingCallback until the deep-link
//! listener finishes the handshake (or the user cancels). No timeout is
//! imposed while waiting — a hung provider redirect leaves the flow pending
//! until the user retries.

use chrono::Utc;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use super::browser::{LaunchOutcome, SystemBrowser};
use super::types::FlowState;

/// Fixed collaborator URLs, set at build time for a given deployment.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Hosted auth front (builds provider authorize URLs).
    pub auth_base_url: String,
    /// Statically hosted bridge page the provider redirects back to.
    pub bridge_url: String,
    /// Token handoff endpoint.
    pub relay_url: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            auth_base_url: "https://auth.flarelog.app".into(),
            bridge_url: "https://flarelog.app/auth/bridge".into(),
            relay_url: "https://relay.flarelog.app".into(),
        }
    }
}

pub struct SignInFlow {
    config: ShellConfig,
    browser: Arc<dyn SystemBrowser>,
    state: Mutex<FlowState>,
}

impl SignInFlow {
    pub fn new(config: ShellConfig, browser: Arc<dyn SystemBrowser>) -> Self {
        Self {
            config,
            browser,
            state: Mutex::new(FlowState::Idle),
        }
    }

    pub fn state(&self) -> FlowState {
        self.state.lock().unwrap().clone()
    }

    pub fn is_awaiting_callback(&self) -> bool {
        matches!(self.state(), FlowState::AwaitingCallback { .. })
    }

    /// Launch a sign-in attempt for the given identity provider.
    ///
    /// Fire-and-forget: the returned outcome says which browser path ran,
    /// but no failure is surfaced as an error — the user either completes
    /// the flow in the browser or restarts it.
    pub fn begin(&self, provider: &str) -> LaunchOutcome {
        let url = self.authorize_url(provider);

        {
            let mut state = self.state.lock().unwrap();
            *state = FlowState::AwaitingCallback {
                started_at: Utc::now(),
            };
        }

        info!("Starting {provider} sign-in via system browser");
        let outcome = self.browser.open(&url);

        if outcome == LaunchOutcome::Failed {
            warn!("Browser launch failed; sign-in page was never shown");
        }

        outcome
    }

    /// Abandon a pending sign-in attempt.
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap();
        if matches!(*state, FlowState::AwaitingCallback { .. }) {
            info!("Sign-in flow cancelled");
            *state = FlowState::Idle;
        }
    }

    /// Return to Idle once the deep-link listener has handled the callback.
    pub fn finish(&self) {
        *self.state.lock().unwrap() = FlowState::Idle;
    }

    fn authorize_url(&self, provider: &str) -> String {
        format!(
            "{}/authorize?provider={}&redirect_to={}",
            self.config.auth_base_url,
            encode(provider),
            encode(&self.config.bridge_url)
        )
    }
}

fn encode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
