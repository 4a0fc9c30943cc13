//! Deep-link listener for the OAuth callback.
//!
//! The listener is an explicitly owned subscription object: the host shell
//! creates it once at startup, keeps it for the app's lifetime, and feeds it
//! every inbound custom-scheme URL. It is passive — it fires regardless of
//! whether a sign-in flow is pending, and keeps no per-flow state across
//! events.
//!
//! Tokens travel in the URL fragment, never the query string, so they stay
//! out of server logs and redirect chains. The bridge page either embeds
//! the pair directly or stores it at the handoff endpoint and embeds only
//! the nonce; the listener handles both.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::browser::SystemBrowser;
use super::relay_client::TokenRelay;
use super::session::SessionSink;
use super::types::{SessionTokens, ShellError};

/// The reserved custom-scheme callback prefix. Matching is case-sensitive;
/// anything else on the scheme is someone else's link.
pub const CALLBACK_PREFIX: &str = "flarelog://auth-callback";

/// What happened to an inbound URL.
#[derive(Debug)]
pub enum LinkOutcome {
    /// Not an auth callback; untouched.
    Ignored,
    /// A token pair was installed as the active session.
    SessionInstalled,
    /// The link matched the callback prefix but the handshake failed. The
    /// existing session, if any, was left untouched. Already logged; hosts
    /// may additionally surface it.
    Failed(ShellError),
}

pub struct DeepLinkListener {
    sink: Arc<dyn SessionSink>,
    browser: Arc<dyn SystemBrowser>,
    relay: Arc<dyn TokenRelay>,
}

impl DeepLinkListener {
    pub fn new(
        sink: Arc<dyn SessionSink>,
        browser: Arc<dyn SystemBrowser>,
        relay: Arc<dyn TokenRelay>,
    ) -> Self {
        Self {
            sink,
            browser,
            relay,
        }
    }

    /// Handle an inbound custom-scheme URL.
    ///
    /// Every failure past the prefix gate is logged and reported in the
    /// outcome, but never retried — the user recovers by restarting the
    /// whole sign-in flow with a fresh nonce.
    pub async fn handle_url(&self, url: &str) -> LinkOutcome {
        if !url.starts_with(CALLBACK_PREFIX) {
            return LinkOutcome::Ignored;
        }

        let outcome = match self.extract_tokens(url).await {
            Ok(tokens) => match self.sink.set_session(tokens).await {
                Ok(()) => {
                    info!("Auth callback handled, session installed");
                    LinkOutcome::SessionInstalled
                }
                Err(e) => {
                    // The link still counts as handled; no retry.
                    error!("Session install failed: {e}");
                    LinkOutcome::Failed(e)
                }
            },
            Err(e) => {
                warn!("Auth callback rejected: {e}");
                LinkOutcome::Failed(e)
            }
        };

        // The sign-in page is done either way.
        self.browser.close();

        outcome
    }

    /// Pull a token pair out of the callback URL — directly from the
    /// fragment, or indirectly by claiming the nonce it carries.
    async fn extract_tokens(&self, url: &str) -> Result<SessionTokens, ShellError> {
        let params = parse_fragment(url);

        let access_token = params.get("access_token").filter(|v| !v.is_empty());
        let refresh_token = params.get("refresh_token").filter(|v| !v.is_empty());

        if let (Some(access), Some(refresh)) = (access_token, refresh_token) {
            return Ok(SessionTokens {
                access_token: access.clone(),
                refresh_token: refresh.clone(),
            });
        }

        if let Some(nonce) = params.get("nonce").filter(|v| !v.is_empty()) {
            return self.relay.claim(nonce).await;
        }

        Err(ShellError::TokenParse(
            "access_token/refresh_token".into(),
        ))
    }
}

/// Parse the fragment (portion after `#`) as query-style parameters.
fn parse_fragment(url: &str) -> HashMap<String, String> {
    match url.split_once('#') {
        Some((_, fragment)) => url::form_urlencoded::parse(fragment.as_bytes())
            .into_owned()
            .collect(),
        None => HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockSink {
        installed: Mutex<Vec<SessionTokens>>,
        fail: bool,
    }

    impl MockSink {
        fn new() -> Self {
            Self {
                installed: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                installed: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn installed(&self) -> Vec<SessionTokens> {
            self.installed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SessionSink for MockSink {
        async fn set_session(&self, tokens: SessionTokens) -> Result<(), ShellError> {
            if self.fail {
                return Err(ShellError::SessionSet("mock failure".into()));
            }
            self.installed.lock().unwrap().push(tokens);
            Ok(())
        }
    }

    struct MockBrowser {
        closes: Mutex<usize>,
    }

    impl MockBrowser {
        fn new() -> Self {
            Self {
                closes: Mutex::new(0),
            }
        }

        fn close_count(&self) -> usize {
            *self.closes.lock().unwrap()
        }
    }

    impl SystemBrowser for MockBrowser {
        fn open(&self, _url: &str) -> super::super::browser::LaunchOutcome {
            super::super::browser::LaunchOutcome::DefaultBrowser
        }

        fn close(&self) {
            *self.closes.lock().unwrap() += 1;
        }
    }

    struct MockRelay {
        handoff: Option<SessionTokens>,
    }

    #[async_trait]
    impl TokenRelay for MockRelay {
        async fn store(&self, _nonce: &str, _tokens: &SessionTokens) -> Result<(), ShellError> {
            Ok(())
        }

        async fn claim(&self, _nonce: &str) -> Result<SessionTokens, ShellError> {
            self.handoff.clone().ok_or(ShellError::HandoffNotFound)
        }
    }

    fn listener_with(
        sink: Arc<MockSink>,
        browser: Arc<MockBrowser>,
        handoff: Option<SessionTokens>,
    ) -> DeepLinkListener {
        DeepLinkListener::new(sink, browser, Arc::new(MockRelay { handoff }))
    }

    fn pair(access: &str, refresh: &str) -> SessionTokens {
        SessionTokens {
            access_token: access.into(),
            refresh_token: refresh.into(),
        }
    }

    #[tokio::test]
    async fn test_direct_tokens_install_session() {
        let sink = Arc::new(MockSink::new());
        let browser = Arc::new(MockBrowser::new());
        let listener = listener_with(sink.clone(), browser.clone(), None);

        let outcome = listener
            .handle_url("flarelog://auth-callback#access_token=AT1&refresh_token=RT1")
            .await;

        assert!(matches!(outcome, LinkOutcome::SessionInstalled));
        assert_eq!(sink.installed(), vec![pair("AT1", "RT1")]);
        assert_eq!(browser.close_count(), 1);
    }

    #[tokio::test]
    async fn test_wrong_host_is_ignored() {
        let sink = Arc::new(MockSink::new());
        let browser = Arc::new(MockBrowser::new());
        let listener = listener_with(sink.clone(), browser.clone(), None);

        let outcome = listener
            .handle_url("flarelog://other-host#access_token=a&refresh_token=b")
            .await;

        assert!(matches!(outcome, LinkOutcome::Ignored));
        assert!(sink.installed().is_empty());
        // Not our link — the browser is left alone too.
        assert_eq!(browser.close_count(), 0);
    }

    #[tokio::test]
    async fn test_prefix_match_is_case_sensitive() {
        let sink = Arc::new(MockSink::new());
        let browser = Arc::new(MockBrowser::new());
        let listener = listener_with(sink.clone(), browser.clone(), None);

        let outcome = listener
            .handle_url("FLARELOG://auth-callback#access_token=a&refresh_token=b")
            .await;

        assert!(matches!(outcome, LinkOutcome::Ignored));
        assert!(sink.installed().is_empty());
    }

    #[tokio::test]
    async fn test_missing_refresh_token_leaves_session_untouched() {
        let sink = Arc::new(MockSink::new());
        let browser = Arc::new(MockBrowser::new());
        let listener = listener_with(sink.clone(), browser.clone(), None);

        let outcome = listener
            .handle_url("flarelog://auth-callback#access_token=AT1")
            .await;

        assert!(matches!(
            outcome,
            LinkOutcome::Failed(ShellError::TokenParse(_))
        ));
        assert!(sink.installed().is_empty());
        // Matched our prefix, so the browser still gets closed.
        assert_eq!(browser.close_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_token_values_are_rejected() {
        let sink = Arc::new(MockSink::new());
        let browser = Arc::new(MockBrowser::new());
        let listener = listener_with(sink.clone(), browser.clone(), None);

        let outcome = listener
            .handle_url("flarelog://auth-callback#access_token=AT1&refresh_token=")
            .await;

        assert!(matches!(
            outcome,
            LinkOutcome::Failed(ShellError::TokenParse(_))
        ));
        assert!(sink.installed().is_empty());
    }

    #[tokio::test]
    async fn test_no_fragment_is_a_parse_failure() {
        let sink = Arc::new(MockSink::new());
        let browser = Arc::new(MockBrowser::new());
        let listener = listener_with(sink.clone(), browser.clone(), None);

        let outcome = listener.handle_url("flarelog://auth-callback").await;

        assert!(matches!(
            outcome,
            LinkOutcome::Failed(ShellError::TokenParse(_))
        ));
    }

    #[tokio::test]
    async fn test_nonce_mode_claims_from_relay() {
        let sink = Arc::new(MockSink::new());
        let browser = Arc::new(MockBrowser::new());
        let listener = listener_with(sink.clone(), browser.clone(), Some(pair("AT9", "RT9")));

        let outcome = listener
            .handle_url("flarelog://auth-callback#nonce=abc123")
            .await;

        assert!(matches!(outcome, LinkOutcome::SessionInstalled));
        assert_eq!(sink.installed(), vec![pair("AT9", "RT9")]);
    }

    #[tokio::test]
    async fn test_nonce_mode_consumed_handoff_fails() {
        let sink = Arc::new(MockSink::new());
        let browser = Arc::new(MockBrowser::new());
        let listener = listener_with(sink.clone(), browser.clone(), None);

        let outcome = listener
            .handle_url("flarelog://auth-callback#nonce=abc123")
            .await;

        assert!(matches!(
            outcome,
            LinkOutcome::Failed(ShellError::HandoffNotFound)
        ));
        assert!(sink.installed().is_empty());
        assert_eq!(browser.close_count(), 1);
    }

    #[tokio::test]
    async fn test_sink_failure_is_handled_not_retried() {
        let sink = Arc::new(MockSink::failing());
        let browser = Arc::new(MockBrowser::new());
        let listener = listener_with(sink.clone(), browser.clone(), None);

        let outcome = listener
            .handle_url("flarelog://auth-callback#access_token=AT1&refresh_token=RT1")
            .await;

        assert!(matches!(
            outcome,
            LinkOutcome::Failed(ShellError::SessionSet(_))
        ));
        assert_eq!(browser.close_count(), 1);
    }

    #[test]
    fn test_parse_fragment_decodes_pairs() {
        let params =
            parse_fragment("flarelog://auth-callback#access_token=a%2Fb&refresh_token=c&x=1");
        assert_eq!(params.get("access_token").unwrap(), "a/b");
        assert_eq!(params.get("refresh_token").unwrap(), "c");
        assert_eq!(params.get("x").unwrap(), "1");
    }

    #[test]
    fn test_parse_fragment_ignores_query_string() {
        // Tokens ride the fragment, not the query — a query-only URL has
        // nothing to extract.
        let params = parse_fragment("flarelog://auth-callback?access_token=a&refresh_token=b");
        assert!(params.is_empty());
    }
}
