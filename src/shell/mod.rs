//! Shell-side half of the native auth handshake.
//!
//! A wrapped native build cannot finish a web OAuth redirect, so sign-in
//! runs through the system browser and comes back via a custom-scheme deep
//! link. The pieces here are wired once at application startup:
//!
//! - [`flow::SignInFlow`] opens the identity provider in the system browser
//!   with the redirect target pinned to the bridge page;
//! - [`deeplink::DeepLinkListener`] receives every inbound custom-scheme
//!   URL for the app's lifetime, extracts the token pair (directly from the
//!   fragment, or by claiming a nonce from the handoff endpoint), and
//!   installs it through the [`session::SessionSink`] seam;
//! - [`browser::SystemBrowser`] and [`relay_client::TokenRelay`] are the
//!   platform capabilities behind both, chosen at startup and injectable
//!   for tests.

pub mod browser;
pub mod deeplink;
pub mod flow;
pub mod relay_client;
pub mod session;
pub mod types;

pub use browser::{DesktopBrowser, LaunchOutcome, SystemBrowser};
pub use deeplink::{DeepLinkListener, LinkOutcome, CALLBACK_PREFIX};
pub use flow::{ShellConfig, SignInFlow};
pub use relay_client::{RelayClient, TokenRelay};
pub use session::{SessionManager, SessionSink};
pub use types::{AuthSession, FlowState, SessionTokens, ShellError};
