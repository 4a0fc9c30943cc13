use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use flarelog_auth::config::Config;
use flarelog_auth::crypto::CryptoEngine;
use flarelog_auth::store::TokenStore;
use flarelog_auth::{api, store, AppState, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flarelog_auth=info".into()),
        )
        .init();

    // Load config
    let config = Config::from_env()?;
    info!("flarelog-auth v{}", env!("CARGO_PKG_VERSION"));
    info!("Listening on {}:{}", config.host, config.port);

    // Initialize components
    let crypto = CryptoEngine::new(&config.master_key)?;
    let token_store = TokenStore::new(&config.database_url).await?;
    token_store.migrate().await?;
    info!("Database connected and migrated ✓");

    // Build shared state
    let state: SharedState = Arc::new(AppState {
        config: config.clone(),
        store: token_store,
        crypto,
    });

    // Start purge daemon
    let daemon_state = state.clone();
    tokio::spawn(async move {
        store::purge_daemon(daemon_state).await;
    });

    // Build router
    let app = api::router(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server ready ✓");
    axum::serve(listener, app).await?;

    Ok(())
}
