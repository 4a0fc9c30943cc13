//! Background purge daemon for stale handoffs.
//!
//! Runs every 60 seconds. Deletes handoff records older than the retention
//! window that were never claimed, so stale token pairs do not accumulate.

use std::sync::Arc;
use tracing::{error, info};

/// Start the purge daemon loop.
pub async fn purge_daemon(state: Arc<crate::AppState>) {
    let interval = tokio::time::Duration::from_secs(60);
    info!(
        "Handoff purge daemon started (interval: 60s, ttl: {}m)",
        state.config.handoff_ttl_minutes
    );

    loop {
        tokio::time::sleep(interval).await;
        if let Err(e) = purge_cycle(&state).await {
            error!("Purge cycle error: {e}");
        }
    }
}

async fn purge_cycle(state: &crate::AppState) -> Result<(), crate::error::RelayError> {
    let purged = state
        .store
        .purge_expired(state.config.handoff_ttl_minutes)
        .await?;

    if purged > 0 {
        info!("Purged {purged} expired handoffs");
        let _ = state
            .store
            .log_event("handoff.purged", "", serde_json::json!({ "count": purged }))
            .await;
    }

    Ok(())
}
