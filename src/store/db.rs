//! PostgreSQL-backed store for native-auth token handoffs and audit events.
//!
//! Tables:
//! - `auth_handoffs`: encrypted token pairs keyed by single-use nonce
//! - `relay_events`: audit log for store/claim/purge operations

use crate::crypto::CryptoEngine;
use crate::error::RelayError;
use serde::Serialize;
use sqlx::{PgPool, Row};

/// Handoff store backed by PostgreSQL.
pub struct TokenStore {
    pub pool: PgPool,
}

impl TokenStore {
    pub async fn new(db_url: &str) -> Result<Self, RelayError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(db_url)
            .await
            .map_err(|e| RelayError::Storage(format!("Failed to connect to PostgreSQL: {e}")))?;

        Ok(Self { pool })
    }

    /// Run schema migrations.
    pub async fn migrate(&self) -> Result<(), RelayError> {
        // Handoff table: one live record per nonce, claimed at most once
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS auth_handoffs (
                nonce           TEXT PRIMARY KEY,
                access_token    TEXT NOT NULL,
                refresh_token   TEXT NOT NULL,
                created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Audit events table
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS relay_events (
                id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                event_type  TEXT NOT NULL,
                nonce       TEXT DEFAULT '',
                metadata    JSONB DEFAULT '{}',
                created_at  TIMESTAMPTZ DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Index for the purge sweep
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_auth_handoffs_created ON auth_handoffs(created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Upsert a token pair under a nonce (stores encrypted tokens).
    ///
    /// Last-writer-wins: a second store for the same nonce overwrites the
    /// first and restarts its expiry clock.
    pub async fn put_handoff(
        &self,
        crypto: &CryptoEngine,
        nonce: &str,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), RelayError> {
        let enc_access = crypto.encrypt(access_token)?;
        let enc_refresh = crypto.encrypt(refresh_token)?;

        sqlx::query(
            r#"
            INSERT INTO auth_handoffs (nonce, access_token, refresh_token)
            VALUES ($1, $2, $3)
            ON CONFLICT (nonce)
            DO UPDATE SET
                access_token = EXCLUDED.access_token,
                refresh_token = EXCLUDED.refresh_token,
                created_at = NOW()
            "#,
        )
        .bind(nonce)
        .bind(&enc_access)
        .bind(&enc_refresh)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Claim a handoff: delete the record and return its decrypted tokens.
    ///
    /// The delete and the read are one statement, so exactly one of two
    /// concurrent claims for the same nonce gets the row. Records older
    /// than `ttl_minutes` are deleted but reported as absent.
    pub async fn take_handoff(
        &self,
        crypto: &CryptoEngine,
        nonce: &str,
        ttl_minutes: i64,
    ) -> Result<Option<HandoffTokens>, RelayError> {
        let row = sqlx::query(
            r#"
            DELETE FROM auth_handoffs
            WHERE nonce = $1
            RETURNING access_token, refresh_token,
                      (created_at < NOW() - ($2 || ' minutes')::interval) AS stale
            "#,
        )
        .bind(nonce)
        .bind(ttl_minutes.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        let stale: bool = row.get(2);
        if stale {
            tracing::debug!("Handoff {nonce} expired before claim");
            return Ok(None);
        }

        let enc_access: String = row.get(0);
        let enc_refresh: String = row.get(1);

        Ok(Some(HandoffTokens {
            access_token: crypto.decrypt(&enc_access)?,
            refresh_token: crypto.decrypt(&enc_refresh)?,
        }))
    }

    /// Delete handoffs older than the retention window (for the purge daemon).
    pub async fn purge_expired(&self, ttl_minutes: i64) -> Result<u64, RelayError> {
        let affected = sqlx::query(
            "DELETE FROM auth_handoffs WHERE created_at < NOW() - ($1 || ' minutes')::interval",
        )
        .bind(ttl_minutes.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected)
    }

    /// Log an audit event.
    pub async fn log_event(
        &self,
        event_type: &str,
        nonce: &str,
        metadata: serde_json::Value,
    ) -> Result<(), RelayError> {
        sqlx::query(
            r#"
            INSERT INTO relay_events (event_type, nonce, metadata)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(event_type)
        .bind(nonce)
        .bind(metadata)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Expose the pool for direct use by other modules.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ── Types ────────────────────────────────────────────────────────────────────

/// A decrypted token pair claimed from the store.
#[derive(Debug, Serialize)]
pub struct HandoffTokens {
    pub access_token: String,
    pub refresh_token: String,
}
