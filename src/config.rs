use anyhow::{Context, Result};

/// Application configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // ── Server ──────────────────────────────────────────────────────────
    pub host: String,
    pub port: u16,

    // ── Database (PostgreSQL, shared with the app backend) ─────────────
    pub database_url: String,

    // ── Crypto ──────────────────────────────────────────────────────────
    /// 32-byte base64-encoded master key for AES-256-GCM encryption of
    /// handoff tokens at rest.
    pub master_key: String,

    // ── Handoff retention ───────────────────────────────────────────────
    /// How long an unconsumed handoff stays claimable. Stale records are
    /// rejected at read time and swept by the purge daemon.
    pub handoff_ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8710".into())
                .parse()
                .context("Invalid PORT")?,

            database_url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL is required (PostgreSQL connection string)")?,
            master_key: std::env::var("MASTER_KEY")
                .context("MASTER_KEY is required (32 bytes, base64)")?,

            handoff_ttl_minutes: std::env::var("HANDOFF_TTL_MINUTES")
                .unwrap_or_else(|_| "5".into())
                .parse()
                .context("Invalid HANDOFF_TTL_MINUTES")?,
        })
    }
}
