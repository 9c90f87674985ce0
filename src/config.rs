use std::env;
use anyhow::{bail, Context, Result};

/// Where session records live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionBackend {
    /// Durable, shared across instances.
    Redis,
    /// Process-local; fine for a single instance.
    Memory,
}

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The URL of the Redis server.
    pub redis_url: String,
    /// The duration of a session in days.
    pub session_duration_days: i64,
    /// The session store backend.
    pub session_backend: SessionBackend,
    /// Whether the owner of a pending request may cancel it.
    pub allow_self_cancel: bool,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let session_backend = match env::var("SESSION_BACKEND")
            .unwrap_or_else(|_| "redis".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "redis" => SessionBackend::Redis,
            "memory" => SessionBackend::Memory,
            other => bail!("Invalid SESSION_BACKEND: {} (expected redis or memory)", other),
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            session_duration_days: env::var("SESSION_DURATION_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .context("Invalid SESSION_DURATION_DAYS")?,
            session_backend,
            allow_self_cancel: env::var("ALLOW_SELF_CANCEL")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}
