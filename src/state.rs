use deadpool_postgres::Pool;
use redis::aio::ConnectionManager;
use std::sync::Arc;

use crate::config::{Config, SessionBackend};
use crate::error::Result;
use crate::services::credentials::{CredentialStore, PgCredentialStore};
use crate::services::notify::{LogNotifier, Notifier};
use crate::services::sessions::{MemorySessionStore, RedisSessionStore, SessionStore};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: Pool,
    /// The Redis connection manager (rate limiting, CSRF tokens).
    pub redis: ConnectionManager,
    /// The session store.
    pub sessions: Arc<dyn SessionStore>,
    /// The credential store.
    pub credentials: Arc<dyn CredentialStore>,
    /// The lifecycle notification channel.
    pub notifier: Arc<dyn Notifier>,
    /// The application's configuration.
    pub config: Config,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        tracing::info!("✅ PostgreSQL pool initialized");

        let redis_client = redis::Client::open(config.redis_url.as_str())?;
        let redis = ConnectionManager::new(redis_client).await?;
        tracing::info!("✅ Redis connection manager initialized");

        let sessions: Arc<dyn SessionStore> = match config.session_backend {
            SessionBackend::Redis => Arc::new(RedisSessionStore::new(redis.clone())),
            SessionBackend::Memory => {
                tracing::warn!("⚠️ Using in-process sessions; logins will not survive a restart");
                Arc::new(MemorySessionStore::new())
            }
        };
        let credentials: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(db.clone()));
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

        Ok(AppState {
            db,
            redis,
            sessions,
            credentials,
            notifier,
            config: config.clone(),
        })
    }
}
