use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::crypto::tokens;
use crate::error::{AppError, Result};
use crate::models::session::SessionRecord;

/// Issues, resolves, and destroys opaque session tokens.
///
/// Implementations hold the session records; callers only ever see the raw
/// token. Expiry is enforced in `resolve` regardless of any backend TTL,
/// and expired records are deleted during the failed resolution rather
/// than swept proactively.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Creates a session for `user_id` and returns the raw token.
    async fn create(&self, user_id: Uuid, ttl: Duration) -> Result<String>;

    /// Resolves a raw token to its session record.
    ///
    /// Fails with `Unauthorized` when the token is unknown or expired.
    async fn resolve(&self, raw_token: &str) -> Result<SessionRecord>;

    /// Destroys a session. Idempotent; unknown tokens are not an error.
    async fn destroy(&self, raw_token: &str) -> Result<()>;
}

fn storage_key(raw_token: &str) -> String {
    format!("session:{}", tokens::token_digest(raw_token))
}

/// The Redis-backed session store used in production wiring.
///
/// Records are serialized as JSON under `session:<digest>` with a TTL
/// matching the session duration; the TTL is defense in depth, the
/// contract lives in `resolve`.
pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, user_id: Uuid, ttl: Duration) -> Result<String> {
        let raw_token = tokens::generate_session_token();
        let now = Utc::now();
        let record = SessionRecord {
            user_id,
            created_at: now,
            expires_at: now + ttl,
        };

        let record_json = sonic_rs::to_string(&record)
            .map_err(|e| AppError::Internal(format!("Session serialization failed: {}", e)))?;

        let mut conn = self.conn.clone();
        let ttl_seconds = ttl.num_seconds().max(1) as u64;
        let _: () = conn
            .set_ex(storage_key(&raw_token), &record_json, ttl_seconds)
            .await?;

        tracing::debug!("🔑 Session created for user: {}", user_id);
        Ok(raw_token)
    }

    async fn resolve(&self, raw_token: &str) -> Result<SessionRecord> {
        let key = storage_key(raw_token);
        let mut conn = self.conn.clone();

        let record_json: Option<String> = conn.get(&key).await?;
        let record_json = record_json.ok_or(AppError::Unauthorized)?;

        let record: SessionRecord =
            sonic_rs::from_str(&record_json).map_err(|_| AppError::Unauthorized)?;

        if record.is_expired(Utc::now()) {
            let _: () = conn.del(&key).await.unwrap_or(());
            return Err(AppError::Unauthorized);
        }

        Ok(record)
    }

    async fn destroy(&self, raw_token: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(storage_key(raw_token)).await?;
        Ok(())
    }
}

/// An in-process session store for tests and single-instance runs.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: Uuid, ttl: Duration) -> Result<String> {
        let raw_token = tokens::generate_session_token();
        let now = Utc::now();
        let record = SessionRecord {
            user_id,
            created_at: now,
            expires_at: now + ttl,
        };

        self.sessions
            .write()
            .await
            .insert(storage_key(&raw_token), record);
        Ok(raw_token)
    }

    async fn resolve(&self, raw_token: &str) -> Result<SessionRecord> {
        let key = storage_key(raw_token);

        let record = self
            .sessions
            .read()
            .await
            .get(&key)
            .cloned()
            .ok_or(AppError::Unauthorized)?;

        if record.is_expired(Utc::now()) {
            self.sessions.write().await.remove(&key);
            return Err(AppError::Unauthorized);
        }

        Ok(record)
    }

    async fn destroy(&self, raw_token: &str) -> Result<()> {
        self.sessions.write().await.remove(&storage_key(raw_token));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_resolve_roundtrip() {
        let store = MemorySessionStore::new();
        let user_id = Uuid::new_v4();

        let token = store.create(user_id, Duration::days(7)).await.unwrap();
        let record = store.resolve(&token).await.unwrap();

        assert_eq!(record.user_id, user_id);
        assert!(record.expires_at > record.created_at);
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let store = MemorySessionStore::new();
        assert!(matches!(
            store.resolve("not-a-token").await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn destroyed_token_never_resolves_again() {
        let store = MemorySessionStore::new();
        let token = store.create(Uuid::new_v4(), Duration::days(7)).await.unwrap();

        store.destroy(&token).await.unwrap();
        assert!(matches!(
            store.resolve(&token).await,
            Err(AppError::Unauthorized)
        ));

        // destroying again is not an error
        store.destroy(&token).await.unwrap();
    }

    #[tokio::test]
    async fn expired_session_is_unauthorized_and_lazily_deleted() {
        let store = MemorySessionStore::new();
        let token = store
            .create(Uuid::new_v4(), Duration::seconds(-1))
            .await
            .unwrap();

        assert!(matches!(
            store.resolve(&token).await,
            Err(AppError::Unauthorized)
        ));
        // lazy cleanup removed the record entirely
        assert!(store.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn expiry_is_a_strict_boundary() {
        let now = Utc::now();
        let record = SessionRecord {
            user_id: Uuid::new_v4(),
            created_at: now - Duration::days(7),
            expires_at: now,
        };

        // valid at the expiry instant itself, expired one tick after
        assert!(!record.is_expired(record.expires_at));
        assert!(record.is_expired(record.expires_at + Duration::seconds(1)));
    }

    #[tokio::test]
    async fn one_identity_may_hold_multiple_sessions() {
        let store = MemorySessionStore::new();
        let user_id = Uuid::new_v4();

        let phone = store.create(user_id, Duration::days(7)).await.unwrap();
        let laptop = store.create(user_id, Duration::days(7)).await.unwrap();

        assert_ne!(phone, laptop);
        assert_eq!(store.resolve(&phone).await.unwrap().user_id, user_id);
        assert_eq!(store.resolve(&laptop).await.unwrap().user_id, user_id);
    }
}
