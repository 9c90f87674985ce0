use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a user session.
///
/// Owned exclusively by the session store; the client only ever holds the
/// opaque raw token. Stores key records by the SHA-256 digest of that
/// token, so a dump of the store never yields a usable cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The ID of the user this session belongs to.
    pub user_id: Uuid,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the session expires.
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Whether the session has passed its expiry instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
