use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a registered identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromSql, ToSql)]
#[postgres(name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[postgres(name = "user")]
    User,
    #[postgres(name = "admin")]
    Admin,
}

/// Represents a registered account.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    /// The unique identifier for the identity.
    pub id: Uuid,
    /// The identity's email address, unique across the system.
    pub email: String,
    /// The Argon2id password hash. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// The identity's first name.
    pub first_name: String,
    /// The identity's last name.
    pub last_name: String,
    /// The identity's role.
    pub role: Role,
    /// Whether the account is active. Inactive accounts cannot resolve sessions.
    pub is_active: bool,
    /// The timestamp when the account was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Returns a copy with the password hash scrubbed, for handing outside
    /// the credential layer.
    pub fn sans_secret(mut self) -> Self {
        self.password_hash = String::new();
        self
    }
}
