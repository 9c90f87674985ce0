use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A service offered by the shop, referenced by service requests.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub base_price_cents: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
