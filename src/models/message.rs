use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Free-form communication between users and admins.
///
/// No lifecycle beyond the read flag.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Option<Uuid>,
    pub request_id: Option<Uuid>,
    pub content: String,
    pub message_type: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
