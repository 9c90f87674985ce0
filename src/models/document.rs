use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The review status of an uploaded document record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromSql, ToSql)]
#[postgres(name = "document_status")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[postgres(name = "pending")]
    Pending,
    #[postgres(name = "verified")]
    Verified,
    #[postgres(name = "rejected")]
    Rejected,
}

/// A document record attached to exactly one service request.
///
/// Only metadata lives here; the upload transport is outside this service.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: Uuid,
    pub request_id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub document_type: String,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
}
