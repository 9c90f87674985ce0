use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The settlement status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromSql, ToSql)]
#[postgres(name = "payment_status")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[postgres(name = "pending")]
    Pending,
    #[postgres(name = "paid")]
    Paid,
    #[postgres(name = "overdue")]
    Overdue,
    #[postgres(name = "cancelled")]
    Cancelled,
}

/// An invoice attached to exactly one service request and one user.
///
/// Amounts are integer cents. The gateway that actually moves money is an
/// external collaborator; this record tracks what it reported.
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: Uuid,
    /// The human-readable payment code (`PAY-` + 8 alphanumeric), unique.
    pub payment_code: String,
    pub request_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
