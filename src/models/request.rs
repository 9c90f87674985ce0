use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The lifecycle status of a service request.
///
/// The reachable transitions are:
///
/// ```text
/// pending -> approved | rejected
/// approved -> in_progress
/// in_progress -> completed
/// ```
///
/// `rejected` and `completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromSql, ToSql)]
#[postgres(name = "request_status")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[postgres(name = "pending")]
    Pending,
    #[postgres(name = "approved")]
    Approved,
    #[postgres(name = "in_progress")]
    InProgress,
    #[postgres(name = "completed")]
    Completed,
    #[postgres(name = "rejected")]
    Rejected,
}

impl RequestStatus {
    /// The statuses directly reachable from this one.
    pub fn successors(self) -> &'static [RequestStatus] {
        match self {
            RequestStatus::Pending => &[RequestStatus::Approved, RequestStatus::Rejected],
            RequestStatus::Approved => &[RequestStatus::InProgress],
            RequestStatus::InProgress => &[RequestStatus::Completed],
            RequestStatus::Completed | RequestStatus::Rejected => &[],
        }
    }

    /// Whether `target` is a direct successor of this status.
    pub fn can_transition_to(self, target: RequestStatus) -> bool {
        self.successors().contains(&target)
    }

    /// Whether no further transitions are permitted.
    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    /// The lowercase wire name, as serialized and stored.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Rejected => "rejected",
        }
    }
}

/// The priority of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromSql, ToSql)]
#[postgres(name = "request_priority")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[postgres(name = "standard")]
    Standard,
    #[postgres(name = "expedited")]
    Expedited,
}

/// A customer-submitted unit of work moving through the lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceRequest {
    /// The unique identifier for the request.
    pub id: Uuid,
    /// The human-readable request code (`REQ-` + 8 alphanumeric), immutable.
    pub request_code: String,
    /// The ID of the submitting user.
    pub user_id: Uuid,
    /// The referenced service type.
    pub service_type_id: Uuid,
    /// A short title for the request.
    pub title: String,
    /// A free-form description of the work.
    pub description: String,
    /// The requested priority.
    pub priority: Priority,
    /// The current lifecycle status.
    pub status: RequestStatus,
    /// The quoted total, in cents. Set by an admin at approval.
    pub total_amount: Option<i64>,
    /// Internal notes, visible to admins.
    pub admin_notes: Option<String>,
    /// The reason given when the request was rejected.
    pub rejection_reason: Option<String>,
    /// When the request was approved, if it was.
    pub approved_at: Option<DateTime<Utc>>,
    /// When the request was rejected, if it was.
    pub rejected_at: Option<DateTime<Utc>>,
    /// The timestamp when the request was submitted.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the request was last updated.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RequestStatus; 5] = [
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Rejected,
    ];

    #[test]
    fn pending_branches_to_approved_or_rejected() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Approved));
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Rejected));
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::InProgress));
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Completed));
    }

    #[test]
    fn no_skipping_intermediate_states() {
        // pending cannot jump straight to completed
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Completed));
        // approved must pass through in_progress
        assert!(!RequestStatus::Approved.can_transition_to(RequestStatus::Completed));
    }

    #[test]
    fn linear_tail_of_the_happy_path() {
        assert_eq!(
            RequestStatus::Approved.successors(),
            &[RequestStatus::InProgress]
        );
        assert_eq!(
            RequestStatus::InProgress.successors(),
            &[RequestStatus::Completed]
        );
    }

    #[test]
    fn terminal_states_refuse_everything() {
        for terminal in [RequestStatus::Completed, RequestStatus::Rejected] {
            assert!(terminal.is_terminal());
            for target in ALL {
                assert!(!terminal.can_transition_to(target));
            }
        }
    }

    #[test]
    fn no_status_transitions_to_itself() {
        for status in ALL {
            assert!(!status.can_transition_to(status));
        }
    }
}
