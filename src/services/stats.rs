use crate::models::request::{RequestStatus, ServiceRequest};
use crate::models::stats::StatsSummary;

/// Folds a collection of requests into per-status counts.
///
/// Pure and deterministic; role scoping happens in the query that
/// produced `requests`, not here. Recomputed per call, no caching.
pub fn aggregate(requests: &[ServiceRequest]) -> StatsSummary {
    let mut summary = StatsSummary::default();

    for request in requests {
        match request.status {
            RequestStatus::Pending => summary.pending += 1,
            RequestStatus::Approved => summary.approved += 1,
            RequestStatus::InProgress => summary.in_progress += 1,
            RequestStatus::Completed => summary.completed += 1,
            RequestStatus::Rejected => summary.rejected += 1,
        }
        summary.total += 1;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::Priority;
    use chrono::Utc;
    use uuid::Uuid;

    fn request_with(status: RequestStatus) -> ServiceRequest {
        let now = Utc::now();
        ServiceRequest {
            id: Uuid::new_v4(),
            request_code: "REQ-TESTTEST".to_string(),
            user_id: Uuid::new_v4(),
            service_type_id: Uuid::new_v4(),
            title: "t".to_string(),
            description: "d".to_string(),
            priority: Priority::Standard,
            status,
            total_amount: None,
            admin_notes: None,
            rejection_reason: None,
            approved_at: None,
            rejected_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_collection_aggregates_to_zero() {
        let summary = aggregate(&[]);
        assert_eq!(summary, StatsSummary::default());
        assert_eq!(summary.total, 0);
    }

    #[test]
    fn counts_sum_to_total_which_is_the_input_size() {
        let requests: Vec<ServiceRequest> = [
            RequestStatus::Pending,
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Completed,
            RequestStatus::Completed,
            RequestStatus::Rejected,
        ]
        .into_iter()
        .map(request_with)
        .collect();

        let summary = aggregate(&requests);

        assert_eq!(summary.pending, 2);
        assert_eq!(summary.approved, 1);
        assert_eq!(summary.in_progress, 1);
        assert_eq!(summary.completed, 3);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.total, requests.len() as u64);
        assert_eq!(
            summary.pending
                + summary.approved
                + summary.in_progress
                + summary.completed
                + summary.rejected,
            summary.total
        );
    }

    #[test]
    fn aggregation_is_deterministic() {
        let requests: Vec<ServiceRequest> = [RequestStatus::Pending, RequestStatus::Rejected]
            .into_iter()
            .map(request_with)
            .collect();

        assert_eq!(aggregate(&requests), aggregate(&requests));
    }
}
