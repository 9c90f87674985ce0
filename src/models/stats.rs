use serde::Serialize;

/// Per-status counts over a collection of service requests.
///
/// `total` always equals the sum of the five buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub pending: u64,
    pub approved: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub rejected: u64,
    pub total: u64,
}
