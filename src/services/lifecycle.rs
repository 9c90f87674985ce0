use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::request::{RequestStatus, ServiceRequest};
use crate::models::user::{Identity, Role};
use crate::repositories::request as request_repo;
use crate::state::AppState;

/// The reason recorded when an owner cancels their own pending request.
const SELF_CANCEL_REASON: &str = "Cancelled by requester";

/// The caller's transition payload.
#[derive(Debug)]
pub struct TransitionInput {
    pub target: RequestStatus,
    pub reason: Option<String>,
    pub admin_notes: Option<String>,
    pub total_amount: Option<i64>,
}

/// A validated transition, ready to be applied atomically.
///
/// `expected` pins the status the plan was computed against; the
/// conditional update refuses to commit if the row has moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub expected: RequestStatus,
    pub target: RequestStatus,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

/// Validates a transition against the state machine and the actor.
///
/// Checks run fail-closed and in order: who may act, then whether the
/// target is a direct successor, then what the target demands.
///
/// # Arguments
///
/// * `request` - The request as currently read.
/// * `actor` - The authenticated identity attempting the transition.
/// * `target` - The requested target status.
/// * `reason` - The rejection reason, when targeting `rejected`.
/// * `allow_self_cancel` - Whether owners may cancel their own pending requests.
/// * `now` - The transition instant.
pub fn plan_transition(
    request: &ServiceRequest,
    actor: &Identity,
    target: RequestStatus,
    reason: Option<&str>,
    allow_self_cancel: bool,
    now: DateTime<Utc>,
) -> Result<TransitionPlan> {
    let is_self_cancel = actor.role != Role::Admin
        && allow_self_cancel
        && actor.id == request.user_id
        && request.status == RequestStatus::Pending
        && target == RequestStatus::Rejected;

    if actor.role != Role::Admin && !is_self_cancel {
        return Err(AppError::Forbidden);
    }

    if !request.status.can_transition_to(target) {
        return Err(AppError::InvalidTransition(format!(
            "cannot move a {} request to {}",
            request.status.as_str(),
            target.as_str()
        )));
    }

    let mut plan = TransitionPlan {
        expected: request.status,
        target,
        updated_at: now,
        approved_at: None,
        rejected_at: None,
        rejection_reason: None,
    };

    match target {
        RequestStatus::Approved => {
            plan.approved_at = Some(now);
        }
        RequestStatus::Rejected => {
            let reason = reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .or_else(|| is_self_cancel.then(|| SELF_CANCEL_REASON.to_string()))
                .ok_or_else(|| {
                    AppError::Validation("A rejection reason is required".to_string())
                })?;
            plan.rejected_at = Some(now);
            plan.rejection_reason = Some(reason);
        }
        _ => {}
    }

    Ok(plan)
}

/// Disambiguates a conditional update that matched zero rows.
///
/// The row being gone is `NotFound`; the row still existing means a
/// concurrent transition won the race.
fn race_outcome(current: Option<&ServiceRequest>) -> AppError {
    match current {
        None => AppError::NotFound,
        Some(request) => AppError::Conflict(format!(
            "request {} was concurrently moved to {}",
            request.request_code,
            request.status.as_str()
        )),
    }
}

/// Transitions a request, end to end.
///
/// Read, plan, apply conditionally, then fire the best-effort
/// notification. A lost race surfaces as `Conflict`, never as a
/// silently inconsistent row.
pub async fn transition(
    state: &AppState,
    actor: &Identity,
    request_id: Uuid,
    input: TransitionInput,
) -> Result<ServiceRequest> {
    let request = request_repo::find_by_id(&state.db, &request_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let plan = plan_transition(
        &request,
        actor,
        input.target,
        input.reason.as_deref(),
        state.config.allow_self_cancel,
        Utc::now(),
    )?;

    // Notes and amounts ride along on admin transitions only.
    let (admin_notes, total_amount) = if actor.role == Role::Admin {
        (input.admin_notes, input.total_amount)
    } else {
        (None, None)
    };

    let updated = request_repo::apply_transition(
        &state.db,
        &request_id,
        plan.expected,
        plan.target,
        plan.updated_at,
        plan.approved_at,
        plan.rejected_at,
        plan.rejection_reason.as_deref(),
        admin_notes.as_deref(),
        total_amount,
    )
    .await?;

    let updated = match updated {
        Some(request) => request,
        None => {
            let current = request_repo::find_by_id(&state.db, &request_id).await?;
            return Err(race_outcome(current.as_ref()));
        }
    };

    tracing::info!(
        "✅ Request {} moved {} -> {} by {}",
        updated.request_code,
        plan.expected.as_str(),
        updated.status.as_str(),
        actor.id
    );

    let notifier = state.notifier.clone();
    let snapshot = updated.clone();
    let actor_id = actor.id;
    tokio::spawn(async move {
        if let Err(e) = notifier.request_transitioned(&snapshot, actor_id).await {
            tracing::warn!(
                "Notification for request {} failed: {}",
                snapshot.request_code,
                e
            );
        }
    });

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::Priority;
    use chrono::Duration;

    fn identity_with(role: Role) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "actor@shop.test".to_string(),
            password_hash: String::new(),
            first_name: "Actor".to_string(),
            last_name: "One".to_string(),
            role,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request_with(status: RequestStatus, owner: Uuid) -> ServiceRequest {
        let created = Utc::now() - Duration::hours(2);
        ServiceRequest {
            id: Uuid::new_v4(),
            request_code: "REQ-7F2K9QXB".to_string(),
            user_id: owner,
            service_type_id: Uuid::new_v4(),
            title: "Brake pads grinding".to_string(),
            description: "Grinding noise when braking downhill".to_string(),
            priority: Priority::Standard,
            status,
            total_amount: None,
            admin_notes: None,
            rejection_reason: None,
            approved_at: None,
            rejected_at: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn admin_approval_stamps_approved_at_only() {
        let admin = identity_with(Role::Admin);
        let request = request_with(RequestStatus::Pending, Uuid::new_v4());
        let now = Utc::now();

        let plan =
            plan_transition(&request, &admin, RequestStatus::Approved, None, false, now).unwrap();

        assert_eq!(plan.expected, RequestStatus::Pending);
        assert_eq!(plan.target, RequestStatus::Approved);
        assert_eq!(plan.approved_at, Some(now));
        assert_eq!(plan.rejected_at, None);
        assert_eq!(plan.updated_at, now);
    }

    #[test]
    fn happy_path_plans_through_to_completion() {
        let admin = identity_with(Role::Admin);
        let owner = Uuid::new_v4();
        let now = Utc::now();

        for (from, to) in [
            (RequestStatus::Pending, RequestStatus::Approved),
            (RequestStatus::Approved, RequestStatus::InProgress),
            (RequestStatus::InProgress, RequestStatus::Completed),
        ] {
            let request = request_with(from, owner);
            let plan = plan_transition(&request, &admin, to, None, false, now).unwrap();
            assert_eq!(plan.expected, from);
            assert_eq!(plan.target, to);
        }
    }

    #[test]
    fn skipping_states_is_an_invalid_transition() {
        let admin = identity_with(Role::Admin);
        let request = request_with(RequestStatus::Pending, Uuid::new_v4());

        assert!(matches!(
            plan_transition(
                &request,
                &admin,
                RequestStatus::Completed,
                None,
                false,
                Utc::now()
            ),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn terminal_states_refuse_even_admins() {
        let admin = identity_with(Role::Admin);

        for terminal in [RequestStatus::Completed, RequestStatus::Rejected] {
            let request = request_with(terminal, Uuid::new_v4());
            for target in [
                RequestStatus::Pending,
                RequestStatus::Approved,
                RequestStatus::InProgress,
                RequestStatus::Completed,
                RequestStatus::Rejected,
            ] {
                assert!(matches!(
                    plan_transition(&request, &admin, target, Some("why"), false, Utc::now()),
                    Err(AppError::InvalidTransition(_))
                ));
            }
        }
    }

    #[test]
    fn rejection_requires_a_reason() {
        let admin = identity_with(Role::Admin);
        let request = request_with(RequestStatus::Pending, Uuid::new_v4());
        let now = Utc::now();

        assert!(matches!(
            plan_transition(&request, &admin, RequestStatus::Rejected, None, false, now),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            plan_transition(
                &request,
                &admin,
                RequestStatus::Rejected,
                Some("   "),
                false,
                now
            ),
            Err(AppError::Validation(_))
        ));

        let plan = plan_transition(
            &request,
            &admin,
            RequestStatus::Rejected,
            Some("No parts available"),
            false,
            now,
        )
        .unwrap();
        assert_eq!(plan.rejected_at, Some(now));
        assert_eq!(plan.approved_at, None);
        assert_eq!(plan.rejection_reason.as_deref(), Some("No parts available"));
    }

    #[test]
    fn strangers_are_forbidden_regardless_of_target() {
        let stranger = identity_with(Role::User);
        let request = request_with(RequestStatus::Pending, Uuid::new_v4());

        for target in [
            RequestStatus::Approved,
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Rejected,
        ] {
            assert!(matches!(
                plan_transition(&request, &stranger, target, Some("x"), true, Utc::now()),
                Err(AppError::Forbidden)
            ));
        }
    }

    #[test]
    fn owners_cannot_transition_unless_self_cancel_is_enabled() {
        let owner = identity_with(Role::User);
        let request = request_with(RequestStatus::Pending, owner.id);

        assert!(matches!(
            plan_transition(
                &request,
                &owner,
                RequestStatus::Rejected,
                None,
                false,
                Utc::now()
            ),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn self_cancel_lands_in_rejected_with_the_fixed_reason() {
        let owner = identity_with(Role::User);
        let request = request_with(RequestStatus::Pending, owner.id);
        let now = Utc::now();

        let plan =
            plan_transition(&request, &owner, RequestStatus::Rejected, None, true, now).unwrap();

        assert_eq!(plan.target, RequestStatus::Rejected);
        assert_eq!(plan.rejected_at, Some(now));
        assert_eq!(
            plan.rejection_reason.as_deref(),
            Some("Cancelled by requester")
        );
    }

    #[test]
    fn self_cancel_only_applies_to_pending_requests_and_cancellation() {
        let owner = identity_with(Role::User);

        // already approved: the window has closed
        let approved = request_with(RequestStatus::Approved, owner.id);
        assert!(matches!(
            plan_transition(
                &approved,
                &owner,
                RequestStatus::Rejected,
                None,
                true,
                Utc::now()
            ),
            Err(AppError::Forbidden)
        ));

        // owners never get to approve their own requests
        let pending = request_with(RequestStatus::Pending, owner.id);
        assert!(matches!(
            plan_transition(
                &pending,
                &owner,
                RequestStatus::Approved,
                None,
                true,
                Utc::now()
            ),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn lost_race_is_a_conflict_and_missing_row_is_not_found() {
        assert!(matches!(race_outcome(None), AppError::NotFound));

        let moved = request_with(RequestStatus::Approved, Uuid::new_v4());
        assert!(matches!(
            race_outcome(Some(&moved)),
            AppError::Conflict(_)
        ));
    }
}
