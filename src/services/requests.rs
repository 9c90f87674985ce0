use uuid::Uuid;

use crate::crypto::tokens;
use crate::error::{AppError, Result};
use crate::models::request::{Priority, ServiceRequest};
use crate::models::stats::StatsSummary;
use crate::models::user::{Identity, Role};
use crate::repositories::{request as request_repo, service_type as service_type_repo};
use crate::services::{authz, stats};
use crate::state::AppState;
use crate::validation::requests::{validate_description, validate_title};

/// A submission draft, as received from the owner.
#[derive(Debug)]
pub struct NewRequestInput {
    pub service_type_id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

/// Submits a new request in the `pending` state.
///
/// Validates the draft, checks the service type reference, and assigns a
/// fresh `REQ-` code.
pub async fn submit(
    state: &AppState,
    owner: &Identity,
    input: NewRequestInput,
) -> Result<ServiceRequest> {
    validate_title(&input.title)?;
    validate_description(&input.description)?;

    service_type_repo::find_active(&state.db, &input.service_type_id)
        .await?
        .ok_or_else(|| AppError::Validation("Unknown service type".to_string()))?;

    let request_code = tokens::generate_code("REQ");

    let request = request_repo::create(
        &state.db,
        &request_code,
        &owner.id,
        &input.service_type_id,
        input.title.trim(),
        input.description.trim(),
        input.priority,
    )
    .await?;

    tracing::info!(
        "✅ Request {} submitted by {}",
        request.request_code,
        owner.id
    );
    Ok(request)
}

/// Lists the requests the identity may see: admins see all, users their own.
pub async fn list_for(state: &AppState, identity: &Identity) -> Result<Vec<ServiceRequest>> {
    match identity.role {
        Role::Admin => request_repo::list_all(&state.db).await,
        Role::User => request_repo::list_by_user(&state.db, &identity.id).await,
    }
}

/// Fetches one request, enforcing owner-or-admin visibility.
pub async fn get_visible(
    state: &AppState,
    identity: &Identity,
    request_id: Uuid,
) -> Result<ServiceRequest> {
    let request = request_repo::find_by_id(&state.db, &request_id)
        .await?
        .ok_or(AppError::NotFound)?;

    authz::require_owner_or_admin(identity, request.user_id)?;
    Ok(request)
}

/// Computes the role-scoped status summary.
pub async fn stats_for(state: &AppState, identity: &Identity) -> Result<StatsSummary> {
    let requests = list_for(state, identity).await?;
    Ok(stats::aggregate(&requests))
}
