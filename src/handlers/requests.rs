use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::Result,
    middleware_layer::auth::CurrentUser,
    models::request::{Priority, RequestStatus},
    services::{lifecycle, requests as request_service},
    state::AppState,
};

/// The request payload for submitting a service request.
#[derive(Deserialize, Debug)]
pub struct SubmitRequest {
    pub service_type_id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

/// The request payload for transitioning a request.
#[derive(Deserialize, Debug)]
pub struct TransitionBody {
    pub target_status: RequestStatus,
    pub reason: Option<String>,
    pub admin_notes: Option<String>,
    pub total_amount: Option<i64>,
}

/// Submits a new service request.
#[axum::debug_handler]
pub async fn submit_request(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<SubmitRequest>,
) -> Result<impl IntoResponse> {
    tracing::info!("📝 Request submission by {}", current.0.id);

    let request = request_service::submit(
        &state,
        &current.0,
        request_service::NewRequestInput {
            service_type_id: payload.service_type_id,
            title: payload.title,
            description: payload.description,
            priority: payload.priority,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(request)).into_response())
}

/// Lists requests: admins see all, users see their own.
#[axum::debug_handler]
pub async fn list_requests(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response> {
    let requests = request_service::list_for(&state, &current.0).await?;
    Ok((StatusCode::OK, Json(requests)).into_response())
}

/// Fetches one request, owner or admin only.
#[axum::debug_handler]
pub async fn get_request(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(request_id): Path<Uuid>,
) -> Result<Response> {
    let request = request_service::get_visible(&state, &current.0, request_id).await?;
    Ok((StatusCode::OK, Json(request)).into_response())
}

/// Transitions a request through the lifecycle state machine.
#[axum::debug_handler]
pub async fn transition_request(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<TransitionBody>,
) -> Result<Response> {
    tracing::info!(
        "🔀 Transition of {} to {} by {}",
        request_id,
        payload.target_status.as_str(),
        current.0.id
    );

    let request = lifecycle::transition(
        &state,
        &current.0,
        request_id,
        lifecycle::TransitionInput {
            target: payload.target_status,
            reason: payload.reason,
            admin_notes: payload.admin_notes,
            total_amount: payload.total_amount,
        },
    )
    .await?;

    Ok((StatusCode::OK, Json(request)).into_response())
}

/// Returns the role-scoped per-status counts.
#[axum::debug_handler]
pub async fn request_stats(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response> {
    let summary = request_service::stats_for(&state, &current.0).await?;
    Ok((StatusCode::OK, Json(summary)).into_response())
}
