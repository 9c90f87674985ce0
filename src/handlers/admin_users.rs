use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    middleware_layer::auth::CurrentUser,
    models::user::Role,
    repositories::user as user_repo,
    state::AppState,
};

/// The request payload for activating or deactivating an account.
#[derive(Deserialize, Debug)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// The request payload for changing an account's role.
#[derive(Deserialize, Debug)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// Lists every account. Admin router only.
#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> Result<Response> {
    let users = user_repo::list(&state.db).await?;
    Ok((StatusCode::OK, Json(users)).into_response())
}

/// Activates or deactivates an account.
///
/// Deactivation does not sweep sessions; they die at their next
/// resolution.
#[axum::debug_handler]
pub async fn set_user_active(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<SetActiveRequest>,
) -> Result<impl IntoResponse> {
    if user_id == current.0.id {
        return Err(AppError::Validation(
            "You cannot deactivate your own account".to_string(),
        ));
    }

    let user = user_repo::set_active(&state.db, &user_id, payload.is_active)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(
        "👤 Account {} set active={} by {}",
        user.id,
        user.is_active,
        current.0.id
    );

    Ok((StatusCode::OK, Json(user.sans_secret())).into_response())
}

/// Changes an account's role.
#[axum::debug_handler]
pub async fn set_user_role(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<SetRoleRequest>,
) -> Result<Response> {
    if user_id == current.0.id {
        return Err(AppError::Validation(
            "You cannot change your own role".to_string(),
        ));
    }

    let user = user_repo::set_role(&state.db, &user_id, payload.role)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(
        "👤 Account {} role changed to {:?} by {}",
        user.id,
        user.role,
        current.0.id
    );

    Ok((StatusCode::OK, Json(user.sans_secret())).into_response())
}
