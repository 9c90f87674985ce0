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
    repositories::message as message_repo,
    services::requests as request_service,
    state::AppState,
    validation::requests::validate_message_content,
};

/// The request payload for sending a message.
///
/// A missing `to_user_id` addresses the shop (any admin).
#[derive(Deserialize, Debug)]
pub struct SendMessageRequest {
    pub to_user_id: Option<Uuid>,
    pub request_id: Option<Uuid>,
    pub content: String,
    pub message_type: Option<String>,
}

/// Sends a message.
#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse> {
    validate_message_content(&payload.content)?;

    // A referenced request must be one the sender may see.
    if let Some(request_id) = payload.request_id {
        request_service::get_visible(&state, &current.0, request_id).await?;
    }

    let message_type = payload.message_type.as_deref().unwrap_or("general");

    let message = message_repo::create(
        &state.db,
        &current.0.id,
        payload.to_user_id.as_ref(),
        payload.request_id.as_ref(),
        payload.content.trim(),
        message_type,
    )
    .await?;

    tracing::info!("✉️ Message {} sent by {}", message.id, current.0.id);

    Ok((StatusCode::CREATED, Json(message)).into_response())
}

/// Lists messages: admins see all, users see their own conversations.
#[axum::debug_handler]
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response> {
    let messages = match current.0.role {
        Role::Admin => message_repo::list_all(&state.db).await?,
        Role::User => message_repo::list_for_user(&state.db, &current.0.id).await?,
    };
    Ok((StatusCode::OK, Json(messages)).into_response())
}

/// Flags a message as read. Recipient or admin.
#[axum::debug_handler]
pub async fn mark_message_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(message_id): Path<Uuid>,
) -> Result<Response> {
    let message = message_repo::find_by_id(&state.db, &message_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let is_recipient = message.to_user_id == Some(current.0.id);
    if current.0.role != Role::Admin && !is_recipient {
        return Err(AppError::Forbidden);
    }

    let message = message_repo::set_read(&state.db, &message.id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok((StatusCode::OK, Json(message)).into_response())
}
