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
    models::document::DocumentStatus,
    repositories::document as document_repo,
    services::requests as request_service,
    state::AppState,
    validation::requests::validate_document,
};

/// The request payload for attaching a document record.
#[derive(Deserialize, Debug)]
pub struct AttachDocumentRequest {
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub document_type: String,
}

/// The request payload for an admin review verdict.
#[derive(Deserialize, Debug)]
pub struct ReviewDocumentRequest {
    pub status: DocumentStatus,
}

/// Attaches a document record to a request. Owner or admin.
#[axum::debug_handler]
pub async fn attach_document(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<AttachDocumentRequest>,
) -> Result<impl IntoResponse> {
    // Visibility check doubles as the ownership gate.
    let request = request_service::get_visible(&state, &current.0, request_id).await?;

    validate_document(&payload.file_name, payload.file_size)?;

    let document = document_repo::create(
        &state.db,
        &request.id,
        payload.file_name.trim(),
        &payload.file_type,
        payload.file_size,
        &payload.document_type,
    )
    .await?;

    tracing::info!(
        "📎 Document {} attached to {} by {}",
        document.id,
        request.request_code,
        current.0.id
    );

    Ok((StatusCode::CREATED, Json(document)).into_response())
}

/// Lists the documents attached to a request. Owner or admin.
#[axum::debug_handler]
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(request_id): Path<Uuid>,
) -> Result<Response> {
    let request = request_service::get_visible(&state, &current.0, request_id).await?;

    let documents = document_repo::list_by_request(&state.db, &request.id).await?;
    Ok((StatusCode::OK, Json(documents)).into_response())
}

/// Records an admin verdict on a document. Admin router only.
#[axum::debug_handler]
pub async fn review_document(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(document_id): Path<Uuid>,
    Json(payload): Json<ReviewDocumentRequest>,
) -> Result<Response> {
    if payload.status == DocumentStatus::Pending {
        return Err(AppError::Validation(
            "A review verdict must be verified or rejected".to_string(),
        ));
    }

    let document = document_repo::set_status(&state.db, &document_id, payload.status)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(
        "📋 Document {} marked {:?} by {}",
        document.id,
        document.status,
        current.0.id
    );

    Ok((StatusCode::OK, Json(document)).into_response())
}
