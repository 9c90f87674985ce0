use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{error::Result, repositories::service_type as service_type_repo, state::AppState};

/// Lists the active service catalog.
#[axum::debug_handler]
pub async fn list_service_types(State(state): State<AppState>) -> Result<Response> {
    let service_types = service_type_repo::list_active(&state.db).await?;
    Ok((StatusCode::OK, Json(service_types)).into_response())
}
