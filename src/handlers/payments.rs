use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    crypto::tokens,
    error::{AppError, Result},
    middleware_layer::auth::CurrentUser,
    models::request::RequestStatus,
    models::user::Role,
    repositories::{payment as payment_repo, request as request_repo},
    services::authz,
    state::AppState,
};

/// The request payload for raising an invoice.
#[derive(Deserialize, Debug)]
pub struct CreatePaymentRequest {
    pub amount: i64,
    pub payment_method: String,
}

/// The request payload for settling an invoice.
#[derive(Deserialize, Debug)]
pub struct PayRequest {
    pub transaction_id: Option<String>,
}

/// Raises an invoice against a request. Admin router only.
///
/// The gateway is only ever engaged once a request has been approved, so
/// invoicing a pending or rejected request is refused outright.
#[axum::debug_handler]
pub async fn create_payment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse> {
    let request = request_repo::find_by_id(&state.db, &request_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if matches!(
        request.status,
        RequestStatus::Pending | RequestStatus::Rejected
    ) {
        return Err(AppError::Validation(
            "Request must be approved before invoicing".to_string(),
        ));
    }

    if payload.amount <= 0 {
        return Err(AppError::Validation(
            "Amount must be positive".to_string(),
        ));
    }

    let payment_code = tokens::generate_code("PAY");

    let payment = payment_repo::create(
        &state.db,
        &payment_code,
        &request.id,
        &request.user_id,
        payload.amount,
        &payload.payment_method,
    )
    .await?;

    tracing::info!(
        "💳 Invoice {} raised for {} by {}",
        payment.payment_code,
        request.request_code,
        current.0.id
    );

    Ok((StatusCode::CREATED, Json(payment)).into_response())
}

/// Lists payments: admins see all, users see their own.
#[axum::debug_handler]
pub async fn list_payments(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Response> {
    let payments = match current.0.role {
        Role::Admin => payment_repo::list_all(&state.db).await?,
        Role::User => payment_repo::list_by_user(&state.db, &current.0.id).await?,
    };
    Ok((StatusCode::OK, Json(payments)).into_response())
}

/// Marks a payment as paid. Owner or admin.
///
/// The money itself moved through the external gateway; this records the
/// outcome and stamps `processed_at`.
#[axum::debug_handler]
pub async fn pay_payment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<PayRequest>,
) -> Result<Response> {
    let payment = payment_repo::find_by_id(&state.db, &payment_id)
        .await?
        .ok_or(AppError::NotFound)?;

    authz::require_owner_or_admin(&current.0, payment.user_id)?;

    let paid = payment_repo::mark_paid(
        &state.db,
        &payment.id,
        payload.transaction_id.as_deref(),
        Utc::now(),
    )
    .await?
    .ok_or_else(|| AppError::Conflict("Payment is already settled".to_string()))?;

    tracing::info!(
        "✅ Payment {} settled by {}",
        paid.payment_code,
        current.0.id
    );

    Ok((StatusCode::OK, Json(paid)).into_response())
}
