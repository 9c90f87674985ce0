use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{
    error::Result,
    models::request::{Priority, RequestStatus, ServiceRequest},
};

/// A helper function to map a `tokio_postgres::Row` to a `ServiceRequest`.
fn row_to_request(row: &Row) -> Result<ServiceRequest> {
    Ok(ServiceRequest {
        id: row.try_get("id")?,
        request_code: row.try_get("request_code")?,
        user_id: row.try_get("user_id")?,
        service_type_id: row.try_get("service_type_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        priority: row.try_get("priority")?,
        status: row.try_get("status")?,
        total_amount: row.try_get("total_amount")?,
        admin_notes: row.try_get("admin_notes")?,
        rejection_reason: row.try_get("rejection_reason")?,
        approved_at: row.try_get("approved_at")?,
        rejected_at: row.try_get("rejected_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Inserts a freshly submitted request (`status = pending`).
pub async fn create(
    pool: &Pool,
    request_code: &str,
    user_id: &Uuid,
    service_type_id: &Uuid,
    title: &str,
    description: &str,
    priority: Priority,
) -> Result<ServiceRequest> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO service_requests
                (request_code, user_id, service_type_id, title, description, priority)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, request_code, user_id, service_type_id, title, description,
                      priority, status, total_amount, admin_notes, rejection_reason,
                      approved_at, rejected_at, created_at, updated_at
            "#,
            &[
                &request_code,
                user_id,
                service_type_id,
                &title,
                &description,
                &priority,
            ],
        )
        .await?;
    row_to_request(&row)
}

/// Finds a request by its ID.
pub async fn find_by_id(pool: &Pool, id: &Uuid) -> Result<Option<ServiceRequest>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, request_code, user_id, service_type_id, title, description,
                   priority, status, total_amount, admin_notes, rejection_reason,
                   approved_at, rejected_at, created_at, updated_at
            FROM service_requests
            WHERE id = $1
            "#,
            &[id],
        )
        .await?;
    row.map(|r| row_to_request(&r)).transpose()
}

/// Lists every request, newest first.
pub async fn list_all(pool: &Pool) -> Result<Vec<ServiceRequest>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, request_code, user_id, service_type_id, title, description,
                   priority, status, total_amount, admin_notes, rejection_reason,
                   approved_at, rejected_at, created_at, updated_at
            FROM service_requests
            ORDER BY created_at DESC
            "#,
            &[],
        )
        .await?;
    rows.iter().map(row_to_request).collect()
}

/// Lists a single user's requests, newest first.
pub async fn list_by_user(pool: &Pool, user_id: &Uuid) -> Result<Vec<ServiceRequest>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, request_code, user_id, service_type_id, title, description,
                   priority, status, total_amount, admin_notes, rejection_reason,
                   approved_at, rejected_at, created_at, updated_at
            FROM service_requests
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
            &[user_id],
        )
        .await?;
    rows.iter().map(row_to_request).collect()
}

/// Applies a planned transition if and only if the row still carries the
/// expected status.
///
/// Returns `None` when zero rows matched, which the caller disambiguates
/// into `NotFound` (row gone) or `Conflict` (a concurrent transition won).
#[allow(clippy::too_many_arguments)]
pub async fn apply_transition(
    pool: &Pool,
    id: &Uuid,
    expected: RequestStatus,
    target: RequestStatus,
    updated_at: DateTime<Utc>,
    approved_at: Option<DateTime<Utc>>,
    rejected_at: Option<DateTime<Utc>>,
    rejection_reason: Option<&str>,
    admin_notes: Option<&str>,
    total_amount: Option<i64>,
) -> Result<Option<ServiceRequest>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE service_requests
            SET status = $3,
                updated_at = $4,
                approved_at = COALESCE($5, approved_at),
                rejected_at = COALESCE($6, rejected_at),
                rejection_reason = COALESCE($7, rejection_reason),
                admin_notes = COALESCE($8, admin_notes),
                total_amount = COALESCE($9, total_amount)
            WHERE id = $1 AND status = $2
            RETURNING id, request_code, user_id, service_type_id, title, description,
                      priority, status, total_amount, admin_notes, rejection_reason,
                      approved_at, rejected_at, created_at, updated_at
            "#,
            &[
                id,
                &expected,
                &target,
                &updated_at,
                &approved_at,
                &rejected_at,
                &rejection_reason,
                &admin_notes,
                &total_amount,
            ],
        )
        .await?;
    row.map(|r| row_to_request(&r)).transpose()
}
