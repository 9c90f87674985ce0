use chrono::{DateTime, Utc};
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{error::Result, models::payment::Payment};

fn row_to_payment(row: &Row) -> Result<Payment> {
    Ok(Payment {
        id: row.try_get("id")?,
        payment_code: row.try_get("payment_code")?,
        request_id: row.try_get("request_id")?,
        user_id: row.try_get("user_id")?,
        amount: row.try_get("amount")?,
        payment_method: row.try_get("payment_method")?,
        payment_status: row.try_get("payment_status")?,
        transaction_id: row.try_get("transaction_id")?,
        processed_at: row.try_get("processed_at")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Raises an invoice against a request (`payment_status = pending`).
pub async fn create(
    pool: &Pool,
    payment_code: &str,
    request_id: &Uuid,
    user_id: &Uuid,
    amount: i64,
    payment_method: &str,
) -> Result<Payment> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO payments (payment_code, request_id, user_id, amount, payment_method)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, payment_code, request_id, user_id, amount, payment_method,
                      payment_status, transaction_id, processed_at, created_at
            "#,
            &[&payment_code, request_id, user_id, &amount, &payment_method],
        )
        .await?;
    row_to_payment(&row)
}

/// Finds a payment by its ID.
pub async fn find_by_id(pool: &Pool, id: &Uuid) -> Result<Option<Payment>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, payment_code, request_id, user_id, amount, payment_method,
                   payment_status, transaction_id, processed_at, created_at
            FROM payments
            WHERE id = $1
            "#,
            &[id],
        )
        .await?;
    row.map(|r| row_to_payment(&r)).transpose()
}

/// Lists every payment, newest first.
pub async fn list_all(pool: &Pool) -> Result<Vec<Payment>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, payment_code, request_id, user_id, amount, payment_method,
                   payment_status, transaction_id, processed_at, created_at
            FROM payments
            ORDER BY created_at DESC
            "#,
            &[],
        )
        .await?;
    rows.iter().map(row_to_payment).collect()
}

/// Lists a single user's payments, newest first.
pub async fn list_by_user(pool: &Pool, user_id: &Uuid) -> Result<Vec<Payment>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, payment_code, request_id, user_id, amount, payment_method,
                   payment_status, transaction_id, processed_at, created_at
            FROM payments
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
            &[user_id],
        )
        .await?;
    rows.iter().map(row_to_payment).collect()
}

/// Marks a payment as paid if it is still settleable (pending or overdue).
///
/// Returns `None` when the payment is missing or already settled.
pub async fn mark_paid(
    pool: &Pool,
    id: &Uuid,
    transaction_id: Option<&str>,
    processed_at: DateTime<Utc>,
) -> Result<Option<Payment>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE payments
            SET payment_status = 'paid',
                transaction_id = $2,
                processed_at = $3
            WHERE id = $1 AND payment_status IN ('pending', 'overdue')
            RETURNING id, payment_code, request_id, user_id, amount, payment_method,
                      payment_status, transaction_id, processed_at, created_at
            "#,
            &[id, &transaction_id, &processed_at],
        )
        .await?;
    row.map(|r| row_to_payment(&r)).transpose()
}
