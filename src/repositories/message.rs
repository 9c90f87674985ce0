use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{error::Result, models::message::Message};

fn row_to_message(row: &Row) -> Result<Message> {
    Ok(Message {
        id: row.try_get("id")?,
        from_user_id: row.try_get("from_user_id")?,
        to_user_id: row.try_get("to_user_id")?,
        request_id: row.try_get("request_id")?,
        content: row.try_get("content")?,
        message_type: row.try_get("message_type")?,
        is_read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Stores a new message. A null recipient addresses the shop (any admin).
pub async fn create(
    pool: &Pool,
    from_user_id: &Uuid,
    to_user_id: Option<&Uuid>,
    request_id: Option<&Uuid>,
    content: &str,
    message_type: &str,
) -> Result<Message> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO messages (from_user_id, to_user_id, request_id, content, message_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, from_user_id, to_user_id, request_id, content, message_type,
                      is_read, created_at
            "#,
            &[from_user_id, &to_user_id, &request_id, &content, &message_type],
        )
        .await?;
    row_to_message(&row)
}

/// Finds a message by its ID.
pub async fn find_by_id(pool: &Pool, id: &Uuid) -> Result<Option<Message>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, from_user_id, to_user_id, request_id, content, message_type,
                   is_read, created_at
            FROM messages
            WHERE id = $1
            "#,
            &[id],
        )
        .await?;
    row.map(|r| row_to_message(&r)).transpose()
}

/// Lists every message, newest first.
pub async fn list_all(pool: &Pool) -> Result<Vec<Message>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, from_user_id, to_user_id, request_id, content, message_type,
                   is_read, created_at
            FROM messages
            ORDER BY created_at DESC
            "#,
            &[],
        )
        .await?;
    rows.iter().map(row_to_message).collect()
}

/// Lists the messages a user sent or received, newest first.
pub async fn list_for_user(pool: &Pool, user_id: &Uuid) -> Result<Vec<Message>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, from_user_id, to_user_id, request_id, content, message_type,
                   is_read, created_at
            FROM messages
            WHERE from_user_id = $1 OR to_user_id = $1
            ORDER BY created_at DESC
            "#,
            &[user_id],
        )
        .await?;
    rows.iter().map(row_to_message).collect()
}

/// Flags a message as read.
pub async fn set_read(pool: &Pool, id: &Uuid) -> Result<Option<Message>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE messages
            SET is_read = true
            WHERE id = $1
            RETURNING id, from_user_id, to_user_id, request_id, content, message_type,
                      is_read, created_at
            "#,
            &[id],
        )
        .await?;
    row.map(|r| row_to_message(&r)).transpose()
}
