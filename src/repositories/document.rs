use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{
    error::Result,
    models::document::{Document, DocumentStatus},
};

fn row_to_document(row: &Row) -> Result<Document> {
    Ok(Document {
        id: row.try_get("id")?,
        request_id: row.try_get("request_id")?,
        file_name: row.try_get("file_name")?,
        file_type: row.try_get("file_type")?,
        file_size: row.try_get("file_size")?,
        document_type: row.try_get("document_type")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Attaches a document record to a request (`status = pending`).
pub async fn create(
    pool: &Pool,
    request_id: &Uuid,
    file_name: &str,
    file_type: &str,
    file_size: i64,
    document_type: &str,
) -> Result<Document> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO documents (request_id, file_name, file_type, file_size, document_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, request_id, file_name, file_type, file_size, document_type,
                      status, created_at
            "#,
            &[request_id, &file_name, &file_type, &file_size, &document_type],
        )
        .await?;
    row_to_document(&row)
}

/// Finds a document by its ID.
pub async fn find_by_id(pool: &Pool, id: &Uuid) -> Result<Option<Document>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, request_id, file_name, file_type, file_size, document_type,
                   status, created_at
            FROM documents
            WHERE id = $1
            "#,
            &[id],
        )
        .await?;
    row.map(|r| row_to_document(&r)).transpose()
}

/// Lists the documents attached to a request, oldest first.
pub async fn list_by_request(pool: &Pool, request_id: &Uuid) -> Result<Vec<Document>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, request_id, file_name, file_type, file_size, document_type,
                   status, created_at
            FROM documents
            WHERE request_id = $1
            ORDER BY created_at
            "#,
            &[request_id],
        )
        .await?;
    rows.iter().map(row_to_document).collect()
}

/// Records an admin review verdict on a document.
pub async fn set_status(
    pool: &Pool,
    id: &Uuid,
    status: DocumentStatus,
) -> Result<Option<Document>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE documents
            SET status = $2
            WHERE id = $1
            RETURNING id, request_id, file_name, file_type, file_size, document_type,
                      status, created_at
            "#,
            &[id, &status],
        )
        .await?;
    row.map(|r| row_to_document(&r)).transpose()
}
