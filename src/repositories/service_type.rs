use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{error::Result, models::service_type::ServiceType};

fn row_to_service_type(row: &Row) -> Result<ServiceType> {
    Ok(ServiceType {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        base_price_cents: row.try_get("base_price_cents")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Finds an active service type by its ID.
pub async fn find_active(pool: &Pool, id: &Uuid) -> Result<Option<ServiceType>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, name, description, base_price_cents, is_active, created_at
            FROM service_types
            WHERE id = $1 AND is_active = true
            "#,
            &[id],
        )
        .await?;
    row.map(|r| row_to_service_type(&r)).transpose()
}

/// Lists the active catalog.
pub async fn list_active(pool: &Pool) -> Result<Vec<ServiceType>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, name, description, base_price_cents, is_active, created_at
            FROM service_types
            WHERE is_active = true
            ORDER BY name
            "#,
            &[],
        )
        .await?;
    rows.iter().map(row_to_service_type).collect()
}
