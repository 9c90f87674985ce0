use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;
use crate::{
    error::Result,
    models::user::{Identity, Role},
};

/// A helper function to map a `tokio_postgres::Row` to an `Identity`.
fn row_to_identity(row: &Row) -> Result<Identity> {
    Ok(Identity {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        role: row.try_get("role")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Creates a new identity with the `user` role.
pub async fn create(
    pool: &Pool,
    email: &str,
    password_hash: &str,
    first_name: &str,
    last_name: &str,
) -> Result<Identity> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, first_name, last_name, role,
                      is_active, created_at, updated_at
            "#,
            &[&email, &password_hash, &first_name, &last_name],
        )
        .await?;
    row_to_identity(&row)
}

/// Finds an active identity by its exact email address.
pub async fn find_active_by_email(pool: &Pool, email: &str) -> Result<Option<Identity>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, email, password_hash, first_name, last_name, role,
                   is_active, created_at, updated_at
            FROM users
            WHERE email = $1 AND is_active = true
            "#,
            &[&email],
        )
        .await?;
    row.map(|r| row_to_identity(&r)).transpose()
}

/// Finds an identity by its ID, active or not.
pub async fn find_by_id(pool: &Pool, user_id: &Uuid) -> Result<Option<Identity>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, email, password_hash, first_name, last_name, role,
                   is_active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
            &[user_id],
        )
        .await?;
    row.map(|r| row_to_identity(&r)).transpose()
}

/// Lists every identity, newest first.
pub async fn list(pool: &Pool) -> Result<Vec<Identity>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT id, email, password_hash, first_name, last_name, role,
                   is_active, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            "#,
            &[],
        )
        .await?;
    rows.iter().map(row_to_identity).collect()
}

/// Activates or deactivates an account.
pub async fn set_active(pool: &Pool, user_id: &Uuid, active: bool) -> Result<Option<Identity>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE users
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, first_name, last_name, role,
                      is_active, created_at, updated_at
            "#,
            &[user_id, &active],
        )
        .await?;
    row.map(|r| row_to_identity(&r)).transpose()
}

/// Changes an account's role.
pub async fn set_role(pool: &Pool, user_id: &Uuid, role: Role) -> Result<Option<Identity>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE users
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, first_name, last_name, role,
                      is_active, created_at, updated_at
            "#,
            &[user_id, &role],
        )
        .await?;
    row.map(|r| row_to_identity(&r)).transpose()
}
