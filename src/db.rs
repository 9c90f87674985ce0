use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use crate::error::{AppError, Result};
use std::time::Duration;

/// Creates a new database connection pool.
///
/// # Arguments
///
/// * `database_url` - The URL of the PostgreSQL database.
///
/// # Returns
///
/// A `Result` containing the `Pool`.
pub fn create_pool(database_url: &str) -> Result<Pool> {
    let pg_config: tokio_postgres::Config = database_url.parse()?;

    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );

    Pool::builder(manager)
        .max_size(32)
        .wait_timeout(Some(Duration::from_secs(5)))
        .create_timeout(Some(Duration::from_secs(2)))
        .recycle_timeout(Some(Duration::from_secs(1)))
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build database pool: {}", e)))
}
