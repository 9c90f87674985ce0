use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tokio_postgres::error::SqlState;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A database pool error.
    #[error("Database pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Credentials did not match a stored identity.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No session, or an expired/invalid one.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated, but the role or ownership check failed.
    #[error("Forbidden")]
    Forbidden,

    /// A resource not found error.
    #[error("Resource not found")]
    NotFound,

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested status is not a direct successor of the current one.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// A concurrent update won the race.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A rate limit exceeded error.
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Database(ref e) => {
                // 23505 = unique violation, e.g. an email already registered
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    (
                        StatusCode::CONFLICT,
                        "Resource already exists".to_string(),
                    )
                } else {
                    tracing::error!("Database error: {}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
                }
            }

            AppError::Pool(ref e) => {
                tracing::error!("Database pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Session store error".to_string())
            }

            AppError::InvalidCredentials => {
                tracing::warn!("Invalid credentials");
                (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string())
            }

            AppError::Unauthorized => {
                tracing::warn!("Unauthorized");
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }

            AppError::Forbidden => {
                tracing::warn!("Forbidden");
                (StatusCode::FORBIDDEN, "Forbidden".to_string())
            }

            AppError::NotFound => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::InvalidTransition(ref msg) => {
                tracing::debug!("Invalid transition: {}", msg);
                (StatusCode::UNPROCESSABLE_ENTITY, msg.clone())
            }

            AppError::Conflict(ref msg) => {
                tracing::warn!("Conflict: {}", msg);
                (StatusCode::CONFLICT, msg.clone())
            }

            AppError::RateLimitExceeded(ref msg) => {
                tracing::warn!("Rate limit exceeded: {}", msg);
                (StatusCode::TOO_MANY_REQUESTS, msg.clone())
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, body).into_response()
    }
}
