use axum::{
    body::Body,
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use redis::AsyncCommands;
use subtle::ConstantTimeEq;
use tower_cookies::Cookies;

use crate::{error::AppError, state::AppState};

/// The name of the CSRF cookie.
pub const CSRF_COOKIE: &str = "csrf_token";

/// A middleware that verifies the double-submit CSRF token.
///
/// Mutating requests must carry the CSRF cookie and a matching
/// `x-csrf-token` header; the pair is compared in constant time and the
/// token must still be live in Redis.
pub async fn verify_csrf(
    State(state): State<AppState>,
    cookies: Cookies,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.method() == Method::GET
        || req.method() == Method::HEAD
        || req.method() == Method::OPTIONS
    {
        return next.run(req).await;
    }

    let csrf_token_cookie = match cookies.get(CSRF_COOKIE) {
        Some(c) => c.value().to_string(),
        None => {
            tracing::warn!("❌ CSRF: cookie missing");
            return AppError::Unauthorized.into_response();
        }
    };

    let headers = req.headers();
    let csrf_token_header = match headers
        .get("x-csrf-token")
        .and_then(|token| token.to_str().ok())
    {
        Some(t) => t.to_string(),
        None => {
            tracing::warn!("❌ CSRF: header missing or malformed");
            return AppError::Unauthorized.into_response();
        }
    };

    let tokens_match: bool = csrf_token_cookie
        .as_bytes()
        .ct_eq(csrf_token_header.as_bytes())
        .into();
    if !tokens_match {
        tracing::warn!("❌ CSRF: cookie/header mismatch");
        return AppError::Unauthorized.into_response();
    }

    let csrf_key = format!("csrf:{}", csrf_token_cookie);
    let mut redis = state.redis.clone();

    match redis.get::<_, Option<String>>(&csrf_key).await {
        Ok(Some(_)) => next.run(req).await,
        Ok(None) => {
            tracing::warn!("❌ CSRF: token expired or unknown");
            AppError::Unauthorized.into_response()
        }
        Err(e) => {
            tracing::error!("❌ CSRF: Redis error: {}", e);
            AppError::Redis(e).into_response()
        }
    }
}
