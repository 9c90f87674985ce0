use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sonic_rs::JsonValueTrait;
use std::net::SocketAddr;

use crate::{error::AppError, state::AppState};

/// How many registrations a single IP gets per window.
const REGISTER_LIMIT: i32 = 5;
/// How many failed logins an email gets per window.
const LOGIN_FAILURE_LIMIT: i32 = 5;
/// The rate-limit window in seconds (12 hours).
const WINDOW_SECONDS: i64 = 43200;

/// Extracts the real IP address from the request extensions.
fn extract_real_ip(req: &Request<Body>) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// A middleware that rate limits registration per client IP.
pub async fn rate_limit_register(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = extract_real_ip(&req);
    let key = format!("rate_limit:register:{}", ip);

    let count: Option<i32> = redis::cmd("GET")
        .arg(&key)
        .query_async(&mut state.redis.clone())
        .await
        .unwrap_or(None);

    if let Some(attempts) = count {
        if attempts >= REGISTER_LIMIT {
            let ttl: Option<i32> = redis::cmd("TTL")
                .arg(&key)
                .query_async(&mut state.redis.clone())
                .await
                .unwrap_or(None);

            return AppError::RateLimitExceeded(format!(
                "Registration limit exceeded. Try again in {} minutes",
                ttl.unwrap_or(0) / 60
            ))
            .into_response();
        }
    }

    let _: () = redis::cmd("INCR")
        .arg(&key)
        .query_async(&mut state.redis.clone())
        .await
        .unwrap_or(());

    let _: () = redis::cmd("EXPIRE")
        .arg(&key)
        .arg(WINDOW_SECONDS)
        .query_async(&mut state.redis.clone())
        .await
        .unwrap_or(());

    next.run(req).await
}

/// A middleware that rate limits login attempts per email.
///
/// Failed attempts count toward the limit; a successful login clears it.
pub async fn rate_limit_login(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    fn extract_email_from_body(body_bytes: &[u8]) -> Option<String> {
        sonic_rs::from_slice::<sonic_rs::Value>(body_bytes)
            .ok()?
            .get("email")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    let (parts, body) = req.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    let email = extract_email_from_body(&body_bytes).unwrap_or_else(|| "unknown".to_string());

    let key = format!("rate_limit:login:{}", email);

    let count: Option<i32> = redis::cmd("GET")
        .arg(&key)
        .query_async(&mut state.redis.clone())
        .await
        .unwrap_or(None);

    if let Some(attempts) = count {
        if attempts >= LOGIN_FAILURE_LIMIT {
            let ttl: Option<i32> = redis::cmd("TTL")
                .arg(&key)
                .query_async(&mut state.redis.clone())
                .await
                .unwrap_or(None);

            return AppError::RateLimitExceeded(format!(
                "Too many failed login attempts. Try again in {} minutes",
                ttl.unwrap_or(0) / 60
            ))
            .into_response();
        }
    }

    let new_body = Body::from(body_bytes.clone());
    let new_req = Request::from_parts(parts, new_body);

    let response = next.run(new_req).await;

    if response.status().is_client_error() {
        let _: () = redis::cmd("INCR")
            .arg(&key)
            .query_async(&mut state.redis.clone())
            .await
            .unwrap_or(());

        let _: () = redis::cmd("EXPIRE")
            .arg(&key)
            .arg(WINDOW_SECONDS)
            .query_async(&mut state.redis.clone())
            .await
            .unwrap_or(());
    } else if response.status().is_success() {
        let _: () = redis::cmd("DEL")
            .arg(&key)
            .query_async(&mut state.redis.clone())
            .await
            .unwrap_or(());
    }

    response
}
