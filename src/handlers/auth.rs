use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};

use crate::{
    crypto::tokens,
    error::Result,
    middleware_layer::auth::{CurrentUser, SESSION_COOKIE},
    middleware_layer::csrf::CSRF_COOKIE,
    models::user::Identity,
    services::credentials as credential_service,
    state::AppState,
    validation::auth::*,
};

/// How long an issued CSRF token stays valid, in seconds.
const CSRF_TTL_SECONDS: u64 = 3600;

/// The request payload for user registration.
#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// The request payload for user login.
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

/// Creates a secure cookie with the given name, value, and max age.
fn create_secure_cookie(name: String, value: String, max_age_days: i64) -> Cookie<'static> {
    let mut cookie = Cookie::new(name.clone(), value);

    let is_production =
        std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()) == "production";

    // The CSRF cookie must stay readable for the double-submit header.
    if name != CSRF_COOKIE {
        cookie.set_http_only(true);
    }

    if is_production {
        cookie.set_secure(true);
    }

    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_max_age(Duration::seconds(max_age_days * 86400));
    cookie.set_path("/");

    cookie
}

/// Starts a session for `identity`: session cookie plus CSRF pair.
async fn start_session(state: &AppState, cookies: &Cookies, identity: &Identity) -> Result<()> {
    let ttl = chrono::Duration::days(state.config.session_duration_days);
    let raw_token = state.sessions.create(identity.id, ttl).await?;

    cookies.add(create_secure_cookie(
        SESSION_COOKIE.to_string(),
        raw_token,
        state.config.session_duration_days,
    ));

    let csrf_token = tokens::generate_csrf_token();
    let mut redis = state.redis.clone();
    let _: () = redis
        .set_ex(format!("csrf:{}", csrf_token), "valid", CSRF_TTL_SECONDS)
        .await?;

    cookies.add(create_secure_cookie(CSRF_COOKIE.to_string(), csrf_token, 1));

    tracing::info!("✅ Session started for user: {}", identity.id);
    Ok(())
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    tracing::info!("📝 Register attempt: {}", payload.email);
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;
    validate_name(&payload.first_name, "First name")?;
    validate_name(&payload.last_name, "Last name")?;

    let identity = credential_service::create_identity(
        &state.db,
        &payload.email,
        &payload.password,
        &payload.first_name,
        &payload.last_name,
    )
    .await?;

    start_session(&state, &cookies, &identity).await?;

    let response = AuthResponse {
        success: true,
        message: "Registration successful. Welcome!".to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    tracing::info!("🔐 Login attempt: {}", payload.email);
    validate_email(&payload.email)?;

    let identity = state
        .credentials
        .verify(&payload.email, &payload.password)
        .await?;

    start_session(&state, &cookies, &identity).await?;

    let response = AuthResponse {
        success: true,
        message: "Login successful".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles user logout. Idempotent: a missing or stale session cookie
/// still yields a success response.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    cookies: Cookies,
) -> Result<Response> {
    tracing::info!("👋 Logout for user: {}", current.0.id);

    if let Some(session_cookie) = cookies.get(SESSION_COOKIE) {
        state.sessions.destroy(session_cookie.value()).await?;
    }

    if let Some(csrf_cookie) = cookies.get(CSRF_COOKIE) {
        let mut redis = state.redis.clone();
        let _: () = redis
            .del(format!("csrf:{}", csrf_cookie.value()))
            .await
            .unwrap_or(());
    }

    let mut session_cookie = Cookie::new(SESSION_COOKIE, "");
    session_cookie.set_max_age(Duration::seconds(0));
    session_cookie.set_path("/");
    cookies.remove(session_cookie);

    let mut csrf_cookie = Cookie::new(CSRF_COOKIE, "");
    csrf_cookie.set_max_age(Duration::seconds(0));
    csrf_cookie.set_path("/");
    cookies.remove(csrf_cookie);

    let response = AuthResponse {
        success: true,
        message: "Logout successful".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Returns the current identity.
#[axum::debug_handler]
pub async fn me(Extension(current): Extension<CurrentUser>) -> Result<Response> {
    Ok((StatusCode::OK, Json(current.0)).into_response())
}
