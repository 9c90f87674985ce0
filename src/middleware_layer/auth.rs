use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    models::user::{Identity, Role},
    repositories::user as user_repo,
    services::authz,
    state::AppState,
};

/// The name of the session cookie.
pub const SESSION_COOKIE: &str = "session_token";

/// The authenticated identity, inserted into request extensions by
/// `require_auth`.
#[derive(Clone)]
pub struct CurrentUser(pub Identity);

/// Extracts the raw session token from the request cookies.
fn extract_session_token(cookies: &Cookies) -> Option<String> {
    cookies.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// A middleware that requires a valid session.
///
/// Resolves the cookie through the session store, loads the identity,
/// and rejects deactivated accounts (destroying their session on the
/// way out). On success the `CurrentUser` extension is available to
/// downstream handlers.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let raw_token = extract_session_token(&cookies).ok_or_else(|| {
        tracing::debug!("❌ No session cookie on {}", request.uri().path());
        AppError::Unauthorized
    })?;

    let session = state.sessions.resolve(&raw_token).await?;

    let identity = user_repo::find_by_id(&state.db, &session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !identity.is_active {
        tracing::warn!("❌ Deactivated account presented a session: {}", identity.id);
        if let Err(e) = state.sessions.destroy(&raw_token).await {
            tracing::warn!("Failed to destroy session of deactivated account: {}", e);
        }
        return Err(AppError::Unauthorized);
    }

    tracing::debug!("✅ Authenticated: {}", identity.id);
    request
        .extensions_mut()
        .insert(CurrentUser(identity.sans_secret()));

    Ok(next.run(request).await)
}

/// A middleware that requires the `admin` role.
///
/// Must be layered inside `require_auth`.
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response, AppError> {
    let current = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;

    authz::authorize(&current.0, &[Role::Admin])?;

    Ok(next.run(request).await)
}
