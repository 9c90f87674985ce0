use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};

use http::{Method, header};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_cookies::CookieManagerLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod state;
mod db;
mod crypto {
    pub mod tokens;
}

mod models {
    pub mod document;
    pub mod message;
    pub mod payment;
    pub mod request;
    pub mod service_type;
    pub mod session;
    pub mod stats;
    pub mod user;
}

mod repositories {
    pub mod document;
    pub mod message;
    pub mod payment;
    pub mod request;
    pub mod service_type;
    pub mod user;
}

mod services {
    pub mod authz;
    pub mod credentials;
    pub mod lifecycle;
    pub mod notify;
    pub mod requests;
    pub mod sessions;
    pub mod stats;
}

mod handlers {
    pub mod admin_users;
    pub mod auth;
    pub mod documents;
    pub mod messages;
    pub mod payments;
    pub mod requests;
    pub mod service_types;
}

mod middleware_layer {
    pub mod auth;
    pub mod csrf;
    pub mod rate_limit;
}

mod validation {
    pub mod auth;
    pub mod requests;
}

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config).await?;
    tracing::info!("✅ AppState initialized");

    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().unwrap(),
            "http://127.0.0.1:3000".parse().unwrap(),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::COOKIE,
            "x-csrf-token".parse().unwrap(),
        ])
        .allow_credentials(true)
        .expose_headers(["x-csrf-token".parse().unwrap()])
        .max_age(Duration::from_secs(86400));

    let protected_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(50)
            .burst_size(200)
            .use_headers()
            .finish()
            .unwrap(),
    );

    let register_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::rate_limit::rate_limit_register,
        ))
        .with_state(state.clone());

    let login_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::rate_limit::rate_limit_login,
        ))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        .route(
            "/api/service-types",
            get(handlers::service_types::list_service_types),
        )
        .route(
            "/api/requests",
            post(handlers::requests::submit_request).get(handlers::requests::list_requests),
        )
        .route("/api/requests/stats", get(handlers::requests::request_stats))
        .route(
            "/api/requests/{request_id}",
            get(handlers::requests::get_request),
        )
        .route(
            "/api/requests/{request_id}/transition",
            post(handlers::requests::transition_request),
        )
        .route(
            "/api/requests/{request_id}/documents",
            post(handlers::documents::attach_document).get(handlers::documents::list_documents),
        )
        .route("/api/payments", get(handlers::payments::list_payments))
        .route(
            "/api/payments/{payment_id}/pay",
            post(handlers::payments::pay_payment),
        )
        .route(
            "/api/messages",
            post(handlers::messages::send_message).get(handlers::messages::list_messages),
        )
        .route(
            "/api/messages/{message_id}/read",
            post(handlers::messages::mark_message_read),
        )
        .layer(tower_governor::GovernorLayer::new(
            protected_governor_conf.clone(),
        ))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::csrf::verify_csrf,
        ))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/api/admin/users", get(handlers::admin_users::list_users))
        .route(
            "/api/admin/users/{user_id}/active",
            post(handlers::admin_users::set_user_active),
        )
        .route(
            "/api/admin/users/{user_id}/role",
            post(handlers::admin_users::set_user_role),
        )
        .route(
            "/api/documents/{document_id}/review",
            post(handlers::documents::review_document),
        )
        .route(
            "/api/requests/{request_id}/payments",
            post(handlers::payments::create_payment),
        )
        .route_layer(from_fn(middleware_layer::auth::require_admin))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::csrf::verify_csrf,
        ))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state.clone());

    let app = Router::new()
        .merge(register_routes)
        .merge(login_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
