//! # chirpy_api
//!
//! HTTP API library for Chirpy.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use chirpy_core::store::Store;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{admin, auth, chirps, health, users, webhooks};
use crate::middleware::metrics::Metrics;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Users, chirps, and refresh tokens.
    pub store: Arc<dyn Store>,
    /// API configuration.
    pub config: ApiConfig,
    /// File-server hit counter.
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: ApiConfig) -> Self {
        Self {
            store,
            config,
            metrics: Arc::new(Metrics::default()),
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `chirpy_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    chirpy_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/api/healthz", get(health::healthz_handler))
        .route("/admin/metrics", get(admin::metrics_handler))
        .route("/admin/reset", post(admin::reset_handler))
        .route("/api/users", post(users::create_user_handler))
        .route("/api/login", post(auth::login_handler))
        .route("/api/refresh", post(auth::refresh_handler))
        .route("/api/revoke", post(auth::revoke_handler))
        .route("/api/chirps", get(chirps::list_chirps_handler))
        .route("/api/chirps/{chirpID}", get(chirps::get_chirp_handler));

    // Protected routes (require a bearer access token)
    let protected = Router::new()
        .route("/api/users", put(users::update_user_handler))
        .route("/api/chirps", post(chirps::create_chirp_handler))
        .route("/api/chirps/{chirpID}", delete(chirps::delete_chirp_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    // Webhook routes (require the shared API key)
    let webhook = Router::new()
        .route("/api/polka/webhooks", post(webhooks::polka_webhook_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_polka_key,
        ));

    // Static files, counted for /admin/metrics
    let file_server = Router::new()
        .nest_service("/app", ServeDir::new(&state.config.filepath_root))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::metrics::count_file_server_hits,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(webhook)
        .merge(file_server)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
