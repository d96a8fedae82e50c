//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, health, public};
use crate::state::AppState;

/// Maximum concurrent requests across all `/api` routes.
const API_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /` - Service banner
/// - `GET /health` - Health check
///
/// ## Admin (bearer token, except login)
/// - `POST /api/admin/login` - Exchange the admin login for a token
/// - `GET /api/admin/stats` - Dashboard counts
/// - `POST /api/admin/send-notification` - Record and dispatch a notification
/// - `POST /api/admin/add-update` - Publish an update note
/// - `POST /api/admin/add-photo` - Add a nostalgia photo
/// - `POST /api/admin/app-status` - Set active/maintenance
/// - `POST /api/admin/version-settings` - Set the minimum app version
/// - `GET /api/admin/notifications|updates|photos|users` - Latest 20 records
///
/// ## Mobile app
/// - `GET /api/app-status` - Status and version gate
/// - `GET /api/guncelleme-notlari` - Latest 10 update notes
/// - `GET /api/nostalji-fotograflar` - All nostalgia photos
/// - `POST /api/notifications/register` - Device registration upsert
/// - `POST /api/stats` - Usage ping
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let admin_routes = Router::new()
        .route("/login", post(admin::login))
        .route("/stats", get(admin::stats))
        .route("/send-notification", post(admin::send_notification))
        .route("/add-update", post(admin::add_update))
        .route("/add-photo", post(admin::add_photo))
        .route("/app-status", post(admin::set_app_status))
        .route("/version-settings", post(admin::set_version_settings))
        .route("/notifications", get(admin::list_notifications))
        .route("/updates", get(admin::list_updates))
        .route("/photos", get(admin::list_photos))
        .route("/users", get(admin::list_users));

    let api_routes = Router::new()
        .nest("/admin", admin_routes)
        .route("/app-status", get(public::app_status))
        .route("/guncelleme-notlari", get(public::update_notes))
        .route("/nostalji-fotograflar", get(public::nostalgia_photos))
        .route("/notifications/register", post(public::register_device))
        .route("/stats", post(public::submit_usage))
        // One semaphore shared by every route, not one per route
        .layer(GlobalConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
