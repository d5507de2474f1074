//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{audit, catalog, health, items, session};
use crate::state::AppState;

/// Maximum concurrent requests for API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET /v1/items` - List and filter items
/// - `GET /v1/items/:uid` - Look up one item by UID
/// - `GET /v1/locations`, `GET /v1/projects` - Catalog listings
///
/// ## Authenticated (bearer token)
/// - `POST /v1/session/login`, `POST /v1/session/logout` - Record session events
/// - `POST /v1/items` - Create an item and allocate its UID
/// - `GET /v1/items/export` - CSV export
/// - `PUT /v1/items/:uid`, `DELETE /v1/items/:uid` - Edit, delete
/// - `POST /v1/items/:uid/{transfer,status,project,reduce}` - Item actions
/// - `POST /v1/locations`, `POST /v1/projects` - Register catalog entries
/// - `GET /v1/audit` - Audit log
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let item_routes = Router::new()
        .route("/", get(items::list_items).post(items::create_item))
        .route("/export", get(items::export_items))
        .route(
            "/:uid",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .route("/:uid/transfer", post(items::transfer_item))
        .route("/:uid/status", post(items::set_status))
        .route("/:uid/project", post(items::assign_project))
        .route("/:uid/reduce", post(items::reduce_quantity));

    let api_routes = Router::new()
        // Session
        .route("/session/login", post(session::login))
        .route("/session/logout", post(session::logout))
        // Catalog
        .route(
            "/locations",
            get(catalog::list_locations).post(catalog::create_location),
        )
        .route(
            "/projects",
            get(catalog::list_projects).post(catalog::create_project),
        )
        // Items
        .nest("/items", item_routes)
        // Audit
        .route("/audit", get(audit::list_audit))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health check (no auth)
        .route("/health", get(health::health))
        .nest("/v1", api_routes)
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
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(origins)
    }
}
