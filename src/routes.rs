//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`        - Health check: storage connectivity
//! - `/tables*`            - Table registration and occupancy
//! - `/tableOrders*`       - Order lifecycle
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on dining routes
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// The rate limiter keys on the peer address, so the returned service must be
/// served with connect info.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let dining = api::routes::dining_routes().layer(rate_limit::layer());

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(dining)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
