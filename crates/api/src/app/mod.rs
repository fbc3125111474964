//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store wiring and the product use cases
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//! - `middleware.rs`: request logging

use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod services;

use routes::assets::AssetsDir;
use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<AppServices>, assets_dir: Option<PathBuf>) -> Router {
    Router::new()
        .route("/", get(routes::system::index))
        .route("/health", get(routes::system::health))
        .route("/pkg/:file", get(routes::assets::asset))
        .nest("/api", routes::router())
        .layer(Extension(services))
        .layer(Extension(AssetsDir(assets_dir.map(Arc::new))))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::request_log)))
}
