use axum::{routing::get, Router};

pub mod assets;
pub mod products;
pub mod stats;
pub mod system;

/// Router for the JSON API (mounted under `/api`).
pub fn router() -> Router {
    Router::new()
        .route("/stats", get(stats::get_stats))
        .nest("/products", products::router())
}
