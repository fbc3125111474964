use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};

use crate::app::services::AppServices;

/// Dashboard page: the four stat regions filled in by the dashboard bundle.
pub const INDEX_HTML: &str = include_str!("../../../static/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "healthy",
                "database": "connected",
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("health check failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
