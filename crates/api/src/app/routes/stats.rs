use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn get_stats(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.stats().await {
        Ok(stats) => (StatusCode::OK, Json(dto::stats_to_json(stats))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
