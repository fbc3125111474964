//! Serves the compiled dashboard bundle (`ASSETS_DIR`) under `/pkg`.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::app::errors;

/// Directory holding the bundle, if one was configured.
#[derive(Debug, Clone)]
pub struct AssetsDir(pub Option<Arc<PathBuf>>);

fn content_type(file: &str) -> &'static str {
    match file.rsplit_once('.').map(|(_, ext)| ext) {
        Some("js") => "text/javascript; charset=utf-8",
        Some("wasm") => "application/wasm",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// Only plain file names are served; no nested paths, no dot-files.
fn is_plain_file_name(file: &str) -> bool {
    !file.is_empty()
        && !file.starts_with('.')
        && file
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

pub async fn asset(
    Extension(AssetsDir(dir)): Extension<AssetsDir>,
    Path(file): Path<String>,
) -> axum::response::Response {
    let Some(dir) = dir else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "no dashboard bundle configured");
    };
    if !is_plain_file_name(&file) {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_path", "invalid asset name");
    }

    match tokio::fs::read(dir.join(&file)).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&file))], bytes).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "asset not found")
        }
        Err(e) => {
            tracing::error!(file = %file, "failed to read asset: {e}");
            errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "io_error", "failed to read asset")
        }
    }
}
