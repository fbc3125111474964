use std::time::Instant;

use axum::{http::Request, middleware::Next, response::Response};

/// Log one line per request: method, path, status and latency.
pub async fn request_log(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let res = next.run(req).await;

    let status = res.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if res.status().is_server_error() {
        tracing::warn!(%method, %path, status, elapsed_ms, "request failed");
    } else {
        tracing::info!(%method, %path, status, elapsed_ms, "request");
    }
    res
}
