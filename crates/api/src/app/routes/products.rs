use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockroom_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product))
        .route("/:id/movements", post(record_movement))
}

fn parse_id(id: &str) -> Result<ProductId, axum::response::Response> {
    id.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.list_products().await {
        Ok(products) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "products": products.into_iter().map(dto::product_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    let input = match body.into_new_product() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.create_product(input).await {
        Ok(product) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "id": product.id.to_string(),
                "product": dto::product_to_json(product),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("create product failed: {e}");
            errors::service_error_to_response(e)
        }
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.product_detail(id).await {
        Ok(detail) => (StatusCode::OK, Json(dto::product_detail_to_json(detail))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn record_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::RecordMovementRequest>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services
        .record_movement(id, body.kind, body.quantity, body.notes)
        .await
    {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(product))).into_response(),
        Err(e) => {
            tracing::warn!(product_id = %id, "record movement failed: {e}");
            errors::service_error_to_response(e)
        }
    }
}
