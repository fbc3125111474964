use std::path::PathBuf;
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use stockroom_api::app::{build_app, services::AppServices};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with_assets(None).await
    }

    async fn spawn_with_assets(assets_dir: Option<PathBuf>) -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let app = build_app(Arc::new(AppServices::in_memory()), assets_dir);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_product(
    client: &reqwest::Client,
    srv: &TestServer,
    body: serde_json::Value,
) -> String {
    let res = client
        .post(srv.url("/api/products"))
        .json(&body)
        .send()
        .await
        .unwrap();
    if res.status() != StatusCode::CREATED {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        panic!("expected 201 Created, got {status} body={body}");
    }
    let created: serde_json::Value = res.json().await.unwrap();
    created["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_connected_store() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "healthy", "database": "connected" }));
}

#[tokio::test]
async fn index_page_has_the_four_stat_regions() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let html = res.text().await.unwrap();
    for id in ["total-products", "total-items", "total-value", "low-stock"] {
        assert!(html.contains(&format!("id=\"{id}\"")), "missing region {id}");
    }
}

#[tokio::test]
async fn stats_on_empty_catalogue_are_zero() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/api/stats")).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["total_products"], 0);
    assert_eq!(body["total_items"], 0);
    assert_eq!(body["total_value"], 0.0);
    assert_eq!(body["low_stock"], 0);
}

#[tokio::test]
async fn product_lifecycle_create_move_query() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let id = create_product(
        &client,
        &srv,
        json!({ "name": "Widget", "sku": "W-1", "quantity": 20, "price": 2.5, "category": "Parts" }),
    )
    .await;

    let res = client
        .post(srv.url(&format!("/api/products/{id}/movements")))
        .json(&json!({ "type": "OUT", "quantity": 15, "notes": "order 42" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["quantity"], 5);

    let res = client
        .get(srv.url(&format!("/api/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let detail: serde_json::Value = res.json().await.unwrap();
    assert_eq!(detail["product"]["name"], "Widget");
    assert_eq!(detail["product"]["price"], 2.5);

    let transactions = detail["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0]["type"], "OUT");
    assert_eq!(transactions[0]["notes"], "order 42");
    assert_eq!(transactions[1]["type"], "IN");
    assert_eq!(transactions[1]["notes"], "Initial stock");
}

#[tokio::test]
async fn stats_reflect_the_catalogue() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create_product(&client, &srv, json!({ "name": "A", "sku": "A", "quantity": 100, "price": 2.5 })).await;
    create_product(&client, &srv, json!({ "name": "B", "sku": "B", "quantity": 9, "price": 10.0 })).await;
    create_product(&client, &srv, json!({ "name": "C", "sku": "C", "quantity": 10, "price": 0.01 })).await;
    create_product(&client, &srv, json!({ "name": "D", "sku": "D", "quantity": 1, "price": 203.1 })).await;
    create_product(&client, &srv, json!({ "name": "E", "sku": "E" })).await;

    let body: serde_json::Value = reqwest::get(srv.url("/api/stats"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body,
        json!({ "total_products": 5, "total_items": 120, "total_value": 543.2, "low_stock": 3 })
    );
}

#[tokio::test]
async fn products_are_listed_by_name() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create_product(&client, &srv, json!({ "name": "Washers", "sku": "W" })).await;
    create_product(&client, &srv, json!({ "name": "Bolts", "sku": "B" })).await;

    let body: serde_json::Value = reqwest::get(srv.url("/api/products"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bolts", "Washers"]);
}

#[tokio::test]
async fn error_responses_are_mapped() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Blank name.
    let res = client
        .post(srv.url("/api/products"))
        .json(&json!({ "name": " ", "sku": "X" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    // Duplicate SKU.
    let id = create_product(&client, &srv, json!({ "name": "Nuts", "sku": "N-1", "quantity": 1 })).await;
    let res = client
        .post(srv.url("/api/products"))
        .json(&json!({ "name": "Other nuts", "sku": "N-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Overdraw.
    let res = client
        .post(srv.url(&format!("/api/products/{id}/movements")))
        .json(&json!({ "type": "OUT", "quantity": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Quantities past the per-product ceiling.
    let res = client
        .post(srv.url("/api/products"))
        .json(&json!({ "name": "Sand", "sku": "S-1", "quantity": i64::MAX }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res = client
        .post(srv.url(&format!("/api/products/{id}/movements")))
        .json(&json!({ "type": "IN", "quantity": i64::MAX }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res = client.get(srv.url("/api/stats")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Malformed and unknown ids.
    let res = client.get(srv.url("/api/products/not-a-uuid")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res = client
        .get(srv.url("/api/products/0190b6f2-7c1a-7d3e-8a4b-123456789abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bundle_route_is_404_without_assets_dir() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/pkg/stockroom_dashboard.js")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bundle_files_are_served_from_assets_dir() {
    let dir = tempfile::tempdir().unwrap();
    let wasm = b"\0asm\x01\0\0\0".to_vec();
    std::fs::write(dir.path().join("stockroom_dashboard_bg.wasm"), &wasm).unwrap();
    std::fs::write(
        dir.path().join("stockroom_dashboard.js"),
        "export default function init() {}",
    )
    .unwrap();

    let srv = TestServer::spawn_with_assets(Some(dir.path().to_path_buf())).await;

    let res = reqwest::get(srv.url("/pkg/stockroom_dashboard_bg.wasm")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/wasm");
    assert_eq!(res.bytes().await.unwrap().to_vec(), wasm);

    let res = reqwest::get(srv.url("/pkg/stockroom_dashboard.js")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/javascript; charset=utf-8");
    assert_eq!(res.text().await.unwrap(), "export default function init() {}");

    let res = reqwest::get(srv.url("/pkg/missing.js")).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = reqwest::get(srv.url("/pkg/.hidden")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
