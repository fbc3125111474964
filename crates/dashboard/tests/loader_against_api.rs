use std::sync::Arc;

use axum::{response::Html, routing::get, Router};

use stockroom_api::app::{
    build_app,
    services::{AppServices, NewProduct},
};
use stockroom_core::Money;
use stockroom_dashboard::{
    HttpStatsSource, InMemorySurface, LoadError, LoadOutcome, MemoryErrorChannel, Region,
    StatsLoader,
};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn product(sku: &str, quantity: i64, price_cents: u64) -> NewProduct {
    NewProduct {
        name: format!("Product {sku}"),
        description: None,
        sku: sku.to_string(),
        quantity,
        price: Money::from_cents(price_cents),
        category: None,
        image_url: None,
    }
}

/// Five products, 120 units, $543.20 of stock, two below the low-stock line.
async fn seeded_services() -> Arc<AppServices> {
    let services = AppServices::in_memory();
    for p in [
        product("A-1", 50, 500),
        product("B-1", 40, 500),
        product("C-1", 20, 400),
        product("D-1", 6, 120),
        product("E-1", 4, 150),
    ] {
        services.create_product(p).await.unwrap();
    }
    Arc::new(services)
}

fn texts(surface: &InMemorySurface) -> Vec<Option<&str>> {
    Region::ALL.iter().map(|r| surface.text(*r)).collect()
}

#[tokio::test]
async fn renders_stats_from_running_api() {
    let srv = TestServer::spawn(build_app(seeded_services().await, None)).await;
    let errors = MemoryErrorChannel::new();
    let loader = StatsLoader::new(HttpStatsSource::new(&srv.base_url), &errors);
    let mut surface = InMemorySurface::with_all_regions("-");

    let outcome = loader.on_ready(&mut surface).await;

    assert!(matches!(outcome, LoadOutcome::Rendered(_)), "got {outcome:?}");
    assert_eq!(
        texts(&surface),
        vec![Some("5"), Some("120"), Some("$543.20"), Some("2")]
    );
    assert!(errors.entries().is_empty());
}

#[tokio::test]
async fn empty_catalogue_renders_zeroes() {
    let srv = TestServer::spawn(build_app(Arc::new(AppServices::in_memory()), None)).await;
    let loader = StatsLoader::new(HttpStatsSource::new(&srv.base_url), MemoryErrorChannel::new());
    let mut surface = InMemorySurface::with_all_regions("-");

    loader.on_ready(&mut surface).await;

    assert_eq!(
        texts(&surface),
        vec![Some("0"), Some("0"), Some("$0.00"), Some("0")]
    );
}

#[tokio::test]
async fn unreachable_api_reports_once_and_leaves_placeholders() {
    // Grab a free port, then close it so the connection is refused.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let errors = MemoryErrorChannel::new();
    let loader = StatsLoader::new(HttpStatsSource::new(&format!("http://{addr}")), &errors);
    let mut surface = InMemorySurface::with_all_regions("-");

    let outcome = loader.on_ready(&mut surface).await;

    assert!(matches!(outcome, LoadOutcome::Failed(LoadError::Network(_))));
    assert_eq!(surface.writes(), 0);
    assert_eq!(texts(&surface), vec![Some("-"); 4]);
    let entries = errors.entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].starts_with("Error loading stats: "));
}

#[tokio::test]
async fn html_body_is_a_parse_failure() {
    let app = Router::new().route(
        "/api/stats",
        get(|| async { Html("<html><body>maintenance</body></html>") }),
    );
    let srv = TestServer::spawn(app).await;
    let errors = MemoryErrorChannel::new();
    let loader = StatsLoader::new(HttpStatsSource::new(&srv.base_url), &errors);
    let mut surface = InMemorySurface::with_all_regions("-");

    let outcome = loader.on_ready(&mut surface).await;

    assert!(matches!(outcome, LoadOutcome::Failed(LoadError::Parse(_))));
    assert_eq!(surface.writes(), 0);
    assert_eq!(errors.entries().len(), 1);
}

#[tokio::test]
async fn missing_endpoint_is_a_status_failure() {
    let srv = TestServer::spawn(Router::new()).await;
    let errors = MemoryErrorChannel::new();
    let loader = StatsLoader::new(HttpStatsSource::new(&srv.base_url), &errors);
    let mut surface = InMemorySurface::with_all_regions("-");

    let outcome = loader.on_ready(&mut surface).await;

    assert_eq!(outcome, LoadOutcome::Failed(LoadError::Status(404)));
    assert_eq!(surface.writes(), 0);
    assert_eq!(
        errors.entries(),
        vec!["Error loading stats: unexpected HTTP status 404".to_string()]
    );
}
