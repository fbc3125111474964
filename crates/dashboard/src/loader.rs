//! Page-ready stats loader.

use std::cell::Cell;

use crate::diagnostics::ErrorChannel;
use crate::regions::{DisplaySurface, Region};
use crate::source::{LoadError, StatsSource};
use crate::types::StatsRecord;

/// What a page-ready signal resulted in.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// All four regions were written.
    Rendered(StatsRecord),
    /// The load failed; one diagnostic was reported and no region was touched.
    Failed(LoadError),
    /// The handler already ran for this page; nothing was done.
    AlreadyFired,
}

/// Fetches the statistics record once and writes it into the page.
///
/// Single-threaded: one loader per page, driven from the page's event loop.
pub struct StatsLoader<S, E> {
    source: S,
    errors: E,
    fired: Cell<bool>,
}

impl<S, E> StatsLoader<S, E>
where
    S: StatsSource,
    E: ErrorChannel,
{
    pub fn new(source: S, errors: E) -> Self {
        Self {
            source,
            errors,
            fired: Cell::new(false),
        }
    }

    /// Whether the page-ready handler has run.
    pub fn has_fired(&self) -> bool {
        self.fired.get()
    }

    /// Page-ready handler. Only the first call loads; later calls are no-ops.
    pub async fn on_ready<D: DisplaySurface>(&self, surface: &mut D) -> LoadOutcome {
        if self.fired.replace(true) {
            return LoadOutcome::AlreadyFired;
        }

        match self.load(surface).await {
            Ok(record) => LoadOutcome::Rendered(record),
            Err(e) => LoadOutcome::Failed(e),
        }
    }

    /// Fetch and render. On failure reports exactly one diagnostic and
    /// leaves every region as it was.
    pub async fn load<D: DisplaySurface>(&self, surface: &mut D) -> Result<StatsRecord, LoadError> {
        let result = match self.source.fetch_stats().await {
            Ok(record) => render(&record, surface).map(|()| record),
            Err(e) => Err(e),
        };

        match &result {
            Ok(record) => tracing::debug!(
                total_products = record.total_products,
                low_stock = record.low_stock,
                "stats rendered"
            ),
            Err(e) => self.errors.error(&format!("Error loading stats: {e}")),
        }
        result
    }
}

/// Write all four regions, or none if any is missing from the surface.
fn render<D: DisplaySurface>(record: &StatsRecord, surface: &mut D) -> Result<(), LoadError> {
    if let Some(missing) = Region::ALL.iter().find(|r| !surface.has_region(**r)) {
        return Err(LoadError::MissingRegion(missing.element_id()));
    }

    for (region, text) in record.render() {
        surface.set_text(region, &text);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::diagnostics::MemoryErrorChannel;
    use crate::regions::InMemorySurface;

    /// Source returning a canned result and counting calls.
    struct FakeSource {
        result: Result<StatsRecord, LoadError>,
        calls: Cell<usize>,
    }

    impl FakeSource {
        fn ok(record: StatsRecord) -> Self {
            Self { result: Ok(record), calls: Cell::new(0) }
        }

        fn failing(err: LoadError) -> Self {
            Self { result: Err(err), calls: Cell::new(0) }
        }
    }

    #[async_trait(?Send)]
    impl StatsSource for FakeSource {
        async fn fetch_stats(&self) -> Result<StatsRecord, LoadError> {
            self.calls.set(self.calls.get() + 1);
            self.result.clone()
        }
    }

    fn example() -> StatsRecord {
        StatsRecord {
            total_products: 5.0,
            total_items: 120.0,
            total_value: 543.2,
            low_stock: 2.0,
        }
    }

    fn texts(surface: &InMemorySurface) -> Vec<Option<&str>> {
        Region::ALL.iter().map(|r| surface.text(*r)).collect()
    }

    #[tokio::test]
    async fn renders_all_four_regions() {
        let source = FakeSource::ok(example());
        let errors = MemoryErrorChannel::new();
        let loader = StatsLoader::new(&source, &errors);
        let mut surface = InMemorySurface::with_all_regions("-");

        let outcome = loader.on_ready(&mut surface).await;

        assert_eq!(outcome, LoadOutcome::Rendered(example()));
        assert_eq!(
            texts(&surface),
            vec![Some("5"), Some("120"), Some("$543.20"), Some("2")]
        );
        assert!(errors.entries().is_empty());
    }

    #[tokio::test]
    async fn whole_number_value_keeps_two_decimals() {
        let mut record = example();
        record.total_value = 100.0;
        let source = FakeSource::ok(record);
        let loader = StatsLoader::new(&source, MemoryErrorChannel::new());
        let mut surface = InMemorySurface::with_all_regions("-");

        loader.on_ready(&mut surface).await;
        assert_eq!(surface.text(Region::TotalValue), Some("$100.00"));
    }

    #[tokio::test]
    async fn network_failure_leaves_regions_and_logs_once() {
        let source = FakeSource::failing(LoadError::Network("connection refused".to_string()));
        let errors = MemoryErrorChannel::new();
        let loader = StatsLoader::new(&source, &errors);
        let mut surface = InMemorySurface::with_all_regions("-");

        let outcome = loader.on_ready(&mut surface).await;

        assert!(matches!(outcome, LoadOutcome::Failed(LoadError::Network(_))));
        assert_eq!(surface.writes(), 0);
        assert_eq!(texts(&surface), vec![Some("-"); 4]);
        assert_eq!(
            errors.entries(),
            vec!["Error loading stats: network error: connection refused".to_string()]
        );
    }

    #[tokio::test]
    async fn malformed_body_leaves_regions_and_logs_once() {
        let source = FakeSource::failing(LoadError::Parse("expected value at line 1".to_string()));
        let errors = MemoryErrorChannel::new();
        let loader = StatsLoader::new(&source, &errors);
        let mut surface = InMemorySurface::with_all_regions("-");

        loader.on_ready(&mut surface).await;

        assert_eq!(surface.writes(), 0);
        assert_eq!(errors.entries().len(), 1);
        assert!(errors.entries()[0].starts_with("Error loading stats: invalid stats body"));
    }

    #[tokio::test]
    async fn missing_region_writes_nothing() {
        let source = FakeSource::ok(example());
        let errors = MemoryErrorChannel::new();
        let loader = StatsLoader::new(&source, &errors);
        let mut surface = InMemorySurface::with_regions(
            &[Region::TotalProducts, Region::TotalItems, Region::LowStock],
            "-",
        );

        let outcome = loader.on_ready(&mut surface).await;

        assert_eq!(outcome, LoadOutcome::Failed(LoadError::MissingRegion("total-value")));
        assert_eq!(surface.writes(), 0);
        assert_eq!(errors.entries().len(), 1);
    }

    #[tokio::test]
    async fn fires_once_and_requests_once() {
        let source = FakeSource::ok(example());
        let loader = StatsLoader::new(&source, MemoryErrorChannel::new());
        let mut surface = InMemorySurface::with_all_regions("-");

        assert!(!loader.has_fired());
        loader.on_ready(&mut surface).await;
        let second = loader.on_ready(&mut surface).await;

        assert!(loader.has_fired());
        assert_eq!(second, LoadOutcome::AlreadyFired);
        assert_eq!(source.calls.get(), 1);
        assert_eq!(surface.writes(), 4);
    }

    #[tokio::test]
    async fn failed_load_does_not_retry() {
        let source = FakeSource::failing(LoadError::Status(500));
        let errors = MemoryErrorChannel::new();
        let loader = StatsLoader::new(&source, &errors);
        let mut surface = InMemorySurface::with_all_regions("-");

        loader.on_ready(&mut surface).await;
        loader.on_ready(&mut surface).await;

        assert_eq!(source.calls.get(), 1);
        assert_eq!(errors.entries().len(), 1);
    }
}
