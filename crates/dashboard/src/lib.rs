//! `stockroom-dashboard`
//!
//! Fills the dashboard's four stat regions from `GET /api/stats` once the
//! page is ready.
//!
//! The loader is written against three small seams so it runs the same way
//! in the browser and in native tests:
//! - [`StatsSource`]: where the statistics record comes from
//! - [`DisplaySurface`]: where the rendered text goes
//! - [`ErrorChannel`]: where the single diagnostic goes on failure

pub mod diagnostics;
pub mod format;
pub mod loader;
pub mod regions;
pub mod source;
pub mod types;

#[cfg(target_arch = "wasm32")]
pub mod frontend;

pub use diagnostics::{ErrorChannel, MemoryErrorChannel, TracingErrorChannel};
pub use format::{format_currency, format_number};
pub use loader::{LoadOutcome, StatsLoader};
pub use regions::{DisplaySurface, InMemorySurface, Region};
pub use source::{parse_stats, LoadError, StatsSource, STATS_PATH};
pub use types::StatsRecord;

#[cfg(not(target_arch = "wasm32"))]
pub use source::HttpStatsSource;
