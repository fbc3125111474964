//! Where the statistics record comes from.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::StatsRecord;

/// Path of the statistics endpoint, relative to the page origin.
pub const STATS_PATH: &str = "/api/stats";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("invalid stats body: {0}")]
    Parse(String),

    #[error("display region #{0} not found")]
    MissingRegion(&'static str),
}

/// Fetches one statistics record.
///
/// `?Send` because the browser implementation awaits JS promises.
#[async_trait(?Send)]
pub trait StatsSource {
    async fn fetch_stats(&self) -> Result<StatsRecord, LoadError>;
}

#[async_trait(?Send)]
impl<T: StatsSource + ?Sized> StatsSource for &T {
    async fn fetch_stats(&self) -> Result<StatsRecord, LoadError> {
        (**self).fetch_stats().await
    }
}

/// Parse a response body into a statistics record.
pub fn parse_stats(body: &[u8]) -> Result<StatsRecord, LoadError> {
    serde_json::from_slice(body).map_err(|e| LoadError::Parse(e.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::HttpStatsSource;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use async_trait::async_trait;

    use super::{parse_stats, LoadError, StatsSource, STATS_PATH};
    use crate::types::StatsRecord;

    /// `reqwest`-backed source talking to a running API.
    #[derive(Debug, Clone)]
    pub struct HttpStatsSource {
        client: reqwest::Client,
        url: String,
    }

    impl HttpStatsSource {
        /// `base_url` is the API origin, e.g. `http://localhost:8080`.
        pub fn new(base_url: &str) -> Self {
            Self::with_client(reqwest::Client::new(), base_url)
        }

        pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
            Self {
                client,
                url: format!("{}{}", base_url.trim_end_matches('/'), STATS_PATH),
            }
        }

        pub fn url(&self) -> &str {
            &self.url
        }
    }

    #[async_trait(?Send)]
    impl StatsSource for HttpStatsSource {
        async fn fetch_stats(&self) -> Result<StatsRecord, LoadError> {
            let resp = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| LoadError::Network(e.to_string()))?;

            if !resp.status().is_success() {
                return Err(LoadError::Status(resp.status().as_u16()));
            }

            let body = resp
                .bytes()
                .await
                .map_err(|e| LoadError::Network(e.to_string()))?;
            parse_stats(&body)
        }
    }
}
