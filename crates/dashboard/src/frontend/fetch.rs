//! `window.fetch` statistics source.

use async_trait::async_trait;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use crate::source::{parse_stats, LoadError, StatsSource, STATS_PATH};
use crate::types::StatsRecord;

/// Requests the stats endpoint relative to the page origin.
#[derive(Debug, Clone)]
pub struct FetchStatsSource {
    path: String,
}

impl FetchStatsSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for FetchStatsSource {
    fn default() -> Self {
        Self::new(STATS_PATH)
    }
}

fn js_message(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

#[async_trait(?Send)]
impl StatsSource for FetchStatsSource {
    async fn fetch_stats(&self) -> Result<StatsRecord, LoadError> {
        let window =
            web_sys::window().ok_or_else(|| LoadError::Network("no window object".to_string()))?;

        let request: js_sys::Promise = window.fetch_with_str(&self.path);
        let resp = JsFuture::from(request)
            .await
            .map_err(|e| LoadError::Network(js_message(e)))?;
        let resp: Response = resp
            .dyn_into()
            .map_err(|e| LoadError::Network(js_message(e)))?;

        if !resp.ok() {
            return Err(LoadError::Status(resp.status()));
        }

        let text_promise = resp.text().map_err(|e| LoadError::Parse(js_message(e)))?;
        let text = JsFuture::from(text_promise)
            .await
            .map_err(|e| LoadError::Network(js_message(e)))?
            .as_string()
            .unwrap_or_default();

        parse_stats(text.as_bytes())
    }
}
