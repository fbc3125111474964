//! Browser entry point.

pub mod dom;
pub mod fetch;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::loader::{LoadOutcome, StatsLoader};

pub use dom::{ConsoleErrorChannel, DomSurface};
pub use fetch::FetchStatsSource;

/// WASM entry point. Runs the loader once the document has finished parsing.
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() == "loading" {
        let listener = Closure::once_into_js(|| spawn_local(run()));
        document.add_event_listener_with_callback("DOMContentLoaded", listener.unchecked_ref())?;
    } else {
        spawn_local(run());
    }
    Ok(())
}

async fn run() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        ConsoleErrorChannel.report("Error loading stats: no document");
        return;
    };

    let loader = StatsLoader::new(FetchStatsSource::default(), ConsoleErrorChannel);
    let mut surface = DomSurface::new(document);

    // Failures were already reported to the console by the loader.
    if let LoadOutcome::Rendered(record) = loader.on_ready(&mut surface).await {
        web_sys::console::log_1(
            &format!("[stats] loaded {} products", record.total_products).into(),
        );
    }
}
