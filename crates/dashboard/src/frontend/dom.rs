//! DOM-backed surface and console diagnostics.

use web_sys::Document;

use crate::diagnostics::ErrorChannel;
use crate::regions::{DisplaySurface, Region};

/// The live page. Regions are looked up by element id on every access.
pub struct DomSurface {
    document: Document,
}

impl DomSurface {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl DisplaySurface for DomSurface {
    fn has_region(&self, region: Region) -> bool {
        self.document.get_element_by_id(region.element_id()).is_some()
    }

    fn set_text(&mut self, region: Region, text: &str) {
        if let Some(el) = self.document.get_element_by_id(region.element_id()) {
            el.set_text_content(Some(text));
        }
    }
}

/// Writes diagnostics with `console.error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleErrorChannel;

impl ConsoleErrorChannel {
    pub fn report(&self, message: &str) {
        web_sys::console::error_1(&message.into());
    }
}

impl ErrorChannel for ConsoleErrorChannel {
    fn error(&self, message: &str) {
        self.report(message);
    }
}
