//! Developer-facing error channel.

use std::cell::RefCell;

/// Where the loader reports a failed load. Never shown to the end user.
pub trait ErrorChannel {
    fn error(&self, message: &str);
}

/// Reports through `tracing` at ERROR level (native builds).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorChannel;

impl ErrorChannel for TracingErrorChannel {
    fn error(&self, message: &str) {
        tracing::error!(target: "stockroom_dashboard", "{message}");
    }
}

/// Keeps every reported message; used to assert on diagnostics.
#[derive(Debug, Default)]
pub struct MemoryErrorChannel {
    entries: RefCell<Vec<String>>,
}

impl MemoryErrorChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }
}

impl ErrorChannel for MemoryErrorChannel {
    fn error(&self, message: &str) {
        self.entries.borrow_mut().push(message.to_string());
    }
}

impl<T: ErrorChannel + ?Sized> ErrorChannel for &T {
    fn error(&self, message: &str) {
        (**self).error(message)
    }
}
