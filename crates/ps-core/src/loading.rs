//! Loading affordance shared explicitly with whoever needs it.
//!
//! Each operation that suspends holds a [`LoadingGuard`]; the indicator is
//! active while at least one guard is alive.

use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct LoadingIndicator {
    active: AtomicUsize,
}

impl LoadingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> LoadingGuard<'_> {
        self.active.fetch_add(1, Ordering::SeqCst);
        LoadingGuard { indicator: self }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }
}

#[must_use = "the indicator stops as soon as the guard is dropped"]
pub struct LoadingGuard<'a> {
    indicator: &'a LoadingIndicator,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.indicator.active.fetch_sub(1, Ordering::SeqCst);
    }
}
