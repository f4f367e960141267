//! Surface used when no UI host is attached.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::info;

use taskhub_protocols::UiSurface;

pub const HEADLESS_SURFACE_ID: &str = "taskhub.headless";

/// [`UiSurface`] that only logs.
#[derive(Default)]
pub struct HeadlessSurface {
    reveals: AtomicU64,
    disposed: AtomicBool,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reveal_count(&self) -> u64 {
        self.reveals.load(Ordering::SeqCst)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl UiSurface for HeadlessSurface {
    fn id(&self) -> &str {
        HEADLESS_SURFACE_ID
    }

    fn reveal(&self) {
        self.reveals.fetch_add(1, Ordering::SeqCst);
        info!("Surface {} revealed", HEADLESS_SURFACE_ID);
    }

    fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            info!("Surface {} disposed", HEADLESS_SURFACE_ID);
        }
    }
}
