//! Cooperative cancellation and progress reporting
//!
//! Long-running operations poll a [`CancelToken`] at well-defined points
//! and report `(message, percent)` pairs through a [`ProgressFn`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Progress callback: human-readable stage text plus a 0-100 value.
///
/// Invoked from worker threads; consumers serialize their own state.
pub type ProgressFn = Arc<dyn Fn(&str, u8) + Send + Sync>;

/// Progress callback that discards every update
pub fn silent_progress() -> ProgressFn {
    Arc::new(|_: &str, _: u8| {})
}

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear a previous request so the token can be reused
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
