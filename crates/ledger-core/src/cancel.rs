use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Thread-safe flag used to stop an in-flight mining search.
///
/// Clones share the same flag. Once raised it stays raised.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
