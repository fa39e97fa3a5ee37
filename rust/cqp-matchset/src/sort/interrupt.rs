use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Cooperative cancellation flag shared between a long-running operation and
/// whoever may want to stop it (e.g. a signal handler).
///
/// The flag starts out "running". Clones share the same state.
#[derive(Clone, Debug)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> InterruptFlag {
        InterruptFlag(Arc::new(AtomicBool::new(true)))
    }

    /// Requests the operation to stop.
    pub fn interrupt(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Resets the flag to "running" for the next operation.
    pub fn rearm(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl Default for InterruptFlag {
    fn default() -> Self {
        InterruptFlag::new()
    }
}
