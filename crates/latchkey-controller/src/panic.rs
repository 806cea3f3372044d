//! Re-entrancy guard for the silent panic sequence.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared `active` flag of the panic sequence.
///
/// Clones share the flag, so anything else that can raise a panic alert
/// sees an in-flight sequence.
#[derive(Debug, Clone, Default)]
pub struct PanicState {
    active: Arc<AtomicBool>,
}

impl PanicState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Mark the sequence active.
    ///
    /// Returns `None` if it already is; the caller must then start nothing.
    /// The flag is cleared when the returned guard is dropped.
    #[must_use]
    pub fn try_activate(&self) -> Option<PanicActivation> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PanicActivation {
                active: Arc::clone(&self.active),
            })
    }
}

/// Holds the panic flag set; clears it on drop.
#[derive(Debug)]
pub struct PanicActivation {
    active: Arc<AtomicBool>,
}

impl Drop for PanicActivation {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}
