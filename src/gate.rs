//! Bounded concurrency gate for outbound provider calls.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Caps simultaneous in-flight upstream calls to one provider.
///
/// A burst of lazy image loads or rapid re-searches otherwise fans out into
/// dozens of parallel requests against the same third-party API. Calls beyond
/// the bound queue until a slot frees; the permit releases on drop, on success
/// and failure alike.
#[derive(Clone)]
pub struct ConcurrencyGate {
    slots: Arc<Semaphore>,
}

impl ConcurrencyGate {
    pub fn new(slots: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(slots)),
        }
    }

    /// Wait for a slot. Hold the returned permit for the duration of the
    /// upstream call.
    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        // The semaphore is never closed.
        self.slots
            .clone()
            .acquire_owned()
            .await
            .expect("gate semaphore closed")
    }

    #[cfg(test)]
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }
}
