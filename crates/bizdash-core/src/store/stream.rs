// ── Store subscriptions ──
//
// Subscription types for consuming snapshot changes from a store.

use tokio::sync::watch;

use super::resource_store::StoreSnapshot;

/// A subscription to a `ResourceDataStore`.
///
/// Provides both point-in-time snapshot access and reactive change
/// notification via `changed()`.
pub struct StoreStream {
    current: StoreSnapshot,
    receiver: watch::Receiver<StoreSnapshot>,
}

impl StoreStream {
    pub(crate) fn new(receiver: watch::Receiver<StoreSnapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Get the snapshot captured at creation (or at the last `changed()`).
    pub fn current(&self) -> &StoreSnapshot {
        &self.current
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the store has been dropped.
    pub async fn changed(&mut self) -> Option<StoreSnapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }
}
