//! In-process publish/subscribe bus for sync notifications.
//!
//! Presentation code subscribes to hear that a remote change was merged
//! or that a sync cycle finished. Delivery is fire-and-forget with no
//! replay; a subscriber registered after an event fired will not see it.

use tokio::sync::broadcast;

/// Counts for one completed orchestrator cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Rows submitted in the push step.
    pub pushed: usize,
    /// Rows merged from the pull step (or the full snapshot).
    pub pulled: usize,
    /// True if the cycle merged at least one row not originated locally.
    pub remote_changes: bool,
}

/// Events published on the notifier bus.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A remote row was merged into the mirror, by the realtime listener
    /// or by a pull step.
    RemoteChange,
    /// One orchestrator cycle finished.
    SyncComplete(SyncSummary),
    /// A cycle failed; the mirror is untouched and the next trigger
    /// retries from the same watermark.
    SyncFailed { message: String },
}

/// Typed pub/sub channel with explicit subscribe lifecycle.
///
/// Subscriptions end when the receiver is dropped, so a consumer ties
/// the receiver to its own lifetime and cannot leak a listener.
#[derive(Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<SyncEvent>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    /// Registers a listener. Events fired before this call are not
    /// replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }

    /// Publishes to all current listeners; having none is fine.
    pub fn publish(&self, event: SyncEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
