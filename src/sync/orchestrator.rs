//! The sync orchestrator: push-then-pull reconciliation cycles.
//!
//! At most one cycle runs at a time; a trigger that fires while a cycle
//! is in flight is dropped rather than queued, since the next trigger
//! re-requests from the current watermark anyway. Within a cycle, push
//! completes before pull begins so a client's own edits are never
//! overwritten by a pull that predates their submission.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::db::{MirrorStore, StoreError};
use crate::sync::notifier::{ChangeNotifier, SyncEvent, SyncSummary};
use crate::sync::remote::{ChangeSet, PushBatch, RemoteError, RemoteStore, ReorderEntry};
use crate::sync::resolver::resolve;

/// What caused a sync request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// Application regained foreground visibility.
    Foregrounded,
    /// Network transitioned offline to online.
    Reconnected,
    /// Explicit user-initiated "sync now".
    Manual,
    /// Best-effort push right after a successful online mutation.
    PostMutation,
}

/// Errors that end a cycle. The mirror is never left partially applied;
/// the next trigger retries from the same watermark.
#[derive(Debug)]
pub enum SyncError {
    Remote(RemoteError),
    Store(StoreError),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Remote(e) => write!(f, "{}", e),
            SyncError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<RemoteError> for SyncError {
    fn from(e: RemoteError) -> Self {
        SyncError::Remote(e)
    }
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        SyncError::Store(e)
    }
}

/// Drives reconciliation between the mirror and the remote store.
///
/// The orchestrator exclusively owns the watermark lifecycle: created
/// on the first successful sync, advanced only from server-reported
/// timestamps, never rolled back.
pub struct SyncOrchestrator<R> {
    store: MirrorStore,
    remote: Arc<R>,
    notifier: ChangeNotifier,
    in_flight: AtomicBool,
    last_error: Mutex<Option<String>>,
}

impl<R: RemoteStore> SyncOrchestrator<R> {
    pub fn new(store: MirrorStore, remote: Arc<R>, notifier: ChangeNotifier) -> Self {
        Self {
            store,
            remote,
            notifier,
            in_flight: AtomicBool::new(false),
            last_error: Mutex::new(None),
        }
    }

    /// The most recent cycle failure, if the last cycle failed.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|g| g.clone())
    }

    /// Runs one cycle for `trigger`. Returns `Ok(None)` if a cycle was
    /// already in flight and this request was dropped.
    ///
    /// First run (no watermark) does a full sync; otherwise push then
    /// incremental pull. All failures are caught here, recorded, and
    /// published as [`SyncEvent::SyncFailed`].
    pub async fn sync(&self, trigger: SyncTrigger) -> Result<Option<SyncSummary>, SyncError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!(?trigger, "sync already in flight, dropping trigger");
            return Ok(None);
        }

        let result = self.run_cycle().await;
        self.in_flight.store(false, Ordering::SeqCst);

        match result {
            Ok(summary) => {
                if let Ok(mut guard) = self.last_error.lock() {
                    *guard = None;
                }
                info!(
                    ?trigger,
                    pushed = summary.pushed,
                    pulled = summary.pulled,
                    "sync cycle complete"
                );
                if summary.remote_changes {
                    self.notifier.publish(SyncEvent::RemoteChange);
                }
                self.notifier.publish(SyncEvent::SyncComplete(summary));
                Ok(Some(summary))
            }
            Err(e) => {
                let message = e.to_string();
                warn!(?trigger, error = %message, "sync cycle failed");
                if let Ok(mut guard) = self.last_error.lock() {
                    *guard = Some(message.clone());
                }
                self.notifier.publish(SyncEvent::SyncFailed { message });
                Err(e)
            }
        }
    }

    async fn run_cycle(&self) -> Result<SyncSummary, SyncError> {
        match self.store.watermark().await? {
            None => self.full_sync().await,
            Some(watermark) => {
                let pushed = self.push_pending().await?;
                let pulled = self.pull(watermark).await?;
                Ok(SyncSummary {
                    pushed,
                    pulled,
                    remote_changes: pulled > 0,
                })
            }
        }
    }

    /// Push step: submit every pending row as one batch. Per-row
    /// outcomes: accepted clears the pending flag; rejected means the
    /// server held newer data, so the local row is overwritten with the
    /// authoritative copy and the flag cleared (the edit is superseded
    /// -- expected LWW, not an error). Pending reorder positions flush
    /// through the idempotent reorder endpoint afterwards.
    async fn push_pending(&self) -> Result<usize, SyncError> {
        let batch = PushBatch {
            lists: self.store.pending_lists().await?,
            items: self.store.pending_items().await?,
        };

        let mut pushed = 0;
        if !batch.is_empty() {
            pushed += batch.lists.len() + batch.items.len();
            let response = self.remote.push(&batch).await?;

            for outcome in response.lists {
                if outcome.accepted {
                    self.store.clear_pending_list(outcome.entity.id).await?;
                } else {
                    self.store.upsert_list(&outcome.entity, false).await?;
                }
            }
            for outcome in response.items {
                if outcome.accepted {
                    self.store.clear_pending_item(outcome.entity.id).await?;
                } else {
                    self.store.upsert_item(&outcome.entity, false).await?;
                }
            }
        }

        let pending_settings = self.store.pending_settings().await?;
        if !pending_settings.is_empty() {
            let entries: Vec<ReorderEntry> = pending_settings
                .iter()
                .map(|s| ReorderEntry {
                    list_id: s.list_id,
                    position: s.position,
                })
                .collect();
            self.remote.submit_reorder(&entries).await?;
            for s in &pending_settings {
                self.store.clear_pending_settings(s.id).await?;
            }
            pushed += pending_settings.len();
        }

        Ok(pushed)
    }

    /// Incremental pull: request rows changed strictly after the
    /// watermark, resolve each against the local copy, and advance the
    /// watermark to the server-reported `asOf`. Only pull responses
    /// advance the watermark; the client clock never does.
    async fn pull(&self, watermark: chrono::DateTime<chrono::Utc>) -> Result<usize, SyncError> {
        let changes = self.remote.changes_since(watermark).await?;
        let as_of = changes
            .as_of
            .ok_or_else(|| RemoteError::Malformed("changes response missing asOf".into()))?;

        let merged = self.apply_change_set(&changes).await?;
        self.store.set_watermark(as_of).await?;
        Ok(merged)
    }

    /// Full sync: discard the whole mirror and repopulate it verbatim
    /// from an authoritative snapshot. No per-row resolution; the
    /// replacement is atomic so readers never see a half-cleared store.
    async fn full_sync(&self) -> Result<SyncSummary, SyncError> {
        info!("no watermark, running full sync");
        let snapshot = self.remote.snapshot().await?;
        let as_of = snapshot
            .as_of
            .ok_or_else(|| RemoteError::Malformed("snapshot response missing asOf".into()))?;

        let pulled = snapshot.lists.len()
            + snapshot.items.len()
            + snapshot.shares.len()
            + snapshot.settings.len();

        self.store
            .replace_all(
                &snapshot.lists,
                &snapshot.items,
                &snapshot.shares,
                &snapshot.settings,
            )
            .await?;
        self.store.set_watermark(as_of).await?;

        Ok(SyncSummary {
            pushed: 0,
            pulled,
            remote_changes: pulled > 0,
        })
    }

    /// Resolves every row in a change set against the mirror. Returns
    /// the number of rows where the remote copy won *and* differed from
    /// what was stored, so re-applying a converged delta counts zero.
    async fn apply_change_set(&self, changes: &ChangeSet) -> Result<usize, SyncError> {
        let mut merged = 0;

        for remote in &changes.lists {
            let local = self.store.get_list(remote.id).await?;
            let changed = local.as_ref() != Some(remote);
            let resolution = resolve(local, remote.clone());
            if resolution.remote_won && changed {
                self.store.upsert_list(&resolution.winner, false).await?;
                merged += 1;
            }
        }

        for remote in &changes.items {
            let local = self.store.get_item(remote.id).await?;
            let changed = local.as_ref() != Some(remote);
            let resolution = resolve(local, remote.clone());
            if resolution.remote_won && changed {
                self.store.upsert_item(&resolution.winner, false).await?;
                merged += 1;
            }
        }

        // Shares carry no LWW timestamp; the server is their only
        // writer, so the remote copy is adopted as-is.
        for share in &changes.shares {
            self.store.upsert_share(share).await?;
        }

        for remote in &changes.settings {
            let local = self.store.settings_for(remote.user_id, remote.list_id).await?;
            let changed = local.as_ref() != Some(remote);
            let resolution = resolve(local, remote.clone());
            if resolution.remote_won && changed {
                self.store.upsert_settings(&resolution.winner, false).await?;
                merged += 1;
            }
        }

        if merged > 0 {
            debug!(merged, "applied remote changes");
        }
        Ok(merged)
    }
}
