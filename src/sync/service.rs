//! The sync service: one explicitly constructed object owning the
//! engine's moving parts.
//!
//! Replaces what the original design kept as module-level singletons:
//! the service is built once, handed by reference to whatever needs it,
//! and has a defined `initialize`/`dispose` lifecycle tied to the
//! signed-in user.

use std::sync::{Arc, Mutex};

use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use crate::config::SyncConfig;
use crate::db::{MirrorStore, StoreError};
use crate::sync::notifier::{ChangeNotifier, SyncEvent, SyncSummary};
use crate::sync::orchestrator::{SyncError, SyncOrchestrator, SyncTrigger};
use crate::sync::pending::{Connectivity, PendingError, PendingTracker};
use crate::sync::realtime::RealtimeListener;
use crate::sync::remote::{HttpRemote, RemoteError, RemoteStore};

/// Owns the mirror store, remote client, notifier, connectivity flag,
/// and orchestrator for one signed-in user.
pub struct SyncService<R> {
    store: MirrorStore,
    remote: Arc<R>,
    notifier: ChangeNotifier,
    connectivity: Connectivity,
    orchestrator: SyncOrchestrator<R>,
    user_id: Mutex<Option<Uuid>>,
}

impl SyncService<HttpRemote> {
    /// Builds the service against the configured HTTP backend.
    pub fn from_config(config: &SyncConfig, pool: SqlitePool) -> Result<Self, RemoteError> {
        let server_url = config.server_url.clone().ok_or(RemoteError::NotConfigured)?;
        let access_token = config
            .access_token
            .clone()
            .ok_or(RemoteError::NotConfigured)?;
        Ok(Self::new(
            pool,
            Arc::new(HttpRemote::new(server_url, access_token)),
        ))
    }

    /// Realtime listener for the configured feed, sharing this
    /// service's store and notifier.
    pub fn realtime_listener(&self) -> RealtimeListener {
        RealtimeListener::new(
            self.remote.feed_url(),
            self.store.clone(),
            self.notifier.clone(),
        )
    }
}

impl<R: RemoteStore> SyncService<R> {
    pub fn new(pool: SqlitePool, remote: Arc<R>) -> Self {
        let store = MirrorStore::new(pool);
        let notifier = ChangeNotifier::new();
        let orchestrator = SyncOrchestrator::new(store.clone(), remote.clone(), notifier.clone());
        Self {
            store,
            remote,
            notifier,
            connectivity: Connectivity::new(true),
            orchestrator,
            user_id: Mutex::new(None),
        }
    }

    /// Binds the service to the signed-in user. Must be called before
    /// mutations are accepted.
    pub fn initialize(&self, user_id: Uuid) {
        if let Ok(mut guard) = self.user_id.lock() {
            *guard = Some(user_id);
        }
        info!(%user_id, "sync service initialized");
    }

    /// Releases the user binding, e.g. on sign-out. Mirror contents and
    /// the watermark stay on disk for the next session.
    pub fn dispose(&self) {
        if let Ok(mut guard) = self.user_id.lock() {
            *guard = None;
        }
        info!("sync service disposed");
    }

    fn current_user(&self) -> Result<Uuid, PendingError> {
        self.user_id
            .lock()
            .ok()
            .and_then(|g| *g)
            .ok_or(PendingError::NotInitialized)
    }

    /// Read-side access; reads are served from the mirror and never
    /// fail because of sync state.
    pub fn store(&self) -> &MirrorStore {
        &self.store
    }

    /// Write-side entry point for the current user.
    pub fn tracker(&self) -> Result<PendingTracker<R>, PendingError> {
        Ok(PendingTracker::new(
            self.store.clone(),
            self.remote.clone(),
            self.connectivity.clone(),
            self.current_user()?,
        ))
    }

    /// Registers a listener on the notifier bus.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.notifier.subscribe()
    }

    pub async fn pending_count(&self) -> Result<i64, StoreError> {
        self.store.pending_count().await
    }

    pub fn last_error(&self) -> Option<String> {
        self.orchestrator.last_error()
    }

    // --- triggers --------------------------------------------------------

    /// Explicit user-initiated "sync now".
    pub async fn sync_now(&self) -> Result<Option<SyncSummary>, SyncError> {
        self.orchestrator.sync(SyncTrigger::Manual).await
    }

    /// Application regained foreground visibility.
    pub async fn on_foreground(&self) -> Result<Option<SyncSummary>, SyncError> {
        self.orchestrator.sync(SyncTrigger::Foregrounded).await
    }

    /// Best-effort push after a successful online mutation; failures
    /// are swallowed since the next triggered cycle catches up.
    pub async fn after_mutation(&self) {
        let _ = self.orchestrator.sync(SyncTrigger::PostMutation).await;
    }

    /// Updates the connectivity flag. The offline-to-online edge fires
    /// a reconnect sync.
    pub async fn set_online(&self, online: bool) -> Result<Option<SyncSummary>, SyncError> {
        let was_online = self.connectivity.set_online(online);
        if online && !was_online {
            return self.orchestrator.sync(SyncTrigger::Reconnected).await;
        }
        Ok(None)
    }

    /// Explicit user-requested reset: wipes the mirror and watermark,
    /// then runs the resulting full sync.
    pub async fn reset(&self) -> Result<Option<SyncSummary>, SyncError> {
        self.store.clear_all().await?;
        self.orchestrator.sync(SyncTrigger::Manual).await
    }
}
