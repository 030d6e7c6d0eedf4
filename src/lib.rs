//! Pairlist Sync Engine
//!
//! Offline-first synchronization core for a private two-user list
//! application: a SQLite mirror of the remote store, timestamp-based
//! Last-Write-Wins reconciliation, a push-then-pull orchestrator with a
//! monotonic watermark, a realtime change listener, and offline
//! capability gating. The UI, the backend, and authentication live
//! elsewhere; this crate only keeps two clients converging.

pub mod config;
pub mod db;
pub mod models;
pub mod sync;

pub use config::{Config, ConfigError, SyncConfig};
pub use db::{init_db, MirrorStore, StoreError};
pub use models::{Item, List, ListCategory, ListShare, Syncable, UserListSettings};
pub use sync::{
    ChangeEvent, ChangeNotifier, ChangeSet, Connectivity, HttpRemote, PendingError,
    PendingTracker, RealtimeError, RealtimeListener, RemoteError, RemoteStore, SyncError,
    SyncEvent, SyncOrchestrator, SyncService, SyncSummary, SyncTrigger,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
