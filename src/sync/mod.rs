//! Offline synchronization engine.
//!
//! Keeps the local mirror consistent with the remote store under
//! intermittent connectivity using timestamp-based Last-Write-Wins
//! reconciliation:
//!
//! - [`resolver`] -- the single LWW decision function
//! - [`remote`] -- wire types and the remote store RPC surface
//! - [`pending`] -- offline capability gating and pending-flag tracking
//! - [`orchestrator`] -- push-then-pull cycles and the watermark
//! - [`realtime`] -- per-event merges from the server's change feed
//! - [`notifier`] -- in-process pub/sub for "remote change merged" and
//!   "sync cycle completed"
//! - [`service`] -- the explicitly constructed service object wiring
//!   the above together

pub mod notifier;
pub mod orchestrator;
pub mod pending;
pub mod realtime;
pub mod remote;
pub mod resolver;
pub mod service;

pub use notifier::{ChangeNotifier, SyncEvent, SyncSummary};
pub use orchestrator::{SyncError, SyncOrchestrator, SyncTrigger};
pub use pending::{Connectivity, PendingError, PendingTracker};
pub use realtime::{RealtimeError, RealtimeListener};
pub use remote::{
    ChangeEvent, ChangeSet, CreateItem, CreateList, EventEntity, EventType, HttpRemote,
    PushBatch, PushOutcome, PushResponse, RemoteError, RemoteStore, ReorderEntry,
};
pub use resolver::{resolve, Resolution};
pub use service::SyncService;
