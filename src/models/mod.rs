//! Shared entity types mirrored between the local store and the server.
//!
//! Every syncable entity carries `updated_at` (the Last-Write-Wins
//! timestamp) and a nullable `deleted_at` soft-delete tombstone.

mod item;
mod list;
mod settings;
mod share;

pub use item::Item;
pub use list::{List, ListCategory};
pub use settings::UserListSettings;
pub use share::ListShare;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Common surface of every row-level syncable entity.
///
/// The conflict resolver is generic over this trait so the bulk pull
/// path and the realtime path share one decision function.
pub trait Syncable {
    /// Stable row identity, assigned by the server at creation.
    fn entity_id(&self) -> Uuid;

    /// Last-Write-Wins timestamp. Caller-supplied values are
    /// authoritative; the server never silently overrides one.
    fn modified_at(&self) -> DateTime<Utc>;

    /// Soft-delete tombstone, if set.
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// True if the row carries a soft-delete tombstone.
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}
