//! Per-user display ordering for lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Syncable;

/// One user's position for one list. Unique per (user, list).
///
/// Ordering has no cross-client contention (each user owns their own
/// rows), so it syncs through an idempotent reorder submission rather
/// than the LWW push path. Offline reorders are held locally with the
/// pending flag until the next push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListSettings {
    pub id: Uuid,
    pub user_id: Uuid,
    pub list_id: Uuid,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Syncable for UserListSettings {
    fn entity_id(&self) -> Uuid {
        self.id
    }

    fn modified_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Ordering rows are never tombstoned; they follow their list.
    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}
