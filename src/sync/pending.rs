//! Pending-change tracking and offline capability gating.
//!
//! Mutations to existing rows work offline: they write through to the
//! mirror with a fresh client timestamp and the pending flag set, and
//! ride the next push. Creation requires connectivity because identity
//! for new rows is assigned by the remote store; there is no queue of
//! deferred creations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::db::{MirrorStore, StoreError};
use crate::models::{Item, List, ListCategory, Syncable, UserListSettings};
use crate::sync::remote::{CreateItem, CreateList, RemoteError, RemoteStore};

/// Shared online/offline flag, flipped by the host when the network
/// state changes.
#[derive(Clone)]
pub struct Connectivity(Arc<AtomicBool>);

impl Connectivity {
    pub fn new(online: bool) -> Self {
        Self(Arc::new(AtomicBool::new(online)))
    }

    pub fn is_online(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sets the flag and returns the previous value, so callers can
    /// detect the offline-to-online edge.
    pub fn set_online(&self, online: bool) -> bool {
        self.0.swap(online, Ordering::SeqCst)
    }
}

/// Errors from tracked mutations.
#[derive(Debug)]
pub enum PendingError {
    /// Creation was attempted while offline. Nothing was written; the
    /// caller surfaces a blocking notice.
    CreateRequiresConnectivity,
    /// No user is bound to the sync service.
    NotInitialized,
    /// The target row does not exist (or is soft-deleted).
    NotFound(Uuid),
    /// Local store failure.
    Store(StoreError),
    /// Remote store failure (creation RPCs only).
    Remote(RemoteError),
}

impl std::fmt::Display for PendingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PendingError::CreateRequiresConnectivity => {
                write!(f, "Creating lists or items requires a connection")
            }
            PendingError::NotInitialized => {
                write!(f, "Sync service has no signed-in user. Call initialize first.")
            }
            PendingError::NotFound(id) => write!(f, "No such row: {}", id),
            PendingError::Store(e) => write!(f, "{}", e),
            PendingError::Remote(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PendingError {}

impl From<StoreError> for PendingError {
    fn from(e: StoreError) -> Self {
        PendingError::Store(e)
    }
}

impl From<RemoteError> for PendingError {
    fn from(e: RemoteError) -> Self {
        PendingError::Remote(e)
    }
}

/// Write-side entry point for user mutations.
///
/// Reads are plain [`MirrorStore`] queries and never pass through here;
/// they cannot fail due to sync state.
pub struct PendingTracker<R> {
    store: MirrorStore,
    remote: Arc<R>,
    connectivity: Connectivity,
    user_id: Uuid,
}

impl<R: RemoteStore> PendingTracker<R> {
    pub fn new(store: MirrorStore, remote: Arc<R>, connectivity: Connectivity, user_id: Uuid) -> Self {
        Self {
            store,
            remote,
            connectivity,
            user_id,
        }
    }

    async fn active_item(&self, id: Uuid) -> Result<Item, PendingError> {
        match self.store.get_item(id).await? {
            Some(item) if !item.is_deleted() => Ok(item),
            _ => Err(PendingError::NotFound(id)),
        }
    }

    async fn active_list(&self, id: Uuid) -> Result<List, PendingError> {
        match self.store.get_list(id).await? {
            Some(list) if !list.is_deleted() => Ok(list),
            _ => Err(PendingError::NotFound(id)),
        }
    }

    // --- offline-capable mutations ---------------------------------------

    /// Flips an item's checked state. Works offline.
    pub async fn toggle_item(&self, id: Uuid) -> Result<Item, PendingError> {
        let mut item = self.active_item(id).await?;
        item.checked = !item.checked;
        item.updated_at = Utc::now();
        self.store.upsert_item(&item, true).await?;
        Ok(item)
    }

    /// Edits an item's text. Works offline.
    ///
    /// A new text colliding case-insensitively with another active item
    /// in the same list is silently ignored and the unchanged item is
    /// returned, matching the server's duplicate handling.
    pub async fn edit_item_text(&self, id: Uuid, text: &str) -> Result<Item, PendingError> {
        let mut item = self.active_item(id).await?;
        if let Some(existing) = self.store.find_item_by_text(item.list_id, text).await? {
            if existing.id != item.id {
                return Ok(item);
            }
        }
        item.text = text.trim().to_string();
        item.updated_at = Utc::now();
        self.store.upsert_item(&item, true).await?;
        Ok(item)
    }

    /// Sets or clears an item's quantity. Works offline.
    pub async fn set_item_quantity(
        &self,
        id: Uuid,
        quantity: Option<i64>,
    ) -> Result<Item, PendingError> {
        let mut item = self.active_item(id).await?;
        item.quantity = quantity;
        item.updated_at = Utc::now();
        self.store.upsert_item(&item, true).await?;
        Ok(item)
    }

    /// Soft-deletes an item. Works offline; the tombstone syncs like
    /// any other update.
    pub async fn delete_item(&self, id: Uuid) -> Result<Item, PendingError> {
        let mut item = self.active_item(id).await?;
        let now = Utc::now();
        item.deleted_at = Some(now);
        item.updated_at = now;
        self.store.upsert_item(&item, true).await?;
        Ok(item)
    }

    /// Renames a list. Works offline.
    pub async fn rename_list(&self, id: Uuid, title: &str) -> Result<List, PendingError> {
        let mut list = self.active_list(id).await?;
        list.title = title.trim().to_string();
        list.updated_at = Utc::now();
        self.store.upsert_list(&list, true).await?;
        Ok(list)
    }

    /// Soft-deletes a list. Works offline.
    pub async fn delete_list(&self, id: Uuid) -> Result<List, PendingError> {
        let mut list = self.active_list(id).await?;
        let now = Utc::now();
        list.deleted_at = Some(now);
        list.updated_at = now;
        self.store.upsert_list(&list, true).await?;
        Ok(list)
    }

    /// Records the user's list ordering. Works offline; positions stay
    /// local until the next push flushes them through the idempotent
    /// reorder endpoint.
    pub async fn reorder_lists(&self, positions: &[(Uuid, i64)]) -> Result<(), PendingError> {
        let now = Utc::now();
        for &(list_id, position) in positions {
            let mut settings = match self.store.settings_for(self.user_id, list_id).await? {
                Some(s) => s,
                None => UserListSettings {
                    id: Uuid::new_v4(),
                    user_id: self.user_id,
                    list_id,
                    position,
                    created_at: now,
                    updated_at: now,
                },
            };
            settings.position = position;
            settings.updated_at = now;
            self.store.upsert_settings(&settings, true).await?;
        }
        Ok(())
    }

    // --- connectivity-gated creation -------------------------------------

    /// Creates a list server-side. Rejected immediately while offline;
    /// no queue entry is created.
    pub async fn create_list(
        &self,
        title: &str,
        category: ListCategory,
    ) -> Result<List, PendingError> {
        if !self.connectivity.is_online() {
            return Err(PendingError::CreateRequiresConnectivity);
        }
        let list = self
            .remote
            .create_list(&CreateList {
                title: title.trim().to_string(),
                category,
            })
            .await?;
        self.store.upsert_list(&list, false).await?;
        Ok(list)
    }

    /// Creates an item server-side. Rejected immediately while offline.
    ///
    /// Returns `Ok(None)` when the server rejects the text as a
    /// duplicate; per the duplicate-handling contract that is a silent
    /// no-op, not an error.
    pub async fn create_item(
        &self,
        list_id: Uuid,
        text: &str,
        quantity: Option<i64>,
    ) -> Result<Option<Item>, PendingError> {
        if !self.connectivity.is_online() {
            return Err(PendingError::CreateRequiresConnectivity);
        }
        let created = self
            .remote
            .create_item(&CreateItem {
                list_id,
                text: text.trim().to_string(),
                quantity,
            })
            .await?;
        if let Some(item) = &created {
            self.store.upsert_item(item, false).await?;
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::sync::testutil::FakeRemote;
    use tempfile::tempdir;

    struct Fixture {
        _dir: tempfile::TempDir,
        store: MirrorStore,
        remote: Arc<FakeRemote>,
        connectivity: Connectivity,
        tracker: PendingTracker<FakeRemote>,
    }

    async fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let pool = init_db(&dir.path().join("mirror.db")).await.unwrap();
        let store = MirrorStore::new(pool);
        let remote = Arc::new(FakeRemote::new());
        let connectivity = Connectivity::new(true);
        let tracker = PendingTracker::new(
            store.clone(),
            remote.clone(),
            connectivity.clone(),
            remote.user_id,
        );
        Fixture {
            _dir: dir,
            store,
            remote,
            connectivity,
            tracker,
        }
    }

    async fn seeded_item(f: &Fixture, text: &str) -> Item {
        let list = f
            .tracker
            .create_list("Groceries", ListCategory::Shopping)
            .await
            .unwrap();
        f.tracker
            .create_item(list.id, text, None)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_toggle_works_offline_and_sets_pending() {
        let f = fixture().await;
        let item = seeded_item(&f, "Milk").await;

        f.connectivity.set_online(false);
        let toggled = f.tracker.toggle_item(item.id).await.unwrap();

        assert!(toggled.checked);
        assert!(toggled.updated_at > item.updated_at);
        assert_eq!(f.store.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_offline_create_rejected_with_no_side_effects() {
        let f = fixture().await;
        let list = f
            .tracker
            .create_list("Groceries", ListCategory::Shopping)
            .await
            .unwrap();

        f.connectivity.set_online(false);
        let err = f.tracker.create_item(list.id, "Milk", None).await;
        assert!(matches!(
            err,
            Err(PendingError::CreateRequiresConnectivity)
        ));
        let err = f.tracker.create_list("More", ListCategory::Checklist).await;
        assert!(matches!(
            err,
            Err(PendingError::CreateRequiresConnectivity)
        ));

        // neither the mirror nor the pending state changed
        assert!(f.store.items_for_list(list.id, true).await.unwrap().is_empty());
        assert_eq!(f.store.lists(true).await.unwrap().len(), 1);
        assert_eq!(f.store.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_create_is_silent_no_op() {
        let f = fixture().await;
        let item = seeded_item(&f, "Milk").await;

        let dup = f
            .tracker
            .create_item(item.list_id, "  MILK ", None)
            .await
            .unwrap();
        assert!(dup.is_none());
        assert_eq!(
            f.store.items_for_list(item.list_id, true).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_edit_to_duplicate_text_is_ignored() {
        let f = fixture().await;
        let milk = seeded_item(&f, "Milk").await;
        let eggs = f
            .tracker
            .create_item(milk.list_id, "Eggs", None)
            .await
            .unwrap()
            .unwrap();

        let unchanged = f.tracker.edit_item_text(eggs.id, "milk").await.unwrap();
        assert_eq!(unchanged.text, "Eggs");
        assert_eq!(f.store.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_sets_tombstone_not_removal() {
        let f = fixture().await;
        let item = seeded_item(&f, "Milk").await;

        f.connectivity.set_online(false);
        f.tracker.delete_item(item.id).await.unwrap();

        let row = f.store.get_item(item.id).await.unwrap().unwrap();
        assert!(row.is_deleted());
        assert!(f.store.items_for_list(item.list_id, false).await.unwrap().is_empty());
        assert_eq!(f.store.pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mutating_deleted_item_is_not_found() {
        let f = fixture().await;
        let item = seeded_item(&f, "Milk").await;
        f.tracker.delete_item(item.id).await.unwrap();

        assert!(matches!(
            f.tracker.toggle_item(item.id).await,
            Err(PendingError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_offline_reorder_is_local_until_push() {
        let f = fixture().await;
        let a = f
            .tracker
            .create_list("Groceries", ListCategory::Shopping)
            .await
            .unwrap();
        let b = f
            .tracker
            .create_list("Chores", ListCategory::Checklist)
            .await
            .unwrap();

        f.connectivity.set_online(false);
        f.tracker
            .reorder_lists(&[(b.id, 0), (a.id, 1)])
            .await
            .unwrap();

        assert_eq!(f.store.pending_count().await.unwrap(), 2);
        let ordered = f.store.settings_for_user(f.remote.user_id).await.unwrap();
        assert_eq!(ordered[0].list_id, b.id);
        assert_eq!(ordered[1].list_id, a.id);
        // nothing reached the server yet
        assert!(f.remote.reorders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rename_list_offline() {
        let f = fixture().await;
        let list = f
            .tracker
            .create_list("Groceries", ListCategory::Shopping)
            .await
            .unwrap();

        f.connectivity.set_online(false);
        let renamed = f.tracker.rename_list(list.id, "Weekend shop").await.unwrap();
        assert_eq!(renamed.title, "Weekend shop");
        assert!(renamed.updated_at > list.updated_at);
        assert_eq!(f.store.pending_count().await.unwrap(), 1);
    }
}
