//! The local mirror store: a client-resident cache of server rows.
//!
//! The mirror exclusively owns physical storage of all entity rows, the
//! per-row pending flag, and the persisted sync watermark. It has no
//! network awareness. Rows are never physically deleted here except by
//! full-sync replacement ([`MirrorStore::replace_all`]) or an explicit
//! reset ([`MirrorStore::clear_all`]); soft-deleted rows stay queryable
//! so deletions propagate through sync like any other update.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{Item, List, ListCategory, ListShare, UserListSettings};

const WATERMARK_KEY: &str = "watermark";

/// Errors from the local mirror store.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying database error.
    Database(sqlx::Error),
    /// A stored value could not be interpreted.
    Corrupt(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(e) => write!(f, "Database error: {}", e),
            StoreError::Corrupt(e) => write!(f, "Corrupt local data: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}

// Row types for database queries
#[derive(sqlx::FromRow)]
struct ListRow {
    id: String,
    title: String,
    category: String,
    owner_id: String,
    shared: bool,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: String,
    list_id: String,
    text: String,
    checked: bool,
    quantity: Option<i64>,
    created_at: String,
    updated_at: String,
    deleted_at: Option<String>,
}

#[derive(sqlx::FromRow)]
struct ShareRow {
    id: String,
    list_id: String,
    user_id: String,
    created_at: String,
}

#[derive(sqlx::FromRow)]
struct SettingsRow {
    id: String,
    user_id: String,
    list_id: String,
    position: i64,
    created_at: String,
    updated_at: String,
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp '{}': {}", s, e)))
}

fn parse_opt_ts(s: &Option<String>) -> Result<Option<DateTime<Utc>>, StoreError> {
    s.as_deref().map(parse_ts).transpose()
}

fn parse_id(s: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(s).map_err(|e| StoreError::Corrupt(format!("bad uuid '{}': {}", s, e)))
}

impl ListRow {
    fn hydrate(self) -> Result<List, StoreError> {
        Ok(List {
            id: parse_id(&self.id)?,
            category: ListCategory::parse(&self.category)
                .ok_or_else(|| StoreError::Corrupt(format!("bad category '{}'", self.category)))?,
            owner_id: parse_id(&self.owner_id)?,
            shared: self.shared,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
            deleted_at: parse_opt_ts(&self.deleted_at)?,
            title: self.title,
        })
    }
}

impl ItemRow {
    fn hydrate(self) -> Result<Item, StoreError> {
        Ok(Item {
            id: parse_id(&self.id)?,
            list_id: parse_id(&self.list_id)?,
            checked: self.checked,
            quantity: self.quantity,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
            deleted_at: parse_opt_ts(&self.deleted_at)?,
            text: self.text,
        })
    }
}

impl ShareRow {
    fn hydrate(self) -> Result<ListShare, StoreError> {
        Ok(ListShare {
            id: parse_id(&self.id)?,
            list_id: parse_id(&self.list_id)?,
            user_id: parse_id(&self.user_id)?,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

impl SettingsRow {
    fn hydrate(self) -> Result<UserListSettings, StoreError> {
        Ok(UserListSettings {
            id: parse_id(&self.id)?,
            user_id: parse_id(&self.user_id)?,
            list_id: parse_id(&self.list_id)?,
            position: self.position,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

/// Client-local persistent cache of server entities.
#[derive(Clone)]
pub struct MirrorStore {
    pool: SqlitePool,
}

impl MirrorStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // --- reads -----------------------------------------------------------

    pub async fn get_list(&self, id: Uuid) -> Result<Option<List>, StoreError> {
        let row: Option<ListRow> = sqlx::query_as("SELECT * FROM lists WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(ListRow::hydrate).transpose()
    }

    pub async fn get_item(&self, id: Uuid) -> Result<Option<Item>, StoreError> {
        let row: Option<ItemRow> = sqlx::query_as("SELECT * FROM items WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(ItemRow::hydrate).transpose()
    }

    /// All lists, soft-deleted ones included only on request.
    pub async fn lists(&self, include_deleted: bool) -> Result<Vec<List>, StoreError> {
        let sql = if include_deleted {
            "SELECT * FROM lists ORDER BY title"
        } else {
            "SELECT * FROM lists WHERE deleted_at IS NULL ORDER BY title"
        };
        let rows: Vec<ListRow> = sqlx::query_as(sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(ListRow::hydrate).collect()
    }

    pub async fn items_for_list(
        &self,
        list_id: Uuid,
        include_deleted: bool,
    ) -> Result<Vec<Item>, StoreError> {
        let sql = if include_deleted {
            "SELECT * FROM items WHERE list_id = ? ORDER BY created_at"
        } else {
            "SELECT * FROM items WHERE list_id = ? AND deleted_at IS NULL ORDER BY created_at"
        };
        let rows: Vec<ItemRow> = sqlx::query_as(sql)
            .bind(list_id.to_string())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(ItemRow::hydrate).collect()
    }

    /// An active (non-deleted) item in the list whose text matches
    /// case-insensitively, if any. Used for the duplicate pre-check on
    /// edits.
    pub async fn find_item_by_text(
        &self,
        list_id: Uuid,
        text: &str,
    ) -> Result<Option<Item>, StoreError> {
        let items = self.items_for_list(list_id, false).await?;
        Ok(items.into_iter().find(|i| i.text_matches(text)))
    }

    pub async fn shares_for_list(&self, list_id: Uuid) -> Result<Vec<ListShare>, StoreError> {
        let rows: Vec<ShareRow> = sqlx::query_as("SELECT * FROM list_shares WHERE list_id = ?")
            .bind(list_id.to_string())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(ShareRow::hydrate).collect()
    }

    /// A user's list ordering rows, by position.
    pub async fn settings_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<UserListSettings>, StoreError> {
        let rows: Vec<SettingsRow> =
            sqlx::query_as("SELECT * FROM user_list_settings WHERE user_id = ? ORDER BY position")
                .bind(user_id.to_string())
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(SettingsRow::hydrate).collect()
    }

    pub async fn settings_for(
        &self,
        user_id: Uuid,
        list_id: Uuid,
    ) -> Result<Option<UserListSettings>, StoreError> {
        let row: Option<SettingsRow> =
            sqlx::query_as("SELECT * FROM user_list_settings WHERE user_id = ? AND list_id = ?")
                .bind(user_id.to_string())
                .bind(list_id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(SettingsRow::hydrate).transpose()
    }

    // --- upserts ---------------------------------------------------------

    /// Idempotent list upsert. Writing an unchanged row is a no-op in
    /// every observable respect.
    pub async fn upsert_list(&self, list: &List, pending: bool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO lists (id, title, category, owner_id, shared, created_at, updated_at, deleted_at, pending)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                category = excluded.category,
                owner_id = excluded.owner_id,
                shared = excluded.shared,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                deleted_at = excluded.deleted_at,
                pending = excluded.pending
            "#,
        )
        .bind(list.id.to_string())
        .bind(&list.title)
        .bind(list.category.as_str())
        .bind(list.owner_id.to_string())
        .bind(list.shared)
        .bind(list.created_at.to_rfc3339())
        .bind(list.updated_at.to_rfc3339())
        .bind(list.deleted_at.map(|t| t.to_rfc3339()))
        .bind(pending)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_item(&self, item: &Item, pending: bool) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO items (id, list_id, text, checked, quantity, created_at, updated_at, deleted_at, pending)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                list_id = excluded.list_id,
                text = excluded.text,
                checked = excluded.checked,
                quantity = excluded.quantity,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                deleted_at = excluded.deleted_at,
                pending = excluded.pending
            "#,
        )
        .bind(item.id.to_string())
        .bind(item.list_id.to_string())
        .bind(&item.text)
        .bind(item.checked)
        .bind(item.quantity)
        .bind(item.created_at.to_rfc3339())
        .bind(item.updated_at.to_rfc3339())
        .bind(item.deleted_at.map(|t| t.to_rfc3339()))
        .bind(pending)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_share(&self, share: &ListShare) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO list_shares (id, list_id, user_id, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                list_id = excluded.list_id,
                user_id = excluded.user_id,
                created_at = excluded.created_at
            "#,
        )
        .bind(share.id.to_string())
        .bind(share.list_id.to_string())
        .bind(share.user_id.to_string())
        .bind(share.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_settings(
        &self,
        settings: &UserListSettings,
        pending: bool,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_list_settings (id, user_id, list_id, position, created_at, updated_at, pending)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                list_id = excluded.list_id,
                position = excluded.position,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                pending = excluded.pending
            "#,
        )
        .bind(settings.id.to_string())
        .bind(settings.user_id.to_string())
        .bind(settings.list_id.to_string())
        .bind(settings.position)
        .bind(settings.created_at.to_rfc3339())
        .bind(settings.updated_at.to_rfc3339())
        .bind(pending)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // --- pending bookkeeping ---------------------------------------------

    pub async fn pending_lists(&self) -> Result<Vec<List>, StoreError> {
        let rows: Vec<ListRow> = sqlx::query_as("SELECT * FROM lists WHERE pending = 1")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(ListRow::hydrate).collect()
    }

    pub async fn pending_items(&self) -> Result<Vec<Item>, StoreError> {
        let rows: Vec<ItemRow> = sqlx::query_as("SELECT * FROM items WHERE pending = 1")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(ItemRow::hydrate).collect()
    }

    pub async fn pending_settings(&self) -> Result<Vec<UserListSettings>, StoreError> {
        let rows: Vec<SettingsRow> =
            sqlx::query_as("SELECT * FROM user_list_settings WHERE pending = 1")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(SettingsRow::hydrate).collect()
    }

    pub async fn clear_pending_list(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE lists SET pending = 0 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn clear_pending_item(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE items SET pending = 0 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn clear_pending_settings(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("UPDATE user_list_settings SET pending = 0 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Number of rows with unsynced local mutations.
    pub async fn pending_count(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT (SELECT COUNT(*) FROM lists WHERE pending = 1)
                 + (SELECT COUNT(*) FROM items WHERE pending = 1)
                 + (SELECT COUNT(*) FROM user_list_settings WHERE pending = 1)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    // --- wholesale replacement -------------------------------------------

    /// Atomically replaces the entire mirror with a server snapshot.
    ///
    /// Runs clear-then-repopulate inside one transaction so concurrent
    /// readers never observe a partially-cleared store. Pending flags do
    /// not survive; the snapshot is authoritative.
    pub async fn replace_all(
        &self,
        lists: &[List],
        items: &[Item],
        shares: &[ListShare],
        settings: &[UserListSettings],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM lists").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM items").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM list_shares")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_list_settings")
            .execute(&mut *tx)
            .await?;

        for list in lists {
            sqlx::query(
                r#"
                INSERT INTO lists (id, title, category, owner_id, shared, created_at, updated_at, deleted_at, pending)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0)
                "#,
            )
            .bind(list.id.to_string())
            .bind(&list.title)
            .bind(list.category.as_str())
            .bind(list.owner_id.to_string())
            .bind(list.shared)
            .bind(list.created_at.to_rfc3339())
            .bind(list.updated_at.to_rfc3339())
            .bind(list.deleted_at.map(|t| t.to_rfc3339()))
            .execute(&mut *tx)
            .await?;
        }

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO items (id, list_id, text, checked, quantity, created_at, updated_at, deleted_at, pending)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0)
                "#,
            )
            .bind(item.id.to_string())
            .bind(item.list_id.to_string())
            .bind(&item.text)
            .bind(item.checked)
            .bind(item.quantity)
            .bind(item.created_at.to_rfc3339())
            .bind(item.updated_at.to_rfc3339())
            .bind(item.deleted_at.map(|t| t.to_rfc3339()))
            .execute(&mut *tx)
            .await?;
        }

        for share in shares {
            sqlx::query(
                "INSERT INTO list_shares (id, list_id, user_id, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(share.id.to_string())
            .bind(share.list_id.to_string())
            .bind(share.user_id.to_string())
            .bind(share.created_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        for s in settings {
            sqlx::query(
                r#"
                INSERT INTO user_list_settings (id, user_id, list_id, position, created_at, updated_at, pending)
                VALUES (?, ?, ?, ?, ?, ?, 0)
                "#,
            )
            .bind(s.id.to_string())
            .bind(s.user_id.to_string())
            .bind(s.list_id.to_string())
            .bind(s.position)
            .bind(s.created_at.to_rfc3339())
            .bind(s.updated_at.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Wipes all mirrored rows and sync bookkeeping. Used only for an
    /// explicit user-requested reset; the next cycle runs a full sync.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM lists").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM items").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM list_shares")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_list_settings")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM sync_meta").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    // --- watermark -------------------------------------------------------

    /// The server timestamp through which the last incremental pull is
    /// known complete. Absent until the first successful sync.
    pub async fn watermark(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM sync_meta WHERE key = ?")
            .bind(WATERMARK_KEY)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|(v,)| parse_ts(&v)).transpose()
    }

    /// Advances the watermark. Monotonic: a value at or below the stored
    /// one is ignored, so a stale response can never roll it back.
    pub async fn set_watermark(&self, ts: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(current) = self.watermark().await? {
            if ts <= current {
                return Ok(());
            }
        }
        sqlx::query(
            "INSERT INTO sync_meta (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(WATERMARK_KEY)
        .bind(ts.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use chrono::Duration;
    use tempfile::tempdir;

    async fn test_store() -> (tempfile::TempDir, MirrorStore) {
        let dir = tempdir().unwrap();
        let pool = init_db(&dir.path().join("mirror.db")).await.unwrap();
        (dir, MirrorStore::new(pool))
    }

    fn sample_list() -> List {
        List {
            id: Uuid::new_v4(),
            title: "Groceries".to_string(),
            category: ListCategory::Shopping,
            owner_id: Uuid::new_v4(),
            shared: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn sample_item(list_id: Uuid, text: &str) -> Item {
        Item {
            id: Uuid::new_v4(),
            list_id,
            text: text.to_string(),
            checked: false,
            quantity: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get_round_trip() {
        let (_dir, store) = test_store().await;
        let list = sample_list();

        store.upsert_list(&list, false).await.unwrap();
        let loaded = store.get_list(list.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Groceries");
        assert_eq!(loaded.category, ListCategory::Shopping);
        // RFC 3339 round trip keeps timestamp ordering intact
        assert_eq!(loaded.updated_at.timestamp_millis(), list.updated_at.timestamp_millis());
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let (_dir, store) = test_store().await;
        let list = sample_list();

        store.upsert_list(&list, false).await.unwrap();
        store.upsert_list(&list, false).await.unwrap();

        let all = store.lists(true).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_soft_deleted_rows_stay_queryable() {
        let (_dir, store) = test_store().await;
        let mut list = sample_list();
        list.deleted_at = Some(Utc::now());

        store.upsert_list(&list, false).await.unwrap();
        assert!(store.lists(false).await.unwrap().is_empty());
        assert_eq!(store.lists(true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pending_bookkeeping() {
        let (_dir, store) = test_store().await;
        let list = sample_list();
        let item = sample_item(list.id, "Milk");

        store.upsert_list(&list, false).await.unwrap();
        store.upsert_item(&item, true).await.unwrap();
        assert_eq!(store.pending_count().await.unwrap(), 1);
        assert_eq!(store.pending_items().await.unwrap().len(), 1);

        store.clear_pending_item(item.id).await.unwrap();
        assert_eq!(store.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_item_by_text_ignores_case_and_deleted() {
        let (_dir, store) = test_store().await;
        let list = sample_list();
        let item = sample_item(list.id, "Olive Oil");
        let mut gone = sample_item(list.id, "Vinegar");
        gone.deleted_at = Some(Utc::now());

        store.upsert_item(&item, false).await.unwrap();
        store.upsert_item(&gone, false).await.unwrap();

        assert!(store
            .find_item_by_text(list.id, " olive oil ")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_item_by_text(list.id, "vinegar")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_replace_all_leaves_exactly_snapshot_rows() {
        let (_dir, store) = test_store().await;
        let stale = sample_list();
        store.upsert_list(&stale, true).await.unwrap();
        store
            .upsert_item(&sample_item(stale.id, "Old row"), true)
            .await
            .unwrap();

        let fresh = sample_list();
        let fresh_item = sample_item(fresh.id, "New row");
        store
            .replace_all(&[fresh.clone()], &[fresh_item], &[], &[])
            .await
            .unwrap();

        let lists = store.lists(true).await.unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].id, fresh.id);
        assert_eq!(store.pending_count().await.unwrap(), 0);
        assert!(store.get_list(stale.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_watermark_is_monotonic() {
        let (_dir, store) = test_store().await;
        assert!(store.watermark().await.unwrap().is_none());

        let t1 = Utc::now();
        let t0 = t1 - Duration::seconds(30);

        store.set_watermark(t1).await.unwrap();
        store.set_watermark(t0).await.unwrap();

        let stored = store.watermark().await.unwrap().unwrap();
        assert_eq!(stored.timestamp_millis(), t1.timestamp_millis());
    }

    #[tokio::test]
    async fn test_clear_all_wipes_watermark() {
        let (_dir, store) = test_store().await;
        store.upsert_list(&sample_list(), false).await.unwrap();
        store.set_watermark(Utc::now()).await.unwrap();

        store.clear_all().await.unwrap();
        assert!(store.lists(true).await.unwrap().is_empty());
        assert!(store.watermark().await.unwrap().is_none());
    }
}
