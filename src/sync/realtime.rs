//! Realtime change listener.
//!
//! Subscribes to the server's websocket change feed and merges each
//! row-level event through the same conflict resolver the bulk pull
//! uses. This path interleaves freely with orchestrator cycles; the
//! idempotent timestamp-driven resolver makes the interleaving safe,
//! so no sequencing against the orchestrator is attempted.

use futures::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::db::{MirrorStore, StoreError};
use crate::sync::notifier::{ChangeNotifier, SyncEvent};
use crate::sync::remote::{ChangeEvent, EventEntity};
use crate::sync::resolver::resolve;

/// Errors that end a realtime subscription.
#[derive(Debug)]
pub enum RealtimeError {
    /// Failed to connect to the feed.
    Connection(String),
    /// WebSocket error mid-stream.
    WebSocket(String),
    /// An event could not be decoded; the subscription ends rather
    /// than risk applying a partial event. The next sync cycle catches
    /// up whatever was missed.
    Malformed(String),
    /// Local store failure.
    Store(StoreError),
}

impl std::fmt::Display for RealtimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RealtimeError::Connection(e) => write!(f, "Connection error: {}", e),
            RealtimeError::WebSocket(e) => write!(f, "WebSocket error: {}", e),
            RealtimeError::Malformed(e) => write!(f, "Malformed change event: {}", e),
            RealtimeError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RealtimeError {}

impl From<StoreError> for RealtimeError {
    fn from(e: StoreError) -> Self {
        RealtimeError::Store(e)
    }
}

/// Applies one feed event to the mirror. Returns true if the remote
/// copy won and actually changed the stored row, in which case a
/// `RemoteChange` notification was published.
///
/// Insert, update, and delete events all take the same path: a delete
/// is just an update whose entity carries a tombstone.
pub async fn apply_event(
    store: &MirrorStore,
    notifier: &ChangeNotifier,
    event: ChangeEvent,
) -> Result<bool, StoreError> {
    let merged = match event.entity {
        EventEntity::List(remote) => {
            let local = store.get_list(remote.id).await?;
            let changed = local.as_ref() != Some(&remote);
            let resolution = resolve(local, remote);
            if resolution.remote_won && changed {
                store.upsert_list(&resolution.winner, false).await?;
                true
            } else {
                false
            }
        }
        EventEntity::Item(remote) => {
            let local = store.get_item(remote.id).await?;
            let changed = local.as_ref() != Some(&remote);
            let resolution = resolve(local, remote);
            if resolution.remote_won && changed {
                store.upsert_item(&resolution.winner, false).await?;
                true
            } else {
                false
            }
        }
    };

    if merged {
        debug!(event_type = ?event.event_type, "merged realtime change");
        notifier.publish(SyncEvent::RemoteChange);
    }
    Ok(merged)
}

/// Websocket subscriber for the realtime change feed.
pub struct RealtimeListener {
    feed_url: String,
    store: MirrorStore,
    notifier: ChangeNotifier,
}

impl RealtimeListener {
    pub fn new(feed_url: String, store: MirrorStore, notifier: ChangeNotifier) -> Self {
        Self {
            feed_url,
            store,
            notifier,
        }
    }

    /// Runs the subscription until the server closes it or an error
    /// occurs. Reconnection policy is the caller's; missed events are
    /// recovered by the next orchestrator pull.
    pub async fn run(&self) -> Result<(), RealtimeError> {
        let (ws_stream, _) = connect_async(&self.feed_url)
            .await
            .map_err(|e| RealtimeError::Connection(e.to_string()))?;
        info!("realtime feed connected");

        let (mut sender, mut receiver) = ws_stream.split();

        loop {
            match receiver.next().await {
                Some(Ok(Message::Text(text))) => {
                    let event: ChangeEvent = serde_json::from_str(&text)
                        .map_err(|e| RealtimeError::Malformed(e.to_string()))?;
                    apply_event(&self.store, &self.notifier, event).await?;
                }
                Some(Ok(Message::Ping(data))) => {
                    sender
                        .send(Message::Pong(data))
                        .await
                        .map_err(|e| RealtimeError::WebSocket(e.to_string()))?;
                }
                Some(Ok(Message::Close(_))) => {
                    info!("realtime feed closed by server");
                    break;
                }
                Some(Ok(other)) => {
                    warn!(?other, "ignoring unexpected feed frame");
                }
                Some(Err(e)) => {
                    return Err(RealtimeError::WebSocket(e.to_string()));
                }
                None => break,
            }
        }

        let _ = sender.send(Message::Close(None)).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::models::{Item, List, ListCategory, Syncable};
    use crate::sync::remote::EventType;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;
    use uuid::Uuid;

    async fn test_store() -> (tempfile::TempDir, MirrorStore) {
        let dir = tempdir().unwrap();
        let pool = init_db(&dir.path().join("mirror.db")).await.unwrap();
        (dir, MirrorStore::new(pool))
    }

    fn list(title: &str) -> List {
        List {
            id: Uuid::new_v4(),
            title: title.to_string(),
            category: ListCategory::Shopping,
            owner_id: Uuid::new_v4(),
            shared: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn item(list_id: Uuid, text: &str) -> Item {
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
    async fn test_insert_event_adds_row_and_notifies() {
        let (_dir, store) = test_store().await;
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe();

        let l = list("Groceries");
        let merged = apply_event(
            &store,
            &notifier,
            ChangeEvent {
                event_type: EventType::Insert,
                entity: EventEntity::List(l.clone()),
            },
        )
        .await
        .unwrap();

        assert!(merged);
        assert!(store.get_list(l.id).await.unwrap().is_some());
        assert!(matches!(rx.recv().await.unwrap(), SyncEvent::RemoteChange));
    }

    #[tokio::test]
    async fn test_stale_event_loses_to_newer_local_row() {
        let (_dir, store) = test_store().await;
        let notifier = ChangeNotifier::new();

        let l = list("Groceries");
        let mut i = item(l.id, "Milk");
        i.checked = true;
        store.upsert_item(&i, true).await.unwrap();

        let mut stale = i.clone();
        stale.checked = false;
        stale.updated_at = i.updated_at - Duration::seconds(30);

        let merged = apply_event(
            &store,
            &notifier,
            ChangeEvent {
                event_type: EventType::Update,
                entity: EventEntity::Item(stale),
            },
        )
        .await
        .unwrap();

        assert!(!merged);
        let kept = store.get_item(i.id).await.unwrap().unwrap();
        assert!(kept.checked);
        // the pending local edit is still queued for push
        assert_eq!(store.pending_items().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_event_applies_tombstone() {
        let (_dir, store) = test_store().await;
        let notifier = ChangeNotifier::new();

        let l = list("Chores");
        let i = item(l.id, "Vacuum");
        store.upsert_item(&i, false).await.unwrap();

        let mut deleted = i.clone();
        deleted.deleted_at = Some(Utc::now());
        deleted.updated_at = i.updated_at + Duration::seconds(5);

        let merged = apply_event(
            &store,
            &notifier,
            ChangeEvent {
                event_type: EventType::Delete,
                entity: EventEntity::Item(deleted),
            },
        )
        .await
        .unwrap();

        assert!(merged);
        let row = store.get_item(i.id).await.unwrap().unwrap();
        assert!(row.is_deleted());
        assert!(store.items_for_list(l.id, false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reapplying_event_is_a_no_op() {
        let (_dir, store) = test_store().await;
        let notifier = ChangeNotifier::new();

        let l = list("Groceries");
        let event = ChangeEvent {
            event_type: EventType::Insert,
            entity: EventEntity::List(l.clone()),
        };

        assert!(apply_event(&store, &notifier, event.clone()).await.unwrap());
        assert!(!apply_event(&store, &notifier, event).await.unwrap());
        assert_eq!(store.lists(true).await.unwrap().len(), 1);
    }
}
