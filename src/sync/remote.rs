//! Remote store interface: wire types and the HTTP implementation.
//!
//! The backend is an opaque collaborator reached over JSON/HTTP with
//! bearer auth. Field names use camelCase on the wire. The realtime
//! change feed is the same host upgraded to a websocket (see
//! [`HttpRemote::feed_url`] and the realtime listener).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Item, List, ListCategory, ListShare, UserListSettings};

/// Errors from talking to the remote store.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Sync not configured. Add server_url and access_token to config.")]
    NotConfigured,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Server returned status {0}")]
    Status(u16),

    #[error("Malformed server response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            RemoteError::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            RemoteError::Status(status.as_u16())
        } else {
            RemoteError::Connection(e.to_string())
        }
    }
}

/// Entities changed since a watermark, or a complete snapshot.
///
/// `as_of` is the server timestamp to persist as the new watermark;
/// the client clock never feeds the watermark.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    #[serde(default)]
    pub lists: Vec<List>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub shares: Vec<ListShare>,
    #[serde(default)]
    pub settings: Vec<UserListSettings>,
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
            && self.items.is_empty()
            && self.shares.is_empty()
            && self.settings.is_empty()
    }
}

/// Pending rows submitted to the batch-upsert-with-LWW endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushBatch {
    pub lists: Vec<List>,
    pub items: Vec<Item>,
}

impl PushBatch {
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty() && self.items.is_empty()
    }
}

/// Per-row outcome of a batch upsert.
///
/// `accepted: false` means the server held strictly newer data and
/// `entity` is its authoritative copy. That is the expected LWW
/// outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushOutcome<T> {
    pub accepted: bool,
    pub entity: T,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushResponse {
    #[serde(default)]
    pub lists: Vec<PushOutcome<List>>,
    #[serde(default)]
    pub items: Vec<PushOutcome<Item>>,
    /// Server time of the upsert. The client does not advance the
    /// watermark from it: a push `asOf` can postdate other clients'
    /// changes the client has not pulled yet, and a pull follows in the
    /// same cycle anyway. Only pull and snapshot responses move the
    /// watermark.
    #[serde(default)]
    pub as_of: Option<DateTime<Utc>>,
}

/// One (list, position) pair for the idempotent reorder submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderEntry {
    pub list_id: Uuid,
    pub position: i64,
}

/// Request body for the list-creation RPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateList {
    pub title: String,
    pub category: ListCategory,
}

/// Request body for the item-creation RPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItem {
    pub list_id: Uuid,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

/// Row-level change kinds on the realtime feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Insert,
    Update,
    Delete,
}

/// Entity payload of a realtime event, tagged by table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "table", content = "entity", rename_all = "lowercase")]
pub enum EventEntity {
    List(List),
    Item(Item),
}

/// One server-pushed row change, scoped to the caller's visibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub event_type: EventType,
    #[serde(flatten)]
    pub entity: EventEntity,
}

/// The remote store's RPC surface.
///
/// A trait so the orchestrator and tracker can be exercised against an
/// in-memory fake; [`HttpRemote`] is the production implementation.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Batch upsert with LWW. Each row is accepted only if its
    /// `updatedAt` is strictly newer than the stored one.
    async fn push(&self, batch: &PushBatch) -> Result<PushResponse, RemoteError>;

    /// All authorized entities modified strictly after `since`.
    async fn changes_since(&self, since: DateTime<Utc>) -> Result<ChangeSet, RemoteError>;

    /// The complete authorized dataset, for full-sync replacement.
    async fn snapshot(&self) -> Result<ChangeSet, RemoteError>;

    /// Idempotent per-user reorder; last submission wins.
    async fn submit_reorder(&self, entries: &[ReorderEntry]) -> Result<(), RemoteError>;

    /// Creates a list server-side; the server assigns identity.
    async fn create_list(&self, req: &CreateList) -> Result<List, RemoteError>;

    /// Creates an item server-side. A duplicate-text rejection comes
    /// back as `Ok(None)` and is a silent no-op for the caller.
    async fn create_item(&self, req: &CreateItem) -> Result<Option<Item>, RemoteError>;
}

/// HTTP client for the remote store.
pub struct HttpRemote {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl HttpRemote {
    pub fn new(base_url: String, access_token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Websocket URL for the realtime change feed, with the http(s)
    /// scheme converted to ws(s).
    pub fn feed_url(&self) -> String {
        let base = if self.base_url.starts_with("http://") {
            self.base_url.replace("http://", "ws://")
        } else if self.base_url.starts_with("https://") {
            self.base_url.replace("https://", "wss://")
        } else if !self.base_url.starts_with("ws://") && !self.base_url.starts_with("wss://") {
            format!("ws://{}", self.base_url)
        } else {
            self.base_url.clone()
        };
        format!("{}/sync/feed?token={}", base, self.access_token)
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, RemoteError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }
        resp.json::<T>()
            .await
            .map_err(|e| RemoteError::Malformed(e.to_string()))
    }
}

impl RemoteStore for HttpRemote {
    async fn push(&self, batch: &PushBatch) -> Result<PushResponse, RemoteError> {
        let resp = self
            .client
            .post(self.url("/sync/push"))
            .bearer_auth(&self.access_token)
            .json(batch)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn changes_since(&self, since: DateTime<Utc>) -> Result<ChangeSet, RemoteError> {
        let resp = self
            .client
            .get(self.url("/sync/changes"))
            .bearer_auth(&self.access_token)
            .query(&[("since", since.to_rfc3339())])
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn snapshot(&self) -> Result<ChangeSet, RemoteError> {
        let resp = self
            .client
            .get(self.url("/sync/snapshot"))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn submit_reorder(&self, entries: &[ReorderEntry]) -> Result<(), RemoteError> {
        let resp = self
            .client
            .post(self.url("/lists/reorder"))
            .bearer_auth(&self.access_token)
            .json(entries)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }
        Ok(())
    }

    async fn create_list(&self, req: &CreateList) -> Result<List, RemoteError> {
        let resp = self
            .client
            .post(self.url("/lists"))
            .bearer_auth(&self.access_token)
            .json(req)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn create_item(&self, req: &CreateItem) -> Result<Option<Item>, RemoteError> {
        let resp = self
            .client
            .post(self.url(&format!("/lists/{}/items", req.list_id)))
            .bearer_auth(&self.access_token)
            .json(req)
            .send()
            .await?;
        // Duplicate text: the server's uniqueness constraint answers 409
        // and the client treats it as a silent no-op.
        if resp.status().as_u16() == 409 {
            return Ok(None);
        }
        Self::decode::<Item>(resp).await.map(Some)
    }
}
