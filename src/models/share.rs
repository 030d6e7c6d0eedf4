//! Share grants giving the second user visibility into a list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Grants `user_id` visibility into `list_id`. Unique per (list, user).
///
/// Shares are created and deleted server-side only; the local copy is a
/// read-only mirror and carries no pending flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListShare {
    pub id: Uuid,
    pub list_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}
