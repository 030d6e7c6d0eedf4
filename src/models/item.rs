//! List items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Syncable;

/// A single entry in a list.
///
/// The server enforces that no two active (non-deleted) items under the
/// same list have case-insensitively equal text; the client treats a
/// rejected duplicate as a silent no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub list_id: Uuid,
    pub text: String,
    pub checked: bool,
    /// Optional count, e.g. "3" for three cartons of milk.
    pub quantity: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Item {
    /// Case-normalized text, used for duplicate detection.
    pub fn normalized_text(&self) -> String {
        self.text.trim().to_lowercase()
    }

    /// True if `other` would collide with this item's text.
    pub fn text_matches(&self, other: &str) -> bool {
        self.normalized_text() == other.trim().to_lowercase()
    }
}

impl Syncable for Item {
    fn entity_id(&self) -> Uuid {
        self.id
    }

    fn modified_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }
}
