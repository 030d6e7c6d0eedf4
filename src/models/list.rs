//! Lists: the top-level grouping entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::Syncable;

/// Category tag for a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListCategory {
    /// Items are consumable; checking one means "purchased".
    Shopping,
    /// Items are tasks; checking one means "done".
    Checklist,
}

impl ListCategory {
    /// Database/wire string for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ListCategory::Shopping => "shopping",
            ListCategory::Checklist => "checklist",
        }
    }

    /// Parses a stored category string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "shopping" => Some(ListCategory::Shopping),
            "checklist" => Some(ListCategory::Checklist),
            _ => None,
        }
    }
}

impl fmt::Display for ListCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A list owned by one user and optionally shared with the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: Uuid,
    pub title: String,
    pub category: ListCategory,
    /// User that created the list; share grants give the second user
    /// visibility.
    pub owner_id: Uuid,
    pub shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete tombstone; a deleted list syncs like any other update.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Syncable for List {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for cat in [ListCategory::Shopping, ListCategory::Checklist] {
            assert_eq!(ListCategory::parse(cat.as_str()), Some(cat));
        }
        assert_eq!(ListCategory::parse("groceries"), None);
    }

    #[test]
    fn test_category_serde_lowercase() {
        let json = serde_json::to_string(&ListCategory::Shopping).unwrap();
        assert_eq!(json, "\"shopping\"");
    }
}
