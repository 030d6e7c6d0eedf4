//! Last-Write-Wins conflict resolution.
//!
//! There is exactly one conflict algorithm in the system, used by the
//! bulk pull path and the realtime per-event path alike: the row with
//! the strictly greater modification timestamp wins in full. No field
//! merging, no causal ordering. The server is the tie-break authority,
//! so equal timestamps resolve to the remote copy, and the first sight
//! of a new entity always adopts the remote copy.

use crate::models::Syncable;

/// Outcome of resolving a local copy against a remote copy.
#[derive(Debug, Clone)]
pub struct Resolution<T> {
    /// The surviving whole row.
    pub winner: T,
    /// True if the remote copy won (the mirror needs an upsert).
    pub remote_won: bool,
}

/// Decides between a local and a remote version of the same row.
///
/// Re-applying an already-applied or older remote update resolves the
/// same way every time, so interleaved pull and realtime application
/// cannot corrupt state; at worst it repeats a harmless upsert.
pub fn resolve<T: Syncable>(local: Option<T>, remote: T) -> Resolution<T> {
    match local {
        Some(local) if local.modified_at() > remote.modified_at() => Resolution {
            winner: local,
            remote_won: false,
        },
        _ => Resolution {
            winner: remote,
            remote_won: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use uuid::Uuid;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: Uuid,
        label: &'static str,
        updated_at: DateTime<Utc>,
    }

    impl Syncable for Row {
        fn entity_id(&self) -> Uuid {
            self.id
        }
        fn modified_at(&self) -> DateTime<Utc> {
            self.updated_at
        }
        fn deleted_at(&self) -> Option<DateTime<Utc>> {
            None
        }
    }

    fn row(label: &'static str, at: DateTime<Utc>) -> Row {
        Row {
            id: Uuid::nil(),
            label,
            updated_at: at,
        }
    }

    #[test]
    fn test_newer_remote_wins() {
        let t = Utc::now();
        let r = resolve(Some(row("local", t)), row("remote", t + Duration::seconds(5)));
        assert!(r.remote_won);
        assert_eq!(r.winner.label, "remote");
    }

    #[test]
    fn test_newer_local_wins() {
        let t = Utc::now();
        let r = resolve(Some(row("local", t + Duration::seconds(5))), row("remote", t));
        assert!(!r.remote_won);
        assert_eq!(r.winner.label, "local");
    }

    #[test]
    fn test_equal_timestamps_go_to_remote() {
        let t = Utc::now();
        let r = resolve(Some(row("local", t)), row("remote", t));
        assert!(r.remote_won);
        assert_eq!(r.winner.label, "remote");
    }

    #[test]
    fn test_absent_local_adopts_remote() {
        let r = resolve(None, row("remote", Utc::now()));
        assert!(r.remote_won);
        assert_eq!(r.winner.label, "remote");
    }
}
