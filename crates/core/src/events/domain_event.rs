//! Domain event types.

use serde::{Deserialize, Serialize};

use crate::bookmarks::Bookmark;

/// Domain events emitted by the bookmark service after successful mutations.
///
/// Every event is scoped to exactly one owner identity. The runtime adapter
/// translates each event into a push delivery to the live connections
/// registered under that identity, and to no others.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookmarkEvent {
    /// A bookmark was created. Carries the full stored record.
    BookmarkCreated { bookmark: Bookmark },

    /// A bookmark was deleted. Carries only the record id; the owner
    /// identity is kept alongside because the record itself is gone.
    BookmarkDeleted {
        owner_identity: String,
        bookmark_id: String,
    },
}

impl BookmarkEvent {
    /// Creates a BookmarkCreated event.
    pub fn created(bookmark: Bookmark) -> Self {
        Self::BookmarkCreated { bookmark }
    }

    /// Creates a BookmarkDeleted event.
    pub fn deleted(owner_identity: String, bookmark_id: String) -> Self {
        Self::BookmarkDeleted {
            owner_identity,
            bookmark_id,
        }
    }

    /// The owner identity whose broadcast group should receive this event.
    pub fn owner_identity(&self) -> &str {
        match self {
            Self::BookmarkCreated { bookmark } => &bookmark.owner_identity,
            Self::BookmarkDeleted { owner_identity, .. } => owner_identity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_bookmark() -> Bookmark {
        Bookmark {
            id: "bm-1".to_string(),
            owner_identity: "a@x.com".to_string(),
            title: "Docs".to_string(),
            url: "http://x".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn owner_identity_routes_created_by_record_owner() {
        let event = BookmarkEvent::created(sample_bookmark());
        assert_eq!(event.owner_identity(), "a@x.com");
    }

    #[test]
    fn owner_identity_routes_deleted_by_explicit_owner() {
        let event = BookmarkEvent::deleted("b@x.com".to_string(), "bm-2".to_string());
        assert_eq!(event.owner_identity(), "b@x.com");
    }

    #[test]
    fn event_serialization_round_trips() {
        let event = BookmarkEvent::created(sample_bookmark());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("bookmark_created"));

        let deserialized: BookmarkEvent = serde_json::from_str(&json).unwrap();
        match deserialized {
            BookmarkEvent::BookmarkCreated { bookmark } => {
                assert_eq!(bookmark.id, "bm-1");
                assert_eq!(bookmark.owner_identity, "a@x.com");
            }
            _ => panic!("Expected BookmarkCreated"),
        }
    }
}
