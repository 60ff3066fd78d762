//! Bookmark domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain model representing a stored bookmark.
///
/// `owner_identity` is both the persistence partition key and the broadcast
/// group key; it is set exactly once at creation and never changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub owner_identity: String,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Input model for creating a new bookmark.
///
/// `id` and `created_at` are assigned by the storage layer at insert time.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewBookmark {
    pub owner_identity: String,
    pub title: String,
    pub url: String,
}
