//! Database models for bookmarks.

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Database model for a stored bookmark row.
#[derive(
    Queryable, Identifiable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::bookmarks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct BookmarkDB {
    pub id: String,
    pub owner_identity: String,
    pub title: String,
    pub url: String,
    pub created_at: NaiveDateTime,
}

/// Database model for inserting a new bookmark.
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::bookmarks)]
#[serde(rename_all = "camelCase")]
pub struct NewBookmarkDB {
    pub id: String,
    pub owner_identity: String,
    pub title: String,
    pub url: String,
    pub created_at: NaiveDateTime,
}

// Conversion to domain models. Timestamps are stored naive and interpreted
// as UTC.
impl From<BookmarkDB> for linkstash_core::bookmarks::Bookmark {
    fn from(db: BookmarkDB) -> Self {
        Self {
            id: db.id,
            owner_identity: db.owner_identity,
            title: db.title,
            url: db.url,
            created_at: DateTime::<Utc>::from_naive_utc_and_offset(db.created_at, Utc),
        }
    }
}
