use chrono::{DateTime, Utc};
use linkstash_core::bookmarks as core_bookmarks;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub owner_identity: String,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl From<core_bookmarks::Bookmark> for Bookmark {
    fn from(b: core_bookmarks::Bookmark) -> Self {
        Self {
            id: b.id,
            owner_identity: b.owner_identity,
            title: b.title,
            url: b.url,
            created_at: b.created_at,
        }
    }
}

/// Create request. Fields default to empty strings so missing input is
/// reported as a 400 validation failure instead of a deserialization error.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewBookmark {
    #[serde(default)]
    pub owner_identity: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

impl From<NewBookmark> for core_bookmarks::NewBookmark {
    fn from(b: NewBookmark) -> Self {
        Self {
            owner_identity: b.owner_identity,
            title: b.title,
            url: b.url,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DeleteBookmarkRequest {
    #[serde(default)]
    pub owner_identity: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct DeleteBookmarkResponse {
    pub success: bool,
}
