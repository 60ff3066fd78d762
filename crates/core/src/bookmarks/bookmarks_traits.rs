use crate::bookmarks::bookmarks_model::{Bookmark, NewBookmark};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for bookmark repository operations.
#[async_trait]
pub trait BookmarkRepositoryTrait: Send + Sync {
    /// Loads all bookmarks for one owner identity, newest first.
    fn list_by_owner(&self, owner: &str) -> Result<Vec<Bookmark>>;

    /// Persists a new bookmark, assigning a fresh id and creation timestamp.
    async fn insert(&self, new_bookmark: NewBookmark) -> Result<Bookmark>;

    /// Deletes the bookmark matching both id and owner in a single atomic
    /// statement. Returns the number of rows removed (0 or 1).
    async fn delete_owned(&self, bookmark_id: &str, owner: &str) -> Result<usize>;
}

/// Trait for bookmark service operations.
#[async_trait]
pub trait BookmarkServiceTrait: Send + Sync {
    fn list_bookmarks(&self, owner: &str) -> Result<Vec<Bookmark>>;
    async fn create_bookmark(&self, new_bookmark: NewBookmark) -> Result<Bookmark>;
    async fn delete_bookmark(&self, bookmark_id: &str, owner: &str) -> Result<()>;
}
