use log::debug;
use std::sync::Arc;

use super::bookmarks_model::{Bookmark, NewBookmark};
use super::bookmarks_traits::{BookmarkRepositoryTrait, BookmarkServiceTrait};
use crate::errors::{Error, Result, ValidationError};
use crate::events::{BookmarkEvent, BookmarkEventSink, NoOpBookmarkEventSink};

/// Service orchestrating bookmark mutations.
///
/// Enforces the ownership invariant: every read and write is scoped to one
/// owner identity, and every successful mutation emits exactly one event for
/// that identity's broadcast group. Validation runs before any store access;
/// events are emitted only after the write has committed.
pub struct BookmarkService {
    repository: Arc<dyn BookmarkRepositoryTrait>,
    event_sink: Arc<dyn BookmarkEventSink>,
}

impl BookmarkService {
    /// Creates a new BookmarkService with no event delivery.
    pub fn new(repository: Arc<dyn BookmarkRepositoryTrait>) -> Self {
        Self {
            repository,
            event_sink: Arc::new(NoOpBookmarkEventSink),
        }
    }

    /// Sets the event sink for this service.
    pub fn with_event_sink(mut self, event_sink: Arc<dyn BookmarkEventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field).into());
    }
    Ok(())
}

#[async_trait::async_trait]
impl BookmarkServiceTrait for BookmarkService {
    /// Lists all bookmarks owned by `owner`, newest first.
    fn list_bookmarks(&self, owner: &str) -> Result<Vec<Bookmark>> {
        require("ownerIdentity", owner)?;
        self.repository.list_by_owner(owner)
    }

    /// Persists a new bookmark and notifies the owner's broadcast group.
    async fn create_bookmark(&self, new_bookmark: NewBookmark) -> Result<Bookmark> {
        require("ownerIdentity", &new_bookmark.owner_identity)?;
        require("title", &new_bookmark.title)?;
        require("url", &new_bookmark.url)?;

        let created = self.repository.insert(new_bookmark).await?;
        debug!("Created bookmark {} for {}", created.id, created.owner_identity);

        // The write is durable at this point; only now may the group hear about it.
        self.event_sink.emit(BookmarkEvent::created(created.clone()));
        Ok(created)
    }

    /// Deletes a bookmark matching both id and owner, then notifies the group.
    ///
    /// A missing record and a record owned by someone else both report
    /// `NotFound`; see [`Error::NotFound`].
    async fn delete_bookmark(&self, bookmark_id: &str, owner: &str) -> Result<()> {
        let deleted = self.repository.delete_owned(bookmark_id, owner).await?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Bookmark {} not found", bookmark_id)));
        }

        self.event_sink.emit(BookmarkEvent::deleted(
            owner.to_string(),
            bookmark_id.to_string(),
        ));
        Ok(())
    }
}
