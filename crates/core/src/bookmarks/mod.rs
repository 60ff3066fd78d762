//! Bookmarks module - domain models, service, and traits.

mod bookmarks_model;
mod bookmarks_service;
mod bookmarks_traits;


pub use bookmarks_model::{Bookmark, NewBookmark};
pub use bookmarks_service::BookmarkService;
pub use bookmarks_traits::{BookmarkRepositoryTrait, BookmarkServiceTrait};
