//! SQLite storage implementation for bookmarks.

mod model;
mod repository;

pub use model::{BookmarkDB, NewBookmarkDB};
pub use repository::BookmarkRepository;
