use linkstash_core::bookmarks::{Bookmark, BookmarkRepositoryTrait, NewBookmark};
use linkstash_core::Result;

use super::model::{BookmarkDB, NewBookmarkDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::bookmarks;
use crate::schema::bookmarks::dsl::*;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::SqliteConnection;

use std::sync::Arc;
use uuid::Uuid;

pub struct BookmarkRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl BookmarkRepository {
    pub fn new(
        pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        BookmarkRepository { pool, writer }
    }

    pub fn list_by_owner_impl(&self, owner: &str) -> Result<Vec<Bookmark>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = bookmarks
            .filter(owner_identity.eq(owner))
            .order(created_at.desc())
            .load::<BookmarkDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Bookmark::from).collect())
    }
}

#[async_trait]
impl BookmarkRepositoryTrait for BookmarkRepository {
    fn list_by_owner(&self, owner: &str) -> Result<Vec<Bookmark>> {
        self.list_by_owner_impl(owner)
    }

    async fn insert(&self, new_bookmark: NewBookmark) -> Result<Bookmark> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Bookmark> {
                let row = NewBookmarkDB {
                    id: Uuid::new_v4().to_string(),
                    owner_identity: new_bookmark.owner_identity,
                    title: new_bookmark.title,
                    url: new_bookmark.url,
                    created_at: Utc::now().naive_utc(),
                };

                let result_db = diesel::insert_into(bookmarks::table)
                    .values(&row)
                    .returning(BookmarkDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Bookmark::from(result_db))
            })
            .await
    }

    async fn delete_owned(&self, bookmark_id: &str, owner: &str) -> Result<usize> {
        let bookmark_id = bookmark_id.to_string();
        let owner = owner.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                // Single statement matching id AND owner: concurrent deletes
                // of one id cannot both observe a removed row.
                Ok(diesel::delete(
                    bookmarks.filter(id.eq(bookmark_id).and(owner_identity.eq(owner))),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }
}
