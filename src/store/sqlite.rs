use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use super::BlogStore;
use crate::db::{self, Database, NewPost, Post, PostQuery, SiteSettings};

/// [`BlogStore`] backed by the local SQLite [`Database`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open (creating and migrating if needed) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub async fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Database::new(path).await?))
    }
}

#[async_trait]
impl BlogStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>> {
        db::list_posts(self.db.pool(), query).await
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Post> {
        db::insert_post(self.db.pool(), post).await
    }

    async fn update_post(&self, id: i64, post: &NewPost) -> Result<Option<Post>> {
        db::update_post(self.db.pool(), id, post).await
    }

    async fn delete_post(&self, id: i64) -> Result<bool> {
        db::delete_post(self.db.pool(), id).await
    }

    async fn get_settings(&self) -> Result<Option<SiteSettings>> {
        db::get_settings(self.db.pool()).await
    }

    async fn upsert_settings(&self, settings: &SiteSettings) -> Result<SiteSettings> {
        db::upsert_settings(self.db.pool(), settings).await
    }
}
