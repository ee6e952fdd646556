//! Persistence behind the HTTP endpoints.
//!
//! [`BlogStore`] is the thin query/upsert surface the endpoints need. Two
//! backends implement it: a local SQLite database and a hosted
//! PostgREST-compatible store.

mod rest;
mod sqlite;

pub use rest::RestStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::config::{Config, StoreBackend};
use crate::db::{NewPost, Post, PostQuery, SiteSettings};

/// Query and upsert operations over the posts and settings collections.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Posts matching `query`, newest date first.
    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>>;

    /// Insert a post and return it with its assigned id.
    async fn insert_post(&self, post: &NewPost) -> Result<Post>;

    /// Replace a post. `None` when no post has `id`.
    async fn update_post(&self, id: i64, post: &NewPost) -> Result<Option<Post>>;

    /// Remove a post. `false` when no post has `id`.
    async fn delete_post(&self, id: i64) -> Result<bool>;

    /// The persisted settings row, if any.
    async fn get_settings(&self) -> Result<Option<SiteSettings>>;

    /// Overwrite the singleton settings row and return what was stored.
    async fn upsert_settings(&self, settings: &SiteSettings) -> Result<SiteSettings>;
}

/// Build the store selected by `config`.
///
/// # Errors
///
/// Returns an error if the backend cannot be initialized.
pub async fn from_config(config: &Config) -> Result<Arc<dyn BlogStore>> {
    match config.store_backend {
        StoreBackend::Sqlite => {
            if let Some(parent) = config.database_path.parent() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
            let store = SqliteStore::open(&config.database_path).await?;
            info!(path = %config.database_path.display(), "Using SQLite store");
            Ok(Arc::new(store))
        }
        StoreBackend::Rest => {
            let store = RestStore::new(config)?;
            info!(url = %store.base_url(), "Using hosted REST store");
            Ok(Arc::new(store))
        }
    }
}
