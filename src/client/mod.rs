//! Typed access to the blog resource endpoints.

mod http;

pub use http::HttpBlogApi;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::db::{Post, PostQuery, SiteSettings};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connect, timeout, decode).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// Message suitable for showing to a user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            Self::InvalidUrl(_) => None,
        }
    }
}

/// The HTTP resource surface as seen by the controller.
#[async_trait]
pub trait BlogApi: Send + Sync {
    /// `GET /posts`
    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>, ClientError>;

    /// `POST /posts`; the store assigns the id.
    async fn create_post(&self, post: &Post) -> Result<Post, ClientError>;

    /// `PUT /posts/{id}`
    async fn update_post(&self, id: i64, post: &Post) -> Result<Post, ClientError>;

    /// `DELETE /posts/{id}`
    async fn delete_post(&self, id: i64) -> Result<(), ClientError>;

    /// `GET /settings`
    async fn get_settings(&self) -> Result<SiteSettings, ClientError>;

    /// `POST /settings`; returns the stored record.
    async fn save_settings(&self, settings: &SiteSettings) -> Result<SiteSettings, ClientError>;

    /// `POST /admin/login`; `Ok(false)` when the password is rejected.
    async fn verify_admin(&self, password: &str) -> Result<bool, ClientError>;
}
