//! Client for a hosted PostgREST-compatible store.
//!
//! Tables live under `{base}/rest/v1/` and are addressed with PostgREST
//! filter syntax (`id=eq.3`, `title=ilike.*foo*`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::BlogStore;
use crate::config::Config;
use crate::constants::SETTINGS_ROW_ID;
use crate::db::{NewPost, Post, PostQuery, SiteSettings};

const POSTS_TABLE: &str = "blog_posts";
const SETTINGS_TABLE: &str = "site_settings";
const SETTINGS_COLUMNS: &str = "title,subtitle,mission,quote,hero_image";

/// Error body returned by PostgREST.
#[derive(Debug, Deserialize)]
struct RestErrorBody {
    message: String,
}

/// Settings row as written to the store.
#[derive(Debug, Serialize)]
struct SettingsRow<'a> {
    id: i64,
    title: &'a str,
    subtitle: &'a str,
    mission: &'a str,
    quote: &'a str,
    hero_image: &'a str,
    updated_at: String,
}

/// Post row as written on update.
#[derive(Debug, Serialize)]
struct PostUpdateRow<'a> {
    #[serde(flatten)]
    post: &'a NewPost,
    updated_at: String,
}

/// [`BlogStore`] speaking PostgREST over HTTP.
#[derive(Clone)]
pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or key is missing or the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config
            .store_rest_url
            .clone()
            .context("STORE_REST_URL is required for the REST store")?;
        let api_key = config
            .store_rest_key
            .clone()
            .context("STORE_REST_KEY is required for the REST store")?;

        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(http, &base_url, api_key))
    }

    /// Create a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(http: reqwest::Client, base_url: &str, api_key: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send_rows<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<Vec<T>> {
        let response = self
            .authorized(request)
            .send()
            .await
            .with_context(|| format!("Failed to send {what} request to store"))?;

        let response = error_for_status(response, what).await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {what} response"))
    }
}

async fn error_for_status(response: Response, what: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown".to_string());
    let message = serde_json::from_str::<RestErrorBody>(&body).map_or(body, |e| e.message);
    anyhow::bail!("Store {what} failed: {status} - {message}")
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl BlogStore for RestStore {
    fn backend(&self) -> &'static str {
        "rest"
    }

    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>> {
        let mut params: Vec<(&str, String)> = vec![
            ("select", "*".to_string()),
            ("order", "date.desc,id.desc".to_string()),
        ];
        if query.published_only {
            params.push(("published", "eq.true".to_string()));
        }
        if !query.search.is_empty() {
            params.push(("title", format!("ilike.*{}*", query.search)));
        }

        debug!(published_only = query.published_only, search = %query.search, "Listing posts from store");

        let request = self.http.get(self.table_url(POSTS_TABLE)).query(&params);
        let posts: Vec<Post> = self.send_rows(request, "list posts").await?;

        // `ilike` treats `*` and `_` in the search term as wildcards.
        Ok(posts.into_iter().filter(|p| query.matches(p)).collect())
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Post> {
        let request = self
            .http
            .post(self.table_url(POSTS_TABLE))
            .header("Prefer", "return=representation")
            .json(&[post]);
        let rows: Vec<Post> = self.send_rows(request, "insert post").await?;

        rows.into_iter()
            .next()
            .context("Store returned no row for inserted post")
    }

    async fn update_post(&self, id: i64, post: &NewPost) -> Result<Option<Post>> {
        let body = PostUpdateRow {
            post,
            updated_at: now_timestamp(),
        };
        let request = self
            .http
            .patch(self.table_url(POSTS_TABLE))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&body);
        let rows: Vec<Post> = self.send_rows(request, "update post").await?;

        Ok(rows.into_iter().next())
    }

    async fn delete_post(&self, id: i64) -> Result<bool> {
        let request = self
            .http
            .delete(self.table_url(POSTS_TABLE))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation");
        let rows: Vec<Post> = self.send_rows(request, "delete post").await?;

        Ok(!rows.is_empty())
    }

    async fn get_settings(&self) -> Result<Option<SiteSettings>> {
        let request = self.http.get(self.table_url(SETTINGS_TABLE)).query(&[
            ("select", SETTINGS_COLUMNS.to_string()),
            ("id", format!("eq.{SETTINGS_ROW_ID}")),
        ]);
        let rows: Vec<SiteSettings> = self.send_rows(request, "get settings").await?;

        Ok(rows.into_iter().next())
    }

    async fn upsert_settings(&self, settings: &SiteSettings) -> Result<SiteSettings> {
        let row = SettingsRow {
            id: SETTINGS_ROW_ID,
            title: &settings.title,
            subtitle: &settings.subtitle,
            mission: &settings.mission,
            quote: &settings.quote,
            hero_image: &settings.hero_image,
            updated_at: now_timestamp(),
        };
        let request = self
            .http
            .post(self.table_url(SETTINGS_TABLE))
            .query(&[("select", SETTINGS_COLUMNS)])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&[row]);
        let rows: Vec<SiteSettings> = self.send_rows(request, "upsert settings").await?;

        rows.into_iter()
            .next()
            .context("Store returned no row for upserted settings")
    }
}
