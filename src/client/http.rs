use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{BlogApi, ClientError};
use crate::db::{Post, PostQuery, SiteSettings};
use crate::web::{ErrorBody, LoginRequest, LoginResponse};

/// [`BlogApi`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpBlogApi {
    http: reqwest::Client,
    base: Url,
}

impl HttpBlogApi {
    /// Create a client for the endpoints rooted at `base_url`
    /// (for example `http://localhost:8080/api/blog`).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(http, base_url)
    }

    /// Create a client around an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        // `Url::join` replaces the last segment unless the base ends in '/'.
        let base = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };
        Ok(Self { http, base })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }
}

/// Turn a non-success response into [`ClientError::Api`] carrying the endpoint's message.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .unwrap_or_else(|_| {
            if body.is_empty() {
                status.to_string()
            } else {
                body
            }
        });
    Err(ClientError::Api { status, message })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(check(response).await?.json().await?)
}

#[async_trait]
impl BlogApi for HttpBlogApi {
    async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>, ClientError> {
        debug!(published_only = query.published_only, search = %query.search, "Fetching posts");
        let response = self
            .http
            .get(self.endpoint("posts")?)
            .query(query)
            .send()
            .await?;
        decode(response).await
    }

    async fn create_post(&self, post: &Post) -> Result<Post, ClientError> {
        let response = self
            .http
            .post(self.endpoint("posts")?)
            .json(post)
            .send()
            .await?;
        decode(response).await
    }

    async fn update_post(&self, id: i64, post: &Post) -> Result<Post, ClientError> {
        let response = self
            .http
            .put(self.endpoint(&format!("posts/{id}"))?)
            .json(post)
            .send()
            .await?;
        decode(response).await
    }

    async fn delete_post(&self, id: i64) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.endpoint(&format!("posts/{id}"))?)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn get_settings(&self) -> Result<SiteSettings, ClientError> {
        let response = self.http.get(self.endpoint("settings")?).send().await?;
        decode(response).await
    }

    async fn save_settings(&self, settings: &SiteSettings) -> Result<SiteSettings, ClientError> {
        let response = self
            .http
            .post(self.endpoint("settings")?)
            .json(settings)
            .send()
            .await?;
        decode(response).await
    }

    async fn verify_admin(&self, password: &str) -> Result<bool, ClientError> {
        let response = self
            .http
            .post(self.endpoint("admin/login")?)
            .json(&LoginRequest {
                password: password.to_string(),
            })
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(false);
        }
        let body: LoginResponse = decode(response).await?;
        Ok(body.admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let api = HttpBlogApi::with_client(reqwest::Client::new(), "http://localhost:8080/api/blog")
            .unwrap();
        assert_eq!(
            api.endpoint("posts/3").unwrap().as_str(),
            "http://localhost:8080/api/blog/posts/3"
        );

        let api = HttpBlogApi::with_client(reqwest::Client::new(), "http://localhost:8080/api/blog/")
            .unwrap();
        assert_eq!(
            api.endpoint("settings").unwrap().as_str(),
            "http://localhost:8080/api/blog/settings"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpBlogApi::with_client(reqwest::Client::new(), "not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
