use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::ApiError;
use super::AppState;
use crate::db::{NewPost, Post, PostQuery, SiteSettings};

/// Create the router with all blog resource routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/posts",
            get(list_posts)
                .post(create_post)
                .fallback(method_not_allowed),
        )
        .route(
            "/posts/:id",
            put(update_post)
                .delete(delete_post)
                .fallback(method_not_allowed),
        )
        .route(
            "/settings",
            get(get_settings)
                .post(save_settings)
                .fallback(method_not_allowed),
        )
        .route("/admin/login", post(admin_login).fallback(method_not_allowed))
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(format!("Method {method} not allowed"))
}

// ========== Posts ==========

#[derive(Debug, Deserialize)]
pub struct ListPostsParams {
    published: Option<String>,
    search: Option<String>,
}

impl From<ListPostsParams> for PostQuery {
    fn from(params: ListPostsParams) -> Self {
        // Anything other than the literal "true" lists drafts as well.
        Self::new(
            params.published.as_deref() == Some("true"),
            params.search.unwrap_or_default(),
        )
    }
}

async fn list_posts(
    State(state): State<AppState>,
    params: Result<Query<ListPostsParams>, QueryRejection>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let Query(params) = params?;
    let query = PostQuery::from(params);
    let posts = state.store.list_posts(&query).await?;
    Ok(Json(posts))
}

async fn create_post(
    State(state): State<AppState>,
    body: Result<Json<Post>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(post) = body?;
    let created = state.store.insert_post(&NewPost::from(post)).await?;
    info!(id = created.id, title = %created.title, "Created post");
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

async fn update_post(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<Post>, JsonRejection>,
) -> Result<Json<Post>, ApiError> {
    let Path(id) = id?;
    let Json(post) = body?;
    match state.store.update_post(id, &NewPost::from(post)).await? {
        Some(updated) => {
            info!(id, published = updated.published, "Updated post");
            Ok(Json(updated))
        }
        None => Err(ApiError::NotFound(format!("Post {id} not found"))),
    }
}

async fn delete_post(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    if state.store.delete_post(id).await? {
        info!(id, "Deleted post");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Post {id} not found")))
    }
}

// ========== Settings ==========

async fn get_settings(State(state): State<AppState>) -> Result<Json<SiteSettings>, ApiError> {
    let settings = state.store.get_settings().await?.unwrap_or_default();
    Ok(Json(settings))
}

async fn save_settings(
    State(state): State<AppState>,
    body: Result<Json<SiteSettings>, JsonRejection>,
) -> Result<Json<SiteSettings>, ApiError> {
    let Json(settings) = body?;
    let stored = state.store.upsert_settings(&settings).await?;
    info!(title = %stored.title, "Saved site settings");
    Ok(Json(stored))
}

// ========== Admin ==========

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub admin: bool,
}

async fn admin_login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = body?;
    let credential = state.credential.clone();

    // Argon2 verification is CPU-bound.
    let verified = tokio::task::spawn_blocking(move || credential.verify(&request.password))
        .await
        .map_err(|e| ApiError::Store(anyhow::anyhow!("Password verification task failed: {e}")))?;

    if verified {
        info!("Admin login succeeded");
        Ok(Json(LoginResponse { admin: true }))
    } else {
        warn!("Admin login rejected");
        Err(ApiError::Unauthorized("Invalid password".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_published_only_for_literal_true() {
        let q = PostQuery::from(ListPostsParams {
            published: Some("true".to_string()),
            search: None,
        });
        assert!(q.published_only);
        assert!(q.search.is_empty());

        for value in [None, Some("false"), Some("TRUE"), Some("1")] {
            let q = PostQuery::from(ListPostsParams {
                published: value.map(str::to_string),
                search: Some("game".to_string()),
            });
            assert!(!q.published_only, "{value:?}");
            assert_eq!(q.search, "game");
        }
    }
}
