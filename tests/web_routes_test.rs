//! Integration tests for the blog resource routes.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use blog_cms::auth::AdminCredential;
use blog_cms::db::{Post, SiteSettings};
use blog_cms::store::SqliteStore;
use blog_cms::web::{create_app, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const PASSWORD: &str = "correct horse battery";

async fn create_test_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = SqliteStore::open(&temp_dir.path().join("test.sqlite"))
        .await
        .expect("Failed to create store");
    let credential = AdminCredential::from_password(PASSWORD).expect("Failed to hash password");
    let app = create_app(AppState::new(Arc::new(store), credential));
    (app, temp_dir)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

fn post_body(title: &str, date: &str, published: bool) -> Value {
    json!({
        "id": 0,
        "title": title,
        "excerpt": "Short summary",
        "content": "Full article body",
        "image": "https://example.com/img.jpg",
        "date": date,
        "author": "EGA Team",
        "published": published,
    })
}

async fn create(app: &Router, title: &str, date: &str, published: bool) -> Post {
    let (status, body) = send(app, Method::POST, "/api/blog/posts", Some(post_body(title, date, published))).await;
    assert_eq!(status, StatusCode::CREATED);
    serde_json::from_value(body).unwrap()
}

async fn list(app: &Router, uri: &str) -> Vec<Post> {
    let (status, body) = send(app, Method::GET, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _temp_dir) = create_test_app().await;

    let (status, body) = send(&app, Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));
}

#[tokio::test]
async fn test_create_assigns_id_and_ignores_body_id() {
    let (app, _temp_dir) = create_test_app().await;

    let mut body = post_body("Gaming Resilience", "2024-05-01", true);
    body["id"] = json!(777);
    let (status, created) = send(&app, Method::POST, "/api/blog/posts", Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    let created: Post = serde_json::from_value(created).unwrap();
    assert!(created.id > 0);
    assert_ne!(created.id, 777);
    assert_eq!(created.title, "Gaming Resilience");
}

#[tokio::test]
async fn test_create_defaults_published_to_false() {
    let (app, _temp_dir) = create_test_app().await;

    let mut body = post_body("Unflagged", "2024-05-01", true);
    body.as_object_mut().unwrap().remove("published");
    let (status, created) = send(&app, Method::POST, "/api/blog/posts", Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["published"], json!(false));
}

#[tokio::test]
async fn test_list_published_only_and_search() {
    let (app, _temp_dir) = create_test_app().await;
    create(&app, "Gaming Resilience", "2024-05-01", true).await;
    create(&app, "Hidden Draft", "2024-06-01", false).await;

    let published = list(&app, "/api/blog/posts?published=true").await;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].title, "Gaming Resilience");

    let all = list(&app, "/api/blog/posts?published=false").await;
    let titles: Vec<_> = all.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Hidden Draft", "Gaming Resilience"]);

    let searched = list(&app, "/api/blog/posts?published=false&search=hidden").await;
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].title, "Hidden Draft");

    let encoded = list(&app, "/api/blog/posts?published=true&search=gaming%20res").await;
    assert_eq!(encoded.len(), 1);
}

#[tokio::test]
async fn test_update_post() {
    let (app, _temp_dir) = create_test_app().await;
    let created = create(&app, "Draft", "2024-05-01", false).await;

    let uri = format!("/api/blog/posts/{}", created.id);
    let (status, updated) = send(&app, Method::PUT, &uri, Some(post_body("Final", "2024-05-02", true))).await;

    assert_eq!(status, StatusCode::OK);
    let updated: Post = serde_json::from_value(updated).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Final");
    assert!(updated.published);
    assert_eq!(list(&app, "/api/blog/posts?published=false").await.len(), 1);
}

#[tokio::test]
async fn test_update_missing_post_is_404_with_message() {
    let (app, _temp_dir) = create_test_app().await;

    let (status, body) = send(&app, Method::PUT, "/api/blog/posts/99", Some(post_body("X", "2024-01-01", true))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Post 99 not found"));
}

#[tokio::test]
async fn test_delete_post() {
    let (app, _temp_dir) = create_test_app().await;
    let created = create(&app, "Doomed", "2024-05-01", true).await;
    let uri = format!("/api/blog/posts/{}", created.id);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(list(&app, "/api/blog/posts?published=false").await.is_empty());

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_body_returns_error_object() {
    let (app, _temp_dir) = create_test_app().await;

    let (status, body) = send(&app, Method::POST, "/api/blog/posts", Some(json!({ "title": "only" }))).await;
    assert!(status.is_client_error());
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::DELETE, "/api/blog/posts/not-a-number", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_settings_default_when_none_saved() {
    let (app, _temp_dir) = create_test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/blog/settings", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], json!("Ethiopian Games Association Blog"));
    assert!(body["heroImage"].as_str().unwrap().starts_with("https://images.pexels.com/"));
}

#[tokio::test]
async fn test_settings_upsert_round_trip() {
    let (app, _temp_dir) = create_test_app().await;
    let settings = json!({
        "title": "EGA Updates",
        "subtitle": "News",
        "mission": "Play together",
        "quote": "Keep going",
        "heroImage": "https://example.com/hero.jpg",
    });

    let (status, saved) = send(&app, Method::POST, "/api/blog/settings", Some(settings.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved, settings);

    let (_, fetched) = send(&app, Method::GET, "/api/blog/settings", None).await;
    let fetched: SiteSettings = serde_json::from_value(fetched).unwrap();
    assert_eq!(fetched.title, "EGA Updates");
    assert_eq!(fetched.hero_image, "https://example.com/hero.jpg");
}

#[tokio::test]
async fn test_admin_login() {
    let (app, _temp_dir) = create_test_app().await;

    let (status, body) = send(&app, Method::POST, "/api/blog/admin/login", Some(json!({ "password": PASSWORD }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "admin": true }));

    let (status, body) = send(&app, Method::POST, "/api/blog/admin/login", Some(json!({ "password": "admin123" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Invalid password" }));
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (app, _temp_dir) = create_test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/blog/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Not found"));
}

#[tokio::test]
async fn test_wrong_method_is_json_405() {
    let (app, _temp_dir) = create_test_app().await;

    for (method, uri) in [
        (Method::GET, "/api/blog/posts/1"),
        (Method::PATCH, "/api/blog/posts/1"),
        (Method::DELETE, "/api/blog/settings"),
        (Method::PUT, "/api/blog/posts"),
        (Method::GET, "/api/blog/admin/login"),
    ] {
        let (status, body) = send(&app, method.clone(), uri, None).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert!(body["error"].is_string(), "{method} {uri}: {body}");
    }
}

#[tokio::test]
async fn test_settings_body_with_both_hero_image_keys() {
    let (app, _temp_dir) = create_test_app().await;
    let settings = json!({
        "title": "EGA Updates",
        "subtitle": "News",
        "mission": "Play together",
        "quote": "Keep going",
        "heroImage": "https://example.com/camel.jpg",
        "hero_image": "https://example.com/snake.jpg",
    });

    let (status, saved) = send(&app, Method::POST, "/api/blog/settings", Some(settings)).await;
    assert_eq!(status, StatusCode::OK, "{saved}");
    assert_eq!(saved["heroImage"], json!("https://example.com/camel.jpg"));
}
