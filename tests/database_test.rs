//! Integration tests for database operations.

use blog_cms::db::{
    count_posts, delete_post, get_post, get_settings, insert_post, list_posts, update_post,
    upsert_settings, Database, NewPost, PostQuery, SiteSettings,
};
use tempfile::TempDir;

async fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.sqlite");
    let db = Database::new(&db_path)
        .await
        .expect("Failed to create database");
    (db, temp_dir)
}

fn new_post(title: &str, date: &str, published: bool) -> NewPost {
    NewPost {
        title: title.to_string(),
        excerpt: format!("{title} excerpt"),
        content: format!("{title} body"),
        image: "https://example.com/cover.jpg".to_string(),
        date: date.to_string(),
        author: "EGA Team".to_string(),
        published,
    }
}

#[tokio::test]
async fn test_insert_and_get_post() {
    let (db, _temp_dir) = setup_db().await;

    let created = insert_post(db.pool(), &new_post("Gaming Resilience", "2024-03-01", true))
        .await
        .expect("Failed to insert post");
    assert!(created.id > 0);

    let retrieved = get_post(db.pool(), created.id)
        .await
        .expect("Failed to get post")
        .expect("Post not found");

    assert_eq!(retrieved, created);
    assert!(retrieved.published);
}

#[tokio::test]
async fn test_insert_assigns_distinct_ids() {
    let (db, _temp_dir) = setup_db().await;

    let a = insert_post(db.pool(), &new_post("A", "2024-01-01", true)).await.unwrap();
    let b = insert_post(db.pool(), &new_post("B", "2024-01-01", true)).await.unwrap();

    assert_ne!(a.id, b.id);
    assert_eq!(count_posts(db.pool()).await.unwrap(), 2);
}

#[tokio::test]
async fn test_list_orders_newest_first_and_filters() {
    let (db, _temp_dir) = setup_db().await;

    insert_post(db.pool(), &new_post("Old News", "2023-05-01", true)).await.unwrap();
    insert_post(db.pool(), &new_post("Gaming Resilience", "2024-06-01", true)).await.unwrap();
    insert_post(db.pool(), &new_post("Hidden Draft", "2024-07-01", false)).await.unwrap();

    let all = list_posts(db.pool(), &PostQuery::new(false, "")).await.unwrap();
    let titles: Vec<_> = all.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Hidden Draft", "Gaming Resilience", "Old News"]);

    let published = list_posts(db.pool(), &PostQuery::new(true, "")).await.unwrap();
    let titles: Vec<_> = published.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Gaming Resilience", "Old News"]);

    let searched = list_posts(db.pool(), &PostQuery::new(false, "GAMING")).await.unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].title, "Gaming Resilience");
}

#[tokio::test]
async fn test_search_treats_like_wildcards_literally() {
    let (db, _temp_dir) = setup_db().await;

    insert_post(db.pool(), &new_post("100% Effort", "2024-01-01", true)).await.unwrap();
    insert_post(db.pool(), &new_post("Plain", "2024-01-02", true)).await.unwrap();

    let found = list_posts(db.pool(), &PostQuery::new(true, "%")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "100% Effort");
}

#[tokio::test]
async fn test_update_replaces_fields_without_changing_count() {
    let (db, _temp_dir) = setup_db().await;

    let created = insert_post(db.pool(), &new_post("Draft", "2024-01-01", false)).await.unwrap();
    let updated = update_post(db.pool(), created.id, &new_post("Final", "2024-02-02", true))
        .await
        .unwrap()
        .expect("Post should exist");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Final");
    assert!(updated.published);
    assert_eq!(count_posts(db.pool()).await.unwrap(), 1);

    let stored = get_post(db.pool(), created.id).await.unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn test_update_missing_post_returns_none() {
    let (db, _temp_dir) = setup_db().await;

    let result = update_post(db.pool(), 42, &new_post("Ghost", "2024-01-01", true))
        .await
        .unwrap();
    assert!(result.is_none());
    assert_eq!(count_posts(db.pool()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_post() {
    let (db, _temp_dir) = setup_db().await;

    let created = insert_post(db.pool(), &new_post("Doomed", "2024-01-01", true)).await.unwrap();

    assert!(delete_post(db.pool(), created.id).await.unwrap());
    assert!(!delete_post(db.pool(), created.id).await.unwrap());
    assert!(get_post(db.pool(), created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_settings_absent_until_saved() {
    let (db, _temp_dir) = setup_db().await;

    assert!(get_settings(db.pool()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_settings_upsert_overwrites_singleton() {
    let (db, _temp_dir) = setup_db().await;

    let first = SiteSettings {
        title: "First".to_string(),
        ..SiteSettings::default()
    };
    let second = SiteSettings {
        title: "Second".to_string(),
        subtitle: "Changed subtitle".to_string(),
        mission: "m".to_string(),
        quote: "q".to_string(),
        hero_image: "https://example.com/hero.png".to_string(),
    };

    assert_eq!(upsert_settings(db.pool(), &first).await.unwrap(), first);
    assert_eq!(upsert_settings(db.pool(), &second).await.unwrap(), second);
    assert_eq!(get_settings(db.pool()).await.unwrap(), Some(second));

    let rows: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM site_settings")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(rows.0, 1);
}

#[tokio::test]
async fn test_reopen_keeps_data() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("reopen.sqlite");

    {
        let db = Database::new(&db_path).await.unwrap();
        insert_post(db.pool(), &new_post("Persisted", "2024-01-01", true)).await.unwrap();
        db.pool().close().await;
    }

    let db = Database::new(&db_path).await.unwrap();
    assert_eq!(count_posts(db.pool()).await.unwrap(), 1);
}
