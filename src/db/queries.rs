use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;

use super::models::{NewPost, Post, PostQuery, SiteSettings};
use crate::constants::SETTINGS_ROW_ID;

const POST_COLUMNS: &str = "id, title, excerpt, content, image, date, author, published";

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ========== Posts ==========

/// List posts matching `query`, newest date first.
///
/// Title search is applied after the visibility filter so that matching is
/// Unicode-aware rather than SQLite's ASCII-only `LIKE` folding.
pub async fn list_posts(pool: &SqlitePool, query: &PostQuery) -> Result<Vec<Post>> {
    let sql = if query.published_only {
        format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE published = 1 ORDER BY date DESC, id DESC")
    } else {
        format!("SELECT {POST_COLUMNS} FROM blog_posts ORDER BY date DESC, id DESC")
    };

    let posts: Vec<Post> = sqlx::query_as(&sql)
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    Ok(posts.into_iter().filter(|p| query.matches(p)).collect())
}

/// Get a post by id.
pub async fn get_post(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    let sql = format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE id = ?");
    sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to fetch post")
}

/// Insert a new post, returning the stored record.
pub async fn insert_post(pool: &SqlitePool, post: &NewPost) -> Result<Post> {
    let result = sqlx::query(
        r"
        INSERT INTO blog_posts (title, excerpt, content, image, date, author, published)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(&post.title)
    .bind(&post.excerpt)
    .bind(&post.content)
    .bind(&post.image)
    .bind(&post.date)
    .bind(&post.author)
    .bind(post.published)
    .execute(pool)
    .await
    .context("Failed to insert post")?;

    Ok(post.clone().with_id(result.last_insert_rowid()))
}

/// Replace every field of an existing post. Returns `None` if no row has `id`.
pub async fn update_post(pool: &SqlitePool, id: i64, post: &NewPost) -> Result<Option<Post>> {
    let result = sqlx::query(
        r"
        UPDATE blog_posts
        SET title = ?, excerpt = ?, content = ?, image = ?, date = ?, author = ?,
            published = ?, updated_at = ?
        WHERE id = ?
        ",
    )
    .bind(&post.title)
    .bind(&post.excerpt)
    .bind(&post.content)
    .bind(&post.image)
    .bind(&post.date)
    .bind(&post.author)
    .bind(post.published)
    .bind(now_timestamp())
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    Ok(Some(post.clone().with_id(id)))
}

/// Delete a post. Returns whether a row was removed.
pub async fn delete_post(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(result.rows_affected() > 0)
}

/// Count all stored posts.
pub async fn count_posts(pool: &SqlitePool) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM blog_posts")
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;
    Ok(row.0)
}

// ========== Site Settings ==========

/// Get the singleton settings row, if one has been saved.
pub async fn get_settings(pool: &SqlitePool) -> Result<Option<SiteSettings>> {
    sqlx::query_as(
        "SELECT title, subtitle, mission, quote, hero_image FROM site_settings WHERE id = ?",
    )
    .bind(SETTINGS_ROW_ID)
    .fetch_optional(pool)
    .await
    .context("Failed to fetch site settings")
}

/// Insert or overwrite the singleton settings row, returning what was stored.
pub async fn upsert_settings(pool: &SqlitePool, settings: &SiteSettings) -> Result<SiteSettings> {
    sqlx::query_as(
        r"
        INSERT INTO site_settings (id, title, subtitle, mission, quote, hero_image, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            subtitle = excluded.subtitle,
            mission = excluded.mission,
            quote = excluded.quote,
            hero_image = excluded.hero_image,
            updated_at = excluded.updated_at
        RETURNING title, subtitle, mission, quote, hero_image
        ",
    )
    .bind(SETTINGS_ROW_ID)
    .bind(&settings.title)
    .bind(&settings.subtitle)
    .bind(&settings.mission)
    .bind(&settings.quote)
    .bind(&settings.hero_image)
    .bind(now_timestamp())
    .fetch_one(pool)
    .await
    .context("Failed to upsert site settings")
}
