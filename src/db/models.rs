use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AUTHOR, DEFAULT_HERO_IMAGE, DEFAULT_SITE_MISSION, DEFAULT_SITE_QUOTE,
    DEFAULT_SITE_SUBTITLE, DEFAULT_SITE_TITLE,
};

/// Identifier carried by posts that have never been persisted.
pub const UNSAVED_POST_ID: i64 = 0;

/// A blog article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    /// Store-assigned identifier; [`UNSAVED_POST_ID`] for drafts.
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub image: String,
    /// Publication date as `YYYY-MM-DD`.
    pub date: String,
    pub author: String,
    #[serde(default)]
    pub published: bool,
}

impl Post {
    /// A fresh, unsaved draft dated today.
    #[must_use]
    pub fn draft() -> Self {
        Self {
            id: UNSAVED_POST_ID,
            title: String::new(),
            excerpt: String::new(),
            content: String::new(),
            image: String::new(),
            date: Utc::now().date_naive().to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            published: true,
        }
    }

    #[must_use]
    pub fn is_unsaved(&self) -> bool {
        self.id == UNSAVED_POST_ID
    }
}

/// Post fields written to the store. The store owns the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub image: String,
    pub date: String,
    pub author: String,
    pub published: bool,
}

impl From<&Post> for NewPost {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            content: post.content.clone(),
            image: post.image.clone(),
            date: post.date.clone(),
            author: post.author.clone(),
            published: post.published,
        }
    }
}

impl From<Post> for NewPost {
    fn from(post: Post) -> Self {
        Self {
            title: post.title,
            excerpt: post.excerpt,
            content: post.content,
            image: post.image,
            date: post.date,
            author: post.author,
            published: post.published,
        }
    }
}

impl NewPost {
    /// Attach a store-assigned id.
    #[must_use]
    pub fn with_id(self, id: i64) -> Post {
        Post {
            id,
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            image: self.image,
            date: self.date,
            author: self.author,
            published: self.published,
        }
    }
}

/// The singleton site copy record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(try_from = "SiteSettingsBody")]
pub struct SiteSettings {
    pub title: String,
    pub subtitle: String,
    pub mission: String,
    pub quote: String,
    #[serde(rename = "heroImage")]
    pub hero_image: String,
}

/// Incoming settings JSON. Store rows spell the hero image `hero_image`,
/// the API spells it `heroImage`; either (or both) may be present.
#[derive(Debug, Deserialize)]
struct SiteSettingsBody {
    title: String,
    subtitle: String,
    mission: String,
    quote: String,
    #[serde(rename = "heroImage")]
    hero_image_camel: Option<String>,
    #[serde(rename = "hero_image")]
    hero_image_snake: Option<String>,
}

impl TryFrom<SiteSettingsBody> for SiteSettings {
    type Error = String;

    fn try_from(body: SiteSettingsBody) -> Result<Self, Self::Error> {
        let hero_image = body
            .hero_image_camel
            .or(body.hero_image_snake)
            .ok_or_else(|| "missing field `heroImage`".to_string())?;
        Ok(Self {
            title: body.title,
            subtitle: body.subtitle,
            mission: body.mission,
            quote: body.quote,
            hero_image,
        })
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_SITE_TITLE.to_string(),
            subtitle: DEFAULT_SITE_SUBTITLE.to_string(),
            mission: DEFAULT_SITE_MISSION.to_string(),
            quote: DEFAULT_SITE_QUOTE.to_string(),
            hero_image: DEFAULT_HERO_IMAGE.to_string(),
        }
    }
}

/// Criteria for listing posts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostQuery {
    /// Only return posts with `published = true`.
    #[serde(rename = "published")]
    pub published_only: bool,
    /// Case-insensitive title substring; empty matches everything.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search: String,
}

impl PostQuery {
    #[must_use]
    pub fn new(published_only: bool, search: impl Into<String>) -> Self {
        Self {
            published_only,
            search: search.into(),
        }
    }

    /// Whether `post` satisfies both the visibility and title criteria.
    #[must_use]
    pub fn matches(&self, post: &Post) -> bool {
        title_matches(&post.title, &self.search) && (!self.published_only || post.published)
    }
}

/// Case-insensitive substring test used for title search.
#[must_use]
pub fn title_matches(title: &str, search: &str) -> bool {
    search.is_empty() || title.to_lowercase().contains(&search.to_lowercase())
}
