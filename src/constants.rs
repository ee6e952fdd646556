//! Shared constants used across the application.

/// Row id of the singleton site settings record.
///
/// Every settings upsert targets this row, so exactly one logical record exists.
pub const SETTINGS_ROW_ID: i64 = 1;

/// Author assigned to freshly opened post drafts.
pub const DEFAULT_AUTHOR: &str = "EGA Team";

pub const DEFAULT_SITE_TITLE: &str = "Ethiopian Games Association Blog";
pub const DEFAULT_SITE_SUBTITLE: &str =
    "Sharing stories, insights, and updates about games, gamification, and the community.";
pub const DEFAULT_SITE_MISSION: &str = "Games and play are a language that the world can speak; through games you can create, connect and cultivate economy, culture, and values.";
pub const DEFAULT_SITE_QUOTE: &str = "Games teach resilience, discipline, and continuous growth \u{2014} elevating us to become better humans through determination and excellence.";
pub const DEFAULT_HERO_IMAGE: &str =
    "https://images.pexels.com/photos/194511/pexels-photo-194511.jpeg?auto=compress&cs=tinysrgb&w=1600";

/// Confirmation question shown before a post is deleted.
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this post?";
