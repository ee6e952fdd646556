//! Client-side blog state.
//!
//! [`BlogController`] owns the canonical in-memory post list, the site
//! settings and the session flags, and sequences every read and write
//! against the resource endpoints through a [`BlogApi`]. Failures are logged,
//! shown through the [`Prompt`], and never leave a half-applied mutation.

mod prompt;
mod session;

pub use prompt::Prompt;
pub use session::{Editor, Session};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::client::{BlogApi, ClientError};
use crate::constants::DELETE_CONFIRMATION;
use crate::db::{title_matches, Post, PostQuery, SiteSettings};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("{context}: {source}")]
    Request {
        context: &'static str,
        #[source]
        source: ClientError,
    },
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Admin access required")]
    AdminRequired,
}

impl ControllerError {
    fn request(context: &'static str) -> impl FnOnce(ClientError) -> Self {
        move |source| Self::Request { context, source }
    }
}

/// A posts fetch that has been issued but not yet applied.
///
/// Tokens increase with every issued fetch; a response is only applied if its
/// token is newer than the last one applied, so a slow stale response can
/// never overwrite a fresher list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostsRefresh {
    token: u64,
    query: PostQuery,
}

impl PostsRefresh {
    #[must_use]
    pub fn query(&self) -> &PostQuery {
        &self.query
    }
}

pub struct BlogController<A, P> {
    api: A,
    prompt: P,
    posts: Vec<Post>,
    settings: SiteSettings,
    session: Session,
    loading: bool,
    issued_token: u64,
    applied_token: u64,
}

impl<A: BlogApi, P: Prompt> BlogController<A, P> {
    /// A controller with an empty post list and the default site settings.
    pub fn new(api: A, prompt: P) -> Self {
        Self {
            api,
            prompt,
            posts: Vec::new(),
            settings: SiteSettings::default(),
            session: Session::default(),
            loading: false,
            issued_token: 0,
            applied_token: 0,
        }
    }

    // ========== State ==========

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_admin(&self) -> bool {
        self.session.admin
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn editor(&self) -> &Editor {
        &self.session.editor
    }

    /// Posts whose title contains the search string (case-insensitive) and
    /// that pass the published-only flag, in list order.
    pub fn filtered_posts(&self) -> Vec<&Post> {
        let search = &self.session.search;
        let published_only = self.session.show_only_published;
        self.posts
            .iter()
            .filter(|p| title_matches(&p.title, search) && (!published_only || p.published))
            .collect()
    }

    fn current_query(&self) -> PostQuery {
        PostQuery::new(self.session.show_only_published, self.session.search.clone())
    }

    /// Log, show and hand back an error.
    fn surface(&self, err: ControllerError) -> ControllerError {
        error!("{err}");
        self.prompt.alert(&err.to_string());
        err
    }

    fn require_admin(&self) -> Result<(), ControllerError> {
        if self.session.admin {
            Ok(())
        } else {
            Err(self.surface(ControllerError::AdminRequired))
        }
    }

    // ========== Loading ==========

    /// Initial load: settings once, then the post list.
    ///
    /// # Errors
    ///
    /// Returns the first failure; both fetches are attempted regardless.
    pub async fn load(&mut self) -> Result<(), ControllerError> {
        let settings = self.refresh_settings().await;
        let posts = self.refresh_posts().await;
        settings?;
        posts.map(|_| ())
    }

    /// Issue a posts fetch for the current criteria.
    pub fn begin_posts_refresh(&mut self) -> PostsRefresh {
        self.issued_token += 1;
        PostsRefresh {
            token: self.issued_token,
            query: self.current_query(),
        }
    }

    /// Apply the outcome of a fetch started with [`Self::begin_posts_refresh`].
    ///
    /// Returns `Ok(false)` when the response was stale and discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if a current (non-stale) fetch failed; the list is left as it was.
    pub fn apply_posts_refresh(
        &mut self,
        refresh: PostsRefresh,
        result: Result<Vec<Post>, ClientError>,
    ) -> Result<bool, ControllerError> {
        if refresh.token <= self.applied_token {
            debug!(
                token = refresh.token,
                applied = self.applied_token,
                "Discarding stale posts response"
            );
            return Ok(false);
        }

        match result {
            Ok(posts) => {
                debug!(token = refresh.token, count = posts.len(), "Applied posts response");
                self.applied_token = refresh.token;
                self.posts = posts;
                Ok(true)
            }
            Err(e) => Err(self.surface(ControllerError::request("Error loading posts")(e))),
        }
    }

    /// Fetch the post list for the current flags and replace the in-memory list.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails; the list is left as it was.
    pub async fn refresh_posts(&mut self) -> Result<bool, ControllerError> {
        let refresh = self.begin_posts_refresh();
        self.loading = true;
        let result = self.api.list_posts(refresh.query()).await;
        self.loading = false;
        self.apply_posts_refresh(refresh, result)
    }

    /// Refresh after a successful write. Failures were already surfaced.
    async fn refresh_after_write(&mut self) {
        if let Err(e) = self.refresh_posts().await {
            debug!("Post-write refresh failed: {e}");
        }
    }

    /// Fetch the settings record and replace the in-memory copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails; settings are left as they were.
    pub async fn refresh_settings(&mut self) -> Result<(), ControllerError> {
        match self.api.get_settings().await {
            Ok(settings) => {
                self.settings = settings;
                Ok(())
            }
            Err(e) => Err(self.surface(ControllerError::request("Error loading settings")(e))),
        }
    }

    // ========== Filters ==========

    /// Change the search string, re-fetching posts if it changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the re-fetch fails.
    pub async fn set_search(&mut self, search: impl Into<String>) -> Result<(), ControllerError> {
        let search = search.into();
        if search == self.session.search {
            return Ok(());
        }
        self.session.search = search;
        self.refresh_posts().await.map(|_| ())
    }

    /// Change the published-only flag, re-fetching posts if it changed.
    ///
    /// Outside admin mode the flag is pinned to `true` and requests to clear
    /// it are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the re-fetch fails.
    pub async fn set_show_only_published(&mut self, published_only: bool) -> Result<(), ControllerError> {
        if !published_only && !self.session.admin {
            debug!("Ignoring request to show drafts outside admin mode");
            return Ok(());
        }
        if published_only == self.session.show_only_published {
            return Ok(());
        }
        self.session.show_only_published = published_only;
        self.refresh_posts().await.map(|_| ())
    }

    // ========== Admin session ==========

    pub fn open_login_prompt(&mut self) {
        self.session.show_admin_login = true;
    }

    pub fn close_login_prompt(&mut self) {
        self.session.show_admin_login = false;
    }

    pub fn set_password_input(&mut self, password: impl Into<String>) {
        self.session.password_input = password.into();
    }

    /// Log in with the contents of the password field.
    ///
    /// # Errors
    ///
    /// See [`Self::login`].
    pub async fn submit_login(&mut self) -> Result<(), ControllerError> {
        let candidate = self.session.password_input.clone();
        self.login(&candidate).await
    }

    /// Enter admin mode if `candidate` is the admin password.
    ///
    /// On success the login prompt closes, the password field is cleared and
    /// drafts become visible. On failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::InvalidPassword`] on a mismatch, or a request error.
    pub async fn login(&mut self, candidate: &str) -> Result<(), ControllerError> {
        self.loading = true;
        let verified = self.api.verify_admin(candidate).await;
        self.loading = false;

        match verified {
            Ok(true) => {
                info!("Entered admin mode");
                self.session.admin = true;
                self.session.show_admin_login = false;
                self.session.password_input.clear();
                if let Err(e) = self.set_show_only_published(false).await {
                    debug!("Refresh after login failed: {e}");
                }
                Ok(())
            }
            Ok(false) => {
                warn!("Admin login rejected");
                Err(self.surface(ControllerError::InvalidPassword))
            }
            Err(e) => Err(self.surface(ControllerError::request("Error logging in")(e))),
        }
    }

    /// Leave admin mode: drafts hidden again, any editor closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the re-fetch triggered by the filter change fails.
    /// The session is reset regardless.
    pub async fn logout(&mut self) -> Result<(), ControllerError> {
        info!("Left admin mode");
        self.session.admin = false;
        self.session.editor = Editor::Closed;
        self.set_show_only_published(true).await
    }

    // ========== Editors ==========

    /// Open the post editor on a fresh draft.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::AdminRequired`] outside admin mode.
    pub fn open_new_post(&mut self) -> Result<(), ControllerError> {
        self.require_admin()?;
        self.session.editor = Editor::Post(Post::draft());
        Ok(())
    }

    /// Open the post editor on a copy of a listed post. `Ok(false)` if it is not listed.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::AdminRequired`] outside admin mode.
    pub fn open_post_editor(&mut self, id: i64) -> Result<bool, ControllerError> {
        self.require_admin()?;
        let Some(post) = self.posts.iter().find(|p| p.id == id) else {
            debug!(id, "Post not in local list; editor not opened");
            return Ok(false);
        };
        self.session.editor = Editor::Post(post.clone());
        Ok(true)
    }

    /// Open the settings editor.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::AdminRequired`] outside admin mode.
    pub fn open_settings_editor(&mut self) -> Result<(), ControllerError> {
        self.require_admin()?;
        self.session.editor = Editor::Settings;
        Ok(())
    }

    pub fn close_editor(&mut self) {
        self.session.editor = Editor::Closed;
    }

    // ========== Mutations ==========

    /// Create (id 0) or update a post, then refresh the list and close the post editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; the editor stays open.
    pub async fn save_post(&mut self, draft: Post) -> Result<Post, ControllerError> {
        self.require_admin()?;

        self.loading = true;
        let result = if draft.is_unsaved() {
            self.api
                .create_post(&draft)
                .await
                .map_err(ControllerError::request("Error creating post"))
        } else {
            self.api
                .update_post(draft.id, &draft)
                .await
                .map_err(ControllerError::request("Error updating post"))
        };
        self.loading = false;

        let saved = result.map_err(|e| self.surface(e))?;
        info!(id = saved.id, created = draft.is_unsaved(), "Saved post");

        self.refresh_after_write().await;
        if matches!(self.session.editor, Editor::Post(_)) {
            self.session.editor = Editor::Closed;
        }
        Ok(saved)
    }

    /// Delete a post after the user confirms. `Ok(false)` if they declined.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails; the list is left as it was.
    pub async fn delete_post(&mut self, id: i64) -> Result<bool, ControllerError> {
        self.require_admin()?;
        if !self.prompt.confirm(DELETE_CONFIRMATION) {
            debug!(id, "Delete cancelled");
            return Ok(false);
        }

        self.loading = true;
        let result = self.api.delete_post(id).await;
        self.loading = false;

        result.map_err(|e| self.surface(ControllerError::request("Error deleting post")(e)))?;
        info!(id, "Deleted post");

        self.refresh_after_write().await;
        Ok(true)
    }

    /// Flip a listed post's published flag.
    ///
    /// Posts missing from the local list are skipped without a request or a
    /// message and `Ok(false)` is returned; the list may simply be stale.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn toggle_visibility(&mut self, id: i64) -> Result<bool, ControllerError> {
        self.require_admin()?;
        let Some(post) = self.posts.iter().find(|p| p.id == id) else {
            debug!(id, "Post not in local list; visibility not toggled");
            return Ok(false);
        };
        let updated = Post {
            published: !post.published,
            ..post.clone()
        };

        self.loading = true;
        let result = self.api.update_post(id, &updated).await;
        self.loading = false;

        result.map_err(|e| {
            self.surface(ControllerError::request("Error updating post visibility")(e))
        })?;
        info!(id, published = updated.published, "Toggled post visibility");

        self.refresh_after_write().await;
        Ok(true)
    }

    /// Overwrite the site settings, adopt the stored copy and close the settings editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails; the editor stays open.
    pub async fn save_settings(&mut self, draft: SiteSettings) -> Result<(), ControllerError> {
        self.require_admin()?;

        self.loading = true;
        let result = self.api.save_settings(&draft).await;
        self.loading = false;

        let stored =
            result.map_err(|e| self.surface(ControllerError::request("Error saving settings")(e)))?;
        info!(title = %stored.title, "Saved site settings");

        self.settings = stored;
        if self.session.editor == Editor::Settings {
            self.session.editor = Editor::Closed;
        }
        Ok(())
    }
}
