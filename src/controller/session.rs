use crate::db::Post;

/// What the editor pane is currently bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Editor {
    #[default]
    Closed,
    /// Editing a post; id 0 means a new draft.
    Post(Post),
    Settings,
}

/// Transient, process-local UI session state.
///
/// While `admin` is false, `show_only_published` is always true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub(super) admin: bool,
    pub(super) show_admin_login: bool,
    pub(super) password_input: String,
    pub(super) search: String,
    pub(super) show_only_published: bool,
    pub(super) editor: Editor,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            admin: false,
            show_admin_login: false,
            password_input: String::new(),
            search: String::new(),
            show_only_published: true,
            editor: Editor::Closed,
        }
    }
}

impl Session {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    #[must_use]
    pub fn show_admin_login(&self) -> bool {
        self.show_admin_login
    }

    #[must_use]
    pub fn password_input(&self) -> &str {
        &self.password_input
    }

    #[must_use]
    pub fn search(&self) -> &str {
        &self.search
    }

    #[must_use]
    pub fn show_only_published(&self) -> bool {
        self.show_only_published
    }

    #[must_use]
    pub fn editor(&self) -> &Editor {
        &self.editor
    }
}
