//! The in-memory mirror of server state and its per-operation bookkeeping.
//!
//! [`Session`] owns the API client, the story feed, and the logged-in user
//! (when any), and applies the same direct mutations the server performed:
//! a successful submit prepends to the feed and joins the user's own
//! stories, a delete removes the id everywhere, a favorite toggle updates
//! the favorites collection. There is no reconciliation beyond re-fetching;
//! last write wins.
//!
//! The session also remembers which view was rendered last, because
//! index-based commands (`star 3`, `delete 3`) target the list the user is
//! looking at.

pub mod persist;

pub use persist::{SavedSession, SessionStore};

use std::path::Path;

use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::error::AppError;
use crate::story::{Story, StoryDraft, StoryList};
use crate::user::CurrentUser;

/// Which story list was rendered last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Feed,
    Favorites,
    Own,
}

pub struct Session {
    api: ApiClient,
    store: SessionStore,
    user: Option<CurrentUser>,
    stories: StoryList,
    view: View,
}

impl Session {
    pub fn new(api: ApiClient, work_dir: &Path) -> Self {
        Self {
            api,
            store: SessionStore::new(work_dir),
            user: None,
            stories: StoryList::new(),
            view: View::Feed,
        }
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        self.user.as_ref()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    /// The stories of the current view, in display order.
    pub fn visible(&self) -> &[Story] {
        match self.view {
            View::Feed => self.stories.as_slice(),
            View::Favorites => self.user.as_ref().map(|u| u.favorites.as_slice()).unwrap_or(&[]),
            View::Own => self.user.as_ref().map(|u| u.own_stories.as_slice()).unwrap_or(&[]),
        }
    }

    /// Resolve a 1-based index into the current view.
    pub fn story_at(&self, n: usize) -> Result<&Story, AppError> {
        n.checked_sub(1)
            .and_then(|i| self.visible().get(i))
            .ok_or_else(|| AppError::Invalid(format!("no story numbered {n} in the current view")))
    }

    // ── Startup / auth ───────────────────────────────────────────────────────

    /// Resume a saved login, if one exists. Returns `true` when logged in.
    ///
    /// A rejected (expired) token clears the saved session and resumes logged
    /// out; an unreadable session file is cleared the same way. Transport
    /// failures propagate so the caller can warn without dropping the token.
    pub async fn resume(&mut self) -> Result<bool, AppError> {
        let saved = match self.store.load() {
            Ok(saved) => saved,
            Err(e) => {
                warn!("unreadable session file ({e}), clearing");
                self.store.clear()?;
                None
            }
        };
        let Some(saved) = saved else { return Ok(false) };

        match self.api.user(&saved.token, &saved.username).await {
            Ok(user) => {
                info!(username = %user.username, "resumed saved session");
                self.user = Some(user);
                Ok(true)
            }
            Err(ApiError::Rejected(msg)) => {
                warn!(%msg, "saved session rejected by server, clearing");
                self.store.clear()?;
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), AppError> {
        let user = self.api.login(username, password).await?;
        self.store.save(&SavedSession {
            username: user.username.clone(),
            token: user.token.clone(),
        })?;
        info!(username = %user.username, "logged in");
        self.user = Some(user);
        Ok(())
    }

    pub async fn signup(
        &mut self,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<(), AppError> {
        let user = self.api.signup(username, password, name).await?;
        self.store.save(&SavedSession {
            username: user.username.clone(),
            token: user.token.clone(),
        })?;
        info!(username = %user.username, "account created");
        self.user = Some(user);
        Ok(())
    }

    pub fn logout(&mut self) -> Result<(), AppError> {
        self.user = None;
        self.view = View::Feed;
        self.store.clear()?;
        info!("logged out");
        Ok(())
    }

    // ── Story operations ─────────────────────────────────────────────────────

    /// Re-fetch the whole feed. Returns the story count.
    pub async fn refresh_stories(&mut self) -> Result<usize, AppError> {
        let stories = self.api.stories().await?;
        self.stories.replace(stories);
        Ok(self.stories.len())
    }

    /// Validate and submit a draft, then mirror the server's new record:
    /// prepended to the feed (exactly once) and appended to own stories.
    pub async fn submit_story(&mut self, title: &str, url: &str) -> Result<Story, AppError> {
        let (token, author) = {
            let user = self.current_user()?;
            (user.token.clone(), user.name.clone())
        };

        let draft = StoryDraft {
            author,
            title: title.trim().to_string(),
            url: url.trim().to_string(),
        };
        let errors = draft.validate();
        if !errors.is_empty() {
            return Err(AppError::Invalid(errors.join(" ")));
        }

        let story = self.api.create_story(&token, &draft).await?;
        self.apply_submitted(story.clone());
        Ok(story)
    }

    /// Delete one of the user's own stories and drop it from the feed, the
    /// own-stories list, and the favorites.
    pub async fn delete_story(&mut self, story_id: &str) -> Result<(), AppError> {
        let token = {
            let user = self.current_user()?;
            if !user.is_own(story_id) {
                return Err(AppError::Invalid("you can only delete your own stories".into()));
            }
            user.token.clone()
        };

        self.api.delete_story(&token, story_id).await?;
        self.apply_deleted(story_id);
        Ok(())
    }

    /// Flip the favorite state of a story. Returns the new state
    /// (`true` = now a favorite).
    pub async fn toggle_favorite(&mut self, story_id: &str) -> Result<bool, AppError> {
        let (token, username, was_favorite) = {
            let user = self.current_user()?;
            (user.token.clone(), user.username.clone(), user.is_favorite(story_id))
        };

        if was_favorite {
            self.api.remove_favorite(&token, &username, story_id).await?;
            if let Some(user) = self.user.as_mut() {
                user.remove_favorite(story_id);
            }
            Ok(false)
        } else {
            let story = self
                .stories
                .find(story_id)
                .cloned()
                .or_else(|| {
                    self.user
                        .as_ref()
                        .and_then(|u| u.own_stories.iter().find(|s| s.story_id == story_id).cloned())
                })
                .ok_or_else(|| AppError::Invalid(format!("no story with id {story_id}")))?;

            self.api.add_favorite(&token, &username, story_id).await?;
            if let Some(user) = self.user.as_mut() {
                user.add_favorite(story);
            }
            Ok(true)
        }
    }

    // ── Local bookkeeping (no network) ───────────────────────────────────────

    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.user
            .as_ref()
            .ok_or_else(|| AppError::Invalid("login required (try 'login' or 'signup')".into()))
    }

    fn apply_submitted(&mut self, story: Story) {
        self.stories.prepend(story.clone());
        if let Some(user) = self.user.as_mut() {
            user.own_stories.push(story);
        }
    }

    fn apply_deleted(&mut self, story_id: &str) {
        self.stories.remove(story_id);
        if let Some(user) = self.user.as_mut() {
            user.forget_story(story_id);
        }
    }
}
