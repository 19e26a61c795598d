//! The logged-in user: profile fields, auth token, and the two story
//! collections the client keeps membership bookkeeping on.

use chrono::{DateTime, Utc};

use crate::story::Story;

/// The authenticated account, mirrored from the API user payload plus the
/// token returned at login/signup.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub username: String,
    /// Display name, used as the author of submitted stories.
    pub name: String,
    /// Opaque auth token sent with every authenticated call.
    pub token: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Stories this user has favorited, full records as the API returns them.
    pub favorites: Vec<Story>,
    /// Stories this user has posted.
    pub own_stories: Vec<Story>,
}

impl CurrentUser {
    pub fn is_favorite(&self, story_id: &str) -> bool {
        self.favorites.iter().any(|s| s.story_id == story_id)
    }

    pub fn is_own(&self, story_id: &str) -> bool {
        self.own_stories.iter().any(|s| s.story_id == story_id)
    }

    /// Record a favorite locally. Idempotent: favoriting an already-favorite
    /// story does not duplicate it.
    pub fn add_favorite(&mut self, story: Story) {
        if !self.is_favorite(&story.story_id) {
            self.favorites.push(story);
        }
    }

    pub fn remove_favorite(&mut self, story_id: &str) {
        self.favorites.retain(|s| s.story_id != story_id);
    }

    /// Drop `story_id` from both collections after a deletion.
    pub fn forget_story(&mut self, story_id: &str) {
        self.own_stories.retain(|s| s.story_id != story_id);
        self.remove_favorite(story_id);
    }
}
