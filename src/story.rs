//! Story domain types: the flat records mirrored from API responses and the
//! ordered in-memory list the client mutates between re-fetches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-submitted link with title/author/URL metadata.
///
/// Field names match the API wire shape (camelCase) so the record can be
/// decoded straight off the user and story payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub story_id: String,
    pub title: String,
    pub author: String,
    pub url: String,
    /// Username of the account that posted the story.
    pub username: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Story {
    /// Host portion of the story URL for display, e.g. `"example.com"`.
    /// Falls back to the raw URL string when it does not parse.
    pub fn host_name(&self) -> String {
        reqwest::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .unwrap_or_else(|| self.url.clone())
    }
}

/// Client-side input for a story submission. `author` is filled from the
/// logged-in user's display name, never typed by the user.
#[derive(Debug, Clone, Serialize)]
pub struct StoryDraft {
    pub author: String,
    pub title: String,
    pub url: String,
}

impl StoryDraft {
    /// Blank-field check mirroring the submit form: one message per blank
    /// field, empty when the draft is submittable.
    pub fn validate(&self) -> Vec<&'static str> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push("Title cannot be blank.");
        }
        if self.url.trim().is_empty() {
            errors.push("URL cannot be blank.");
        }
        errors
    }
}

/// The ordered story feed, fetched wholesale and held for the session.
///
/// Order is the server's feed order (newest first). The one invariant is
/// uniqueness of `story_id`: [`StoryList::prepend`] moves an already-present
/// id to the front instead of duplicating it.
#[derive(Debug, Default)]
pub struct StoryList {
    stories: Vec<Story>,
}

impl StoryList {
    pub fn new() -> Self {
        Self { stories: Vec::new() }
    }

    /// Replace the whole list with a fresh server fetch.
    pub fn replace(&mut self, stories: Vec<Story>) {
        self.stories = stories;
        self.dedup_by_id();
    }

    /// Insert `story` at the front. If a story with the same id is already
    /// present it is removed first, so the new story appears exactly once.
    pub fn prepend(&mut self, story: Story) {
        self.remove(&story.story_id);
        self.stories.insert(0, story);
    }

    /// Remove the story with `story_id`, returning it if it was present.
    pub fn remove(&mut self, story_id: &str) -> Option<Story> {
        let idx = self.stories.iter().position(|s| s.story_id == story_id)?;
        Some(self.stories.remove(idx))
    }

    pub fn find(&self, story_id: &str) -> Option<&Story> {
        self.stories.iter().find(|s| s.story_id == story_id)
    }

    pub fn as_slice(&self) -> &[Story] {
        &self.stories
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    // Keeps the first occurrence of each id; a defense against servers that
    // page the same story twice.
    fn dedup_by_id(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.stories.retain(|s| seen.insert(s.story_id.clone()));
    }
}

#[cfg(test)]
pub(crate) fn story(id: &str, title: &str, username: &str) -> Story {
    Story {
        story_id: id.to_string(),
        title: title.to_string(),
        author: "Test Author".to_string(),
        url: format!("http://example.com/{id}"),
        username: username.to_string(),
        created_at: None,
    }
}
