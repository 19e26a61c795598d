//! Story endpoints: list, create, delete.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::story::{Story, StoryDraft};

use super::{check_status, ApiClient, ApiError};

impl ApiClient {
    /// Fetch the whole feed, in server order (newest first).
    ///
    /// `GET /stories`
    pub async fn stories(&self) -> Result<Vec<Story>, ApiError> {
        let response = self
            .http()
            .get(self.url("/stories"))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let response = check_status(response).await?;

        let parsed = response
            .json::<StoriesResponse>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        debug!(count = parsed.stories.len(), "fetched story feed");
        Ok(parsed.stories)
    }

    /// Submit a new story and return the record the server created.
    ///
    /// `POST /stories`
    pub async fn create_story(&self, token: &str, draft: &StoryDraft) -> Result<Story, ApiError> {
        let payload = CreateStoryRequest { token, story: draft };

        let response = self
            .http()
            .post(self.url("/stories"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let response = check_status(response).await?;

        let parsed = response
            .json::<StoryEnvelope>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        debug!(story_id = %parsed.story.story_id, "story created");
        Ok(parsed.story)
    }

    /// Delete a story by id. Deleting a story that is not yours (or no longer
    /// exists) surfaces as [`ApiError::Rejected`].
    ///
    /// `DELETE /stories/{id}`
    pub async fn delete_story(&self, token: &str, story_id: &str) -> Result<(), ApiError> {
        let response = self
            .http()
            .delete(self.url(&format!("/stories/{story_id}")))
            .json(&TokenBody { token })
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        check_status(response).await?;

        debug!(%story_id, "story deleted");
        Ok(())
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StoriesResponse {
    stories: Vec<Story>,
}

#[derive(Debug, Deserialize)]
struct StoryEnvelope {
    story: Story,
}

#[derive(Debug, Serialize)]
struct CreateStoryRequest<'a> {
    token: &'a str,
    story: &'a StoryDraft,
}

#[derive(Debug, Serialize)]
pub(super) struct TokenBody<'a> {
    pub token: &'a str,
}
