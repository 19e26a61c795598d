//! User endpoints: authentication, profile fetch, favorites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::story::Story;
use crate::user::CurrentUser;

use super::stories::TokenBody;
use super::{check_status, ApiClient, ApiError};

impl ApiClient {
    /// Authenticate and return the account with its token.
    ///
    /// `POST /login`
    pub async fn login(&self, username: &str, password: &str) -> Result<CurrentUser, ApiError> {
        self.authenticate("/login", username, password, None).await
    }

    /// Create an account and return it logged in.
    ///
    /// `POST /signup`
    pub async fn signup(
        &self,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<CurrentUser, ApiError> {
        self.authenticate("/signup", username, password, Some(name)).await
    }

    /// Fetch a user with favorites and own stories, using an existing token.
    /// This is the resume path for a saved session; an expired token comes
    /// back as [`ApiError::Rejected`].
    ///
    /// `GET /users/{username}`
    pub async fn user(&self, token: &str, username: &str) -> Result<CurrentUser, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/users/{username}")))
            .query(&[("token", token)])
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let response = check_status(response).await?;

        let parsed = response
            .json::<UserEnvelope>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        debug!(username = %parsed.user.username, "fetched user");
        Ok(parsed.user.into_current(token.to_string()))
    }

    /// Mark a story as a favorite of `username`.
    ///
    /// `POST /users/{username}/favorites/{story_id}`
    pub async fn add_favorite(
        &self,
        token: &str,
        username: &str,
        story_id: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .http()
            .post(self.url(&format!("/users/{username}/favorites/{story_id}")))
            .json(&TokenBody { token })
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        check_status(response).await?;

        debug!(%username, %story_id, "favorite added");
        Ok(())
    }

    /// Remove a story from the favorites of `username`.
    ///
    /// `DELETE /users/{username}/favorites/{story_id}`
    pub async fn remove_favorite(
        &self,
        token: &str,
        username: &str,
        story_id: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .http()
            .delete(self.url(&format!("/users/{username}/favorites/{story_id}")))
            .json(&TokenBody { token })
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        check_status(response).await?;

        debug!(%username, %story_id, "favorite removed");
        Ok(())
    }

    async fn authenticate(
        &self,
        path: &str,
        username: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<CurrentUser, ApiError> {
        let payload = AuthRequest {
            user: Credentials { username, password, name },
        };

        let response = self
            .http()
            .post(self.url(path))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let response = check_status(response).await?;

        let parsed = response
            .json::<AuthResponse>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        debug!(username = %parsed.user.username, endpoint = path, "authenticated");
        Ok(parsed.user.into_current(parsed.token))
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    user: Credentials<'a>,
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    user: UserWire,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: UserWire,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserWire {
    username: String,
    name: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    favorites: Vec<Story>,
    #[serde(default)]
    stories: Vec<Story>,
}

impl UserWire {
    fn into_current(self, token: String) -> CurrentUser {
        CurrentUser {
            username: self.username,
            name: self.name,
            token,
            created_at: self.created_at,
            favorites: self.favorites,
            own_stories: self.stories,
        }
    }
}
