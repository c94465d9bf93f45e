//! User profiles and progression

use serde::{Deserialize, Serialize};

use super::client::ApiClient;
use super::error::ApiError;
use super::transport::{Method, Transport};
use super::RankInfo;

/// A user's public profile with level, XP and rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileData {
    pub id: String,
    pub username: String,
    pub real_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub level: i64,
    pub xp_current: i64,
    pub xp_total: i64,
    pub xp_to_next_level: i64,
    pub reputation: i64,
    pub cp_total: i64,
    pub rank: RankInfo,
    pub cp_to_next_rank: Option<i64>,
}

/// Profile fields to change; only set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl<T: Transport> ApiClient<T> {
    /// Fetches a profile by username
    pub async fn get_profile(&self, username: &str) -> Result<ProfileData, ApiError> {
        self.send::<_, ()>(Method::Get, &format!("/profile/{}", username), None, None)
            .await
    }

    /// Updates the caller's profile
    ///
    /// Post lists, the homepage and leaderboard rows show the username and
    /// avatar, so those views are invalidated.
    pub async fn update_profile(
        &self,
        token: &str,
        payload: &ProfileUpdatePayload,
    ) -> Result<ProfileData, ApiError> {
        self.mutate(
            Method::Patch,
            "/profile/me",
            Some(payload),
            Some(token),
            self.author_view_keys(token),
        )
        .await
    }
}
