//! Posts
//!
//! Post lists and single posts are cacheable. Creating, editing or deleting a
//! post drops the post's own entry, the in-bounds pages of the public list and
//! of the author's own list, and the homepage feed. Upvotes also drop the
//! leaderboard, since they change reputation.
//!
//! Posts embed their author's name, avatar, level and rank, so profile edits
//! and anything awarding reputation drop the list views as well (see
//! `author_view_keys`).

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::client::{ApiClient, CachePolicy};
use super::error::ApiError;
use super::homepage::HOMEPAGE_ENDPOINT;
use super::leaderboard::leaderboard_keys;
use super::transport::{Method, Transport};
use super::RankInfo;
use crate::cache::{cache_key, paginated_endpoint};

/// Public post list
pub const POSTS_BASE: &str = "/posts/";

/// The caller's own posts
pub const MY_POSTS_BASE: &str = "/posts/my";

/// Page size requested when none is given
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Author details embedded in a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub username: String,
    pub real_name: Option<String>,
    pub avatar_url: Option<String>,
    pub level: i64,
    pub reputation: i64,
    pub cp_total: i64,
    pub rank: RankInfo,
}

/// Subject a post is filed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSubject {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub academic_category_id: String,
}

/// A forum post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
    pub author_id: String,
    pub author: Option<PostAuthor>,
    pub subject_id: Option<String>,
    #[serde(default)]
    pub upvote_count: Option<i64>,
    #[serde(default)]
    pub has_upvoted: Option<bool>,
    #[serde(default)]
    pub subject: Option<PostSubject>,
}

/// One page of posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<Post>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Body of a create request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCreatePayload {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
}

/// Body of an update request; only set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUpdatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
}

/// Upvote state of a post for the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUpvoteStatus {
    pub upvote_count: i64,
    pub is_upvoted: bool,
}

/// Endpoint of a single post
pub fn post_endpoint(id: &str) -> String {
    format!("/posts/{}", id)
}

impl<T: Transport> ApiClient<T> {
    /// Fetches one page of published posts
    pub async fn get_posts(
        &self,
        page: u32,
        limit: u32,
        policy: CachePolicy,
    ) -> Result<PostListResponse, ApiError> {
        self.get(&paginated_endpoint(POSTS_BASE, page, limit), None, policy)
            .await
    }

    /// Fetches one page of the caller's own posts
    ///
    /// Cached per credential, so two users never see each other's list.
    pub async fn get_my_posts(
        &self,
        token: &str,
        page: u32,
        limit: u32,
        policy: CachePolicy,
    ) -> Result<PostListResponse, ApiError> {
        self.get(
            &paginated_endpoint(MY_POSTS_BASE, page, limit),
            Some(token),
            policy,
        )
        .await
    }

    /// Fetches a single post
    pub async fn get_post(&self, id: &str, policy: CachePolicy) -> Result<Post, ApiError> {
        self.get(&post_endpoint(id), None, policy).await
    }

    /// Creates a post
    pub async fn create_post(
        &self,
        token: &str,
        payload: &PostCreatePayload,
    ) -> Result<Post, ApiError> {
        let stale = self.post_list_keys(token);
        self.mutate(Method::Post, POSTS_BASE, Some(payload), Some(token), stale)
            .await
    }

    /// Updates the fields set in `payload`
    pub async fn update_post(
        &self,
        token: &str,
        id: &str,
        payload: &PostUpdatePayload,
    ) -> Result<Post, ApiError> {
        let stale = self.post_keys(token, id);
        self.mutate(
            Method::Put,
            &post_endpoint(id),
            Some(payload),
            Some(token),
            stale,
        )
        .await
    }

    /// Deletes a post
    pub async fn delete_post(&self, token: &str, id: &str) -> Result<(), ApiError> {
        let stale = self.post_keys(token, id);
        self.mutate::<IgnoredAny, ()>(Method::Delete, &post_endpoint(id), None, Some(token), stale)
            .await?;
        Ok(())
    }

    /// Fetches the caller's upvote state for a post
    pub async fn get_upvote_status(
        &self,
        post_id: &str,
        token: Option<&str>,
    ) -> Result<PostUpvoteStatus, ApiError> {
        self.send::<_, ()>(
            Method::Get,
            &format!("/posts/{}/upvote", post_id),
            None,
            token,
        )
        .await
    }

    /// Toggles the caller's upvote on a post
    pub async fn toggle_upvote(
        &self,
        token: &str,
        post_id: &str,
    ) -> Result<PostUpvoteStatus, ApiError> {
        let mut stale = self.post_keys(token, post_id);
        stale.extend(leaderboard_keys(self.bounds()));

        self.mutate::<_, ()>(
            Method::Post,
            &format!("/posts/{}/upvote", post_id),
            None,
            Some(token),
            stale,
        )
        .await
    }

    /// List views a new or removed post can appear in
    fn post_list_keys(&self, token: &str) -> Vec<String> {
        let mut keys = self.bounds().paginated_keys(POSTS_BASE, None);
        keys.extend(self.bounds().paginated_keys(MY_POSTS_BASE, Some(token)));
        keys.push(cache_key(HOMEPAGE_ENDPOINT, None));
        keys
    }

    /// Every cached view that shows author details: post lists, the
    /// homepage and the leaderboard
    ///
    /// Used by mutations that change a user's name, avatar or progression.
    /// Post detail entries and category or subject pages also embed the
    /// author but cannot be enumerated here; they refresh when their TTL
    /// lapses.
    pub(crate) fn author_view_keys(&self, token: &str) -> Vec<String> {
        let mut keys = self.post_list_keys(token);
        keys.extend(leaderboard_keys(self.bounds()));
        keys
    }

    /// The post's own entry plus every list view it can appear in
    fn post_keys(&self, token: &str, id: &str) -> Vec<String> {
        let mut keys = vec![cache_key(&post_endpoint(id), None)];
        keys.extend(self.post_list_keys(token));
        keys
    }
}
