//! Comments
//!
//! Comment threads are always fetched fresh. Accepting or upvoting a comment
//! awards reputation, so those calls drop the cached leaderboard and the post
//! views that show author reputation and rank.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::client::ApiClient;
use super::error::ApiError;
use super::transport::{Method, Transport};
use super::RankInfo;

/// Author details embedded in a comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub username: String,
    pub avatar_url: Option<String>,
    pub real_name: Option<String>,
    pub level: i64,
    pub reputation: i64,
    pub cp_total: i64,
    pub rank: RankInfo,
}

/// A comment on a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    pub content: String,
    pub is_accepted: bool,
    pub created_at: String,
    pub author_id: String,
    pub upvote_count: i64,
    pub has_upvoted: bool,
    pub author: Option<CommentAuthor>,
}

#[derive(Debug, Serialize)]
struct NewComment<'a> {
    content: &'a str,
}

impl<T: Transport> ApiClient<T> {
    /// Fetches the comments on a post
    pub async fn get_comments(
        &self,
        post_id: &str,
        token: Option<&str>,
    ) -> Result<Vec<Comment>, ApiError> {
        self.send::<_, ()>(
            Method::Get,
            &format!("/posts/{}/comments", post_id),
            None,
            token,
        )
        .await
    }

    /// Adds a comment to a post
    pub async fn create_comment(
        &self,
        token: &str,
        post_id: &str,
        content: &str,
    ) -> Result<Comment, ApiError> {
        self.send(
            Method::Post,
            &format!("/posts/{}/comments", post_id),
            Some(&NewComment { content }),
            Some(token),
        )
        .await
    }

    /// Marks a comment as the accepted answer
    pub async fn accept_comment(&self, token: &str, comment_id: &str) -> Result<Comment, ApiError> {
        self.mutate::<_, ()>(
            Method::Patch,
            &format!("/comments/{}/accept", comment_id),
            None,
            Some(token),
            self.author_view_keys(token),
        )
        .await
    }

    /// Upvotes a comment
    pub async fn upvote_comment(&self, token: &str, comment_id: &str) -> Result<Comment, ApiError> {
        self.mutate::<_, ()>(
            Method::Post,
            &format!("/comments/{}/upvote", comment_id),
            None,
            Some(token),
            self.author_view_keys(token),
        )
        .await
    }

    /// Deletes a comment
    pub async fn delete_comment(&self, token: &str, comment_id: &str) -> Result<(), ApiError> {
        self.send::<IgnoredAny, ()>(
            Method::Delete,
            &format!("/comments/{}", comment_id),
            None,
            Some(token),
        )
        .await?;
        Ok(())
    }
}
