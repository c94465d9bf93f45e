//! Typed client for the fiksi forum API
//!
//! `client` holds the caching adapter, `transport` the HTTP layer. The
//! remaining modules bind individual endpoints as methods on `ApiClient`,
//! each choosing whether its reads are cacheable and which cached responses
//! its mutations make stale.

pub mod auth;
pub mod categories;
pub mod client;
pub mod comments;
pub mod error;
pub mod homepage;
pub mod leaderboard;
pub mod posts;
pub mod profile;
pub mod quizzes;
pub mod subjects;
pub mod transport;

pub use client::{ApiClient, CachePolicy};
pub use error::ApiError;
pub use transport::{ApiRequest, HttpTransport, Method, Transport, DEFAULT_API_URL};

use serde::{Deserialize, Serialize};

/// A user's rank tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankInfo {
    pub name: String,
    pub icon: String,
    /// Contribution points needed to reach this rank
    pub min_cp: i64,
}

/// Minimal author shape embedded in taxonomy post lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub username: String,
    pub avatar_url: Option<String>,
}

/// Post summary embedded in category and subject post lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
    pub author: Option<AuthorSummary>,
}
