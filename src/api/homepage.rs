//! Homepage feed

use serde::{Deserialize, Serialize};

use super::client::{ApiClient, CachePolicy};
use super::error::ApiError;
use super::transport::Transport;

/// Endpoint of the homepage feed
pub const HOMEPAGE_ENDPOINT: &str = "/homepage/";

/// Post teaser shown on the homepage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomepagePost {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: String,
    pub author: Option<String>,
    pub image_url: Option<String>,
}

/// The homepage feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomepageFeed {
    pub status: String,
    pub latest_post: Option<HomepagePost>,
    #[serde(default)]
    pub popular_posts: Vec<HomepagePost>,
}

impl<T: Transport> ApiClient<T> {
    /// Fetches the homepage feed
    pub async fn get_homepage(&self, policy: CachePolicy) -> Result<HomepageFeed, ApiError> {
        self.get(HOMEPAGE_ENDPOINT, None, policy).await
    }
}
