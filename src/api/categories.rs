//! Academic categories

use serde::{Deserialize, Serialize};

use super::client::{ApiClient, CachePolicy};
use super::error::ApiError;
use super::transport::{Method, Transport};
use super::PostSummary;
use crate::cache::paginated_endpoint;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub post_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
}

/// One page of a category's posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPostsResponse {
    pub category: CategoryRef,
    pub posts: Vec<PostSummary>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T: Transport> ApiClient<T> {
    /// Fetches every category
    pub async fn get_categories(
        &self,
        policy: CachePolicy,
    ) -> Result<CategoryListResponse, ApiError> {
        self.get("/categories/", None, policy).await
    }

    /// Fetches one category by slug
    pub async fn get_category(&self, slug: &str, policy: CachePolicy) -> Result<Category, ApiError> {
        self.get(&format!("/categories/{}", slug), None, policy).await
    }

    /// Fetches one page of a category's posts
    ///
    /// Not cached: a new post's category is not known when it is created, so
    /// these pages could not be invalidated.
    pub async fn get_posts_by_category(
        &self,
        slug: &str,
        page: u32,
        limit: u32,
    ) -> Result<CategoryPostsResponse, ApiError> {
        self.send::<_, ()>(
            Method::Get,
            &paginated_endpoint(&format!("/categories/{}/posts", slug), page, limit),
            None,
            None,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::create_test_client;
    use serde_json::json;

    #[tokio::test]
    async fn test_categories_are_cached() {
        let (client, _clock) = create_test_client();
        client.transport().respond(
            Method::Get,
            "/categories/",
            json!({"categories": [{
                "id": "c1", "name": "Matematika", "slug": "matematika",
                "description": null, "icon": null, "post_count": 4
            }], "total": 1}),
        );

        let first = client.get_categories(CachePolicy::enabled()).await.unwrap();
        let second = client.get_categories(CachePolicy::enabled()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.categories[0].slug, "matematika");
        assert_eq!(client.transport().call_count(Method::Get, "/categories/"), 1);
    }

    #[tokio::test]
    async fn test_posts_by_category_are_always_fetched() {
        let (client, _clock) = create_test_client();
        let endpoint = "/categories/matematika/posts?page=1&limit=10";
        client.transport().respond(
            Method::Get,
            endpoint,
            json!({
                "category": {"id": "c1", "name": "Matematika", "slug": "matematika", "icon": null},
                "posts": [], "total": 0, "page": 1, "limit": 10
            }),
        );

        client.get_posts_by_category("matematika", 1, 10).await.unwrap();
        client.get_posts_by_category("matematika", 1, 10).await.unwrap();

        assert_eq!(client.transport().call_count(Method::Get, endpoint), 2);
        assert_eq!(client.cache_usage().0, 0);
    }
}
