//! Subjects, the finer-grained taxonomy under categories

use serde::{Deserialize, Serialize};

use super::client::{ApiClient, CachePolicy};
use super::error::ApiError;
use super::transport::{Method, Transport};
use super::PostSummary;
use crate::cache::paginated_endpoint;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub academic_category_id: String,
    pub icon: Option<String>,
    pub post_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectListResponse {
    pub subjects: Vec<Subject>,
    pub total: u64,
}

/// A category with its subjects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGrouping {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedSubjectsResponse {
    pub categories: Vec<CategoryGrouping>,
    pub total_categories: u64,
    pub total_subjects: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRef {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub academic_category_id: String,
}

/// One page of a subject's posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectPostsResponse {
    pub subject: SubjectRef,
    pub posts: Vec<PostSummary>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T: Transport> ApiClient<T> {
    /// Fetches every subject
    pub async fn get_subjects(&self, policy: CachePolicy) -> Result<SubjectListResponse, ApiError> {
        self.get("/subjects/", None, policy).await
    }

    /// Fetches subjects grouped under their categories
    pub async fn get_grouped_subjects(
        &self,
        policy: CachePolicy,
    ) -> Result<GroupedSubjectsResponse, ApiError> {
        self.get("/subjects/grouped", None, policy).await
    }

    /// Fetches one subject by slug
    pub async fn get_subject(&self, slug: &str, policy: CachePolicy) -> Result<Subject, ApiError> {
        self.get(&format!("/subjects/{}", slug), None, policy).await
    }

    /// Fetches one page of a subject's posts; not cached, like category pages
    pub async fn get_posts_by_subject(
        &self,
        slug: &str,
        page: u32,
        limit: u32,
    ) -> Result<SubjectPostsResponse, ApiError> {
        self.send::<_, ()>(
            Method::Get,
            &paginated_endpoint(&format!("/subjects/{}/posts", slug), page, limit),
            None,
            None,
        )
        .await
    }
}
