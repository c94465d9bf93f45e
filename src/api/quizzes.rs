//! Quiz submissions, which award XP, reputation and contribution points

use serde::{Deserialize, Serialize};

use super::client::ApiClient;
use super::error::ApiError;
use super::transport::{Method, Transport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub quiz_id: String,
    pub score: u32,
    pub total: u32,
    pub difficulty: String,
}

/// Outcome of a submitted quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub score: u32,
    pub total: u32,
    pub score_pct: f64,
    pub passed: bool,
    pub event: Option<String>,
    pub xp_gained: i64,
    pub rep_gained: i64,
    pub cp_gained: i64,
    pub leveled_up: bool,
    pub new_level: i64,
    pub message: String,
}

impl<T: Transport> ApiClient<T> {
    /// Submits a quiz score
    ///
    /// On success every view showing the caller's level or reputation is
    /// invalidated.
    pub async fn submit_quiz(
        &self,
        token: &str,
        submission: &QuizSubmission,
    ) -> Result<QuizResult, ApiError> {
        self.mutate(
            Method::Post,
            "/quizzes/submit",
            Some(submission),
            Some(token),
            self.author_view_keys(token),
        )
        .await
    }
}
