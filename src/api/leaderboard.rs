//! Leaderboard

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::client::{ApiClient, CachePolicy};
use super::error::ApiError;
use super::transport::Transport;
use crate::cache::{cache_key, InvalidationBounds};

/// Leaderboard size requested when none is given
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 20;

/// Column the leaderboard is ranked by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LeaderboardSort {
    #[default]
    Reputation,
    XpTotal,
    CpTotal,
    Level,
}

impl LeaderboardSort {
    /// Every sort order, for invalidation
    pub const ALL: [LeaderboardSort; 4] = [
        LeaderboardSort::Reputation,
        LeaderboardSort::XpTotal,
        LeaderboardSort::CpTotal,
        LeaderboardSort::Level,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderboardSort::Reputation => "reputation",
            LeaderboardSort::XpTotal => "xp_total",
            LeaderboardSort::CpTotal => "cp_total",
            LeaderboardSort::Level => "level",
        }
    }
}

impl fmt::Display for LeaderboardSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeaderboardSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// One ranked user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank_position: u32,
    pub user_id: String,
    pub username: String,
    pub real_name: Option<String>,
    pub avatar_url: Option<String>,
    pub level: i64,
    pub xp_total: i64,
    pub reputation: i64,
    pub cp_total: i64,
    pub rank_name: String,
    pub rank_icon: String,
}

fn leaderboard_endpoint(sort: LeaderboardSort, limit: u32) -> String {
    format!("/leaderboard/?sort_by={}&limit={}", sort, limit)
}

/// Keys of every in-bounds leaderboard view
pub fn leaderboard_keys(bounds: &InvalidationBounds) -> Vec<String> {
    LeaderboardSort::ALL
        .iter()
        .flat_map(|&sort| {
            bounds
                .leaderboard_limits
                .iter()
                .map(move |&limit| cache_key(&leaderboard_endpoint(sort, limit), None))
        })
        .collect()
}

impl<T: Transport> ApiClient<T> {
    /// Fetches the top `limit` users ranked by `sort`
    pub async fn get_leaderboard(
        &self,
        sort: LeaderboardSort,
        limit: u32,
        policy: CachePolicy,
    ) -> Result<Vec<LeaderboardEntry>, ApiError> {
        self.get(&leaderboard_endpoint(sort, limit), None, policy).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::tests::create_test_client;
    use crate::api::Method;
    use serde_json::json;

    #[test]
    fn test_sort_parses_api_names() {
        assert_eq!(
            "xp_total".parse::<LeaderboardSort>().unwrap(),
            LeaderboardSort::XpTotal
        );
        assert_eq!(
            "level".parse::<LeaderboardSort>().unwrap(),
            LeaderboardSort::Level
        );
        assert!("karma".parse::<LeaderboardSort>().is_err());
    }

    #[test]
    fn test_leaderboard_keys_cover_sorts_and_limits() {
        let keys = leaderboard_keys(&InvalidationBounds::default());

        assert_eq!(keys.len(), 12);
        assert!(keys.contains(&"/leaderboard/?sort_by=reputation&limit=20".to_string()));
        assert!(keys.contains(&"/leaderboard/?sort_by=level&limit=50".to_string()));
    }

    #[tokio::test]
    async fn test_get_leaderboard_uses_sort_and_limit() {
        let (client, _clock) = create_test_client();
        client.transport().respond(
            Method::Get,
            "/leaderboard/?sort_by=cp_total&limit=10",
            json!([{
                "rank_position": 1, "user_id": "u1", "username": "ayu",
                "real_name": null, "avatar_url": null, "level": 7,
                "xp_total": 900, "reputation": 40, "cp_total": 120,
                "rank_name": "Scholar", "rank_icon": "book"
            }]),
        );

        let entries = client
            .get_leaderboard(LeaderboardSort::CpTotal, 10, CachePolicy::enabled())
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].username, "ayu");
    }
}
