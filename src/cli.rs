//! Command-line interface for the fiksi client
//!
//! Parses arguments with clap and runs one command against an `ApiClient`,
//! producing JSON for the binary to print.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use thiserror::Error;

use crate::api::leaderboard::{LeaderboardSort, DEFAULT_LEADERBOARD_LIMIT};
use crate::api::posts::DEFAULT_PAGE_LIMIT;
use crate::api::{ApiClient, ApiError, Transport, DEFAULT_API_URL};
use crate::config::Config;

/// Error types for running CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified leaderboard sort is not recognized
    #[error("Invalid sort: '{0}'. Valid sorts: reputation, xp_total, cp_total, level")]
    InvalidSort(String),

    /// The command acts on the caller's account
    #[error("'{0}' requires --token (or FIKSI_TOKEN)")]
    MissingToken(&'static str),

    /// The API call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The response could not be turned into output
    #[error("Failed to format output: {0}")]
    Output(#[from] serde_json::Error),
}

/// fiksi - Browse the fiksi forum from the terminal
#[derive(Parser, Debug)]
#[command(name = "fiksi")]
#[command(about = "Client for the fiksi Q&A forum with a local response cache")]
#[command(version)]
pub struct Cli {
    /// Base URL of the forum API
    #[arg(long, env = "FIKSI_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Access token for commands that act on your account
    #[arg(long, env = "FIKSI_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Always go to the network and never write the cache
    #[arg(long)]
    pub no_cache: bool,

    /// Keep the cache in memory for this run only
    #[arg(long)]
    pub ephemeral: bool,

    /// Directory for the persistent cache (default: platform cache dir)
    #[arg(long, env = "FIKSI_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the homepage feed
    Homepage,
    /// List posts
    Posts {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: u32,
        /// List your own posts instead of all posts
        #[arg(long)]
        mine: bool,
    },
    /// Show a single post
    Post { id: String },
    /// Delete one of your posts
    DeletePost { id: String },
    /// Show the leaderboard
    Leaderboard {
        /// One of: reputation, xp_total, cp_total, level
        #[arg(long, default_value = "reputation")]
        sort_by: String,
        #[arg(long, default_value_t = DEFAULT_LEADERBOARD_LIMIT)]
        limit: u32,
    },
    /// List categories
    Categories,
    /// List subjects grouped by category
    Subjects,
    /// Prefetch the homepage, first page of posts and leaderboard
    Warm,
    /// Inspect or clear the local cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// Show the number of cached entries and their size
    Stats,
    /// Remove every cached response
    Clear,
}

/// Parses a leaderboard sort argument
///
/// # Returns
/// * `Ok(LeaderboardSort)` if the string names a sort column
/// * `Err(CliError::InvalidSort)` otherwise
pub fn parse_sort_arg(s: &str) -> Result<LeaderboardSort, CliError> {
    s.parse()
        .map_err(|_| CliError::InvalidSort(s.to_string()))
}

fn require_token<'a>(token: Option<&'a str>, command: &'static str) -> Result<&'a str, CliError> {
    token.ok_or(CliError::MissingToken(command))
}

/// Runs `command` and returns what should be printed
///
/// Argument errors are reported before any network call.
pub async fn execute<T: Transport>(
    command: &Command,
    client: &ApiClient<T>,
    config: &Config,
    token: Option<&str>,
) -> Result<Value, CliError> {
    let ttls = &config.ttls;

    let output = match command {
        Command::Homepage => serde_json::to_value(client.get_homepage(config.policy(ttls.homepage)).await?)?,
        Command::Posts { page, limit, mine } => {
            let policy = config.policy(ttls.post_list);
            let posts = if *mine {
                let token = require_token(token, "posts --mine")?;
                client.get_my_posts(token, *page, *limit, policy).await?
            } else {
                client.get_posts(*page, *limit, policy).await?
            };
            serde_json::to_value(posts)?
        }
        Command::Post { id } => serde_json::to_value(client.get_post(id, config.policy(ttls.post)).await?)?,
        Command::DeletePost { id } => {
            let token = require_token(token, "delete-post")?;
            client.delete_post(token, id).await?;
            json!({ "deleted": id })
        }
        Command::Leaderboard { sort_by, limit } => {
            let sort = parse_sort_arg(sort_by)?;
            let entries = client
                .get_leaderboard(sort, *limit, config.policy(ttls.leaderboard))
                .await?;
            serde_json::to_value(entries)?
        }
        Command::Categories => {
            serde_json::to_value(client.get_categories(config.policy(ttls.taxonomy)).await?)?
        }
        Command::Subjects => serde_json::to_value(
            client
                .get_grouped_subjects(config.policy(ttls.taxonomy))
                .await?,
        )?,
        Command::Warm => {
            let (homepage, posts, leaderboard) = futures::future::join3(
                client.get_homepage(config.policy(ttls.homepage)),
                client.get_posts(1, DEFAULT_PAGE_LIMIT, config.policy(ttls.post_list)),
                client.get_leaderboard(
                    LeaderboardSort::default(),
                    DEFAULT_LEADERBOARD_LIMIT,
                    config.policy(ttls.leaderboard),
                ),
            )
            .await;
            json!({
                "homepage": warm_status(homepage.map(|_| ())),
                "posts": warm_status(posts.map(|_| ())),
                "leaderboard": warm_status(leaderboard.map(|_| ())),
            })
        }
        Command::Cache { action } => match action {
            CacheAction::Stats => {
                let (entries, bytes) = client.cache_usage();
                json!({ "enabled": client.store().is_some(), "entries": entries, "bytes": bytes })
            }
            CacheAction::Clear => {
                client.clear_cache();
                json!({ "cleared": true })
            }
        },
    };

    Ok(output)
}

fn warm_status(result: Result<(), ApiError>) -> Value {
    match result {
        Ok(()) => json!("ok"),
        Err(e) => json!({ "error": e.to_string() }),
    }
}
