//! Cache key derivation
//!
//! A cache key is the request's endpoint (path plus query string), followed by
//! a short hash of the caller's credential when the request carries one. Keys
//! for list views are enumerated up to an explicit bound when a mutation needs
//! to drop them.

use sha2::{Digest, Sha256};

/// Number of hex characters of the credential hash kept in a key
pub const CREDENTIAL_FRAGMENT_LEN: usize = 16;

/// Separator between the endpoint and the credential fragment
///
/// `#` never reaches the server as part of an endpoint, so a credentialed key
/// cannot collide with an anonymous one.
const CREDENTIAL_SEPARATOR: &str = "#u:";

/// How many pages of each paginated list a mutation invalidates
pub const DEFAULT_PAGE_DEPTH: u32 = 5;

/// Page sizes the client requests lists with
pub const DEFAULT_PAGE_SIZES: [u32; 2] = [10, 20];

/// Leaderboard sizes the client requests
pub const DEFAULT_LEADERBOARD_LIMITS: [u32; 3] = [10, 20, 50];

/// Short, non-reversible fragment identifying a credential
///
/// The first 8 bytes of SHA-256 over the credential, hex encoded. Enough to
/// keep two users' cached payloads apart, not enough to recover the token.
pub fn credential_fragment(credential: &str) -> String {
    Sha256::digest(credential.as_bytes())
        .iter()
        .take(CREDENTIAL_FRAGMENT_LEN / 2)
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// Derives the cache key for a request
///
/// # Arguments
/// * `endpoint` - Path and query string, exactly as sent (e.g. "/posts/?page=1&limit=10")
/// * `credential` - Bearer token, for caller-scoped responses
pub fn cache_key(endpoint: &str, credential: Option<&str>) -> String {
    match credential {
        Some(token) => format!(
            "{}{}{}",
            endpoint,
            CREDENTIAL_SEPARATOR,
            credential_fragment(token)
        ),
        None => endpoint.to_string(),
    }
}

/// Formats a paginated list endpoint
///
/// Reads and invalidations both go through here so their keys always agree.
pub fn paginated_endpoint(base: &str, page: u32, limit: u32) -> String {
    format!("{}?page={}&limit={}", base, page, limit)
}

/// Bounds on how many list keys a mutation invalidates
///
/// A mutation drops pages `1..=page_depth` for every size in `page_sizes`.
/// List pages past that depth, or fetched with other sizes, are not touched
/// and may serve stale data until their TTL lapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationBounds {
    /// Deepest page invalidated for each page size
    pub page_depth: u32,
    /// Page sizes whose pages are invalidated
    pub page_sizes: Vec<u32>,
    /// Leaderboard sizes invalidated for every sort order
    pub leaderboard_limits: Vec<u32>,
}

impl Default for InvalidationBounds {
    fn default() -> Self {
        Self {
            page_depth: DEFAULT_PAGE_DEPTH,
            page_sizes: DEFAULT_PAGE_SIZES.to_vec(),
            leaderboard_limits: DEFAULT_LEADERBOARD_LIMITS.to_vec(),
        }
    }
}

impl InvalidationBounds {
    /// Keys for every in-bounds page of the list at `base`
    pub fn paginated_keys(&self, base: &str, credential: Option<&str>) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.page_sizes.len() * self.page_depth as usize);
        for &limit in &self.page_sizes {
            for page in 1..=self.page_depth {
                keys.push(cache_key(&paginated_endpoint(base, page, limit), credential));
            }
        }
        keys
    }
}
