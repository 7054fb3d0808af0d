//! Configuration for the GitHub client.
//!
//! The configuration is an explicit value passed to
//! [`GitHubClient::new`](crate::GitHubClient::new); there is no process-wide
//! mutable configuration. Swapping repositories means constructing a new
//! client.

/// Default REST API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default raw-content endpoint.
pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";

/// Default branch raw-content links point at.
pub const DEFAULT_BRANCH: &str = "main";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for a [`GitHubClient`](crate::GitHubClient).
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// Base URL of the REST API.
    pub api_url: String,
    /// Base URL for raw-content links.
    pub raw_url: String,
    /// Personal access token; unauthenticated when absent.
    pub token: Option<String>,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch used for raw-content links.
    pub branch: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            raw_url: DEFAULT_RAW_URL.to_string(),
            token: None,
            owner: String::new(),
            repo: String::new(),
            branch: DEFAULT_BRANCH.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GitHubConfig {
    /// Build a configuration for `owner/repo` with defaults elsewhere.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            ..Self::default()
        }
    }

    /// Set the access token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            raw_url: std::env::var("GITHUB_RAW_URL").unwrap_or_else(|_| DEFAULT_RAW_URL.to_string()),
            token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            owner: std::env::var("GITHUB_OWNER").unwrap_or_default(),
            repo: std::env::var("GITHUB_REPO").unwrap_or_default(),
            branch: std::env::var("GITHUB_BRANCH").unwrap_or_else(|_| DEFAULT_BRANCH.to_string()),
            timeout_seconds: std::env::var("GITHUB_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }
}
