//! # carnet-store
//!
//! GitHub-backed stores for the carnet memo application.
//!
//! This crate turns an issue-tracking repository into a document store for
//! four entity kinds: memos (issues), attachments (repository files under
//! a fixed directory), user settings, and saved search shortcuts (single
//! JSON files). There is no other persistence; everything the stores
//! expose is derived from the current state of the backing repository.
//!
//! ## Example
//!
//! ```rust,no_run
//! use carnet_core::{CreateMemoRequest, MemoRepository};
//! use carnet_github::GitHubConfig;
//! use carnet_store::GitHubStore;
//!
//! # async fn run() -> carnet_core::Result<()> {
//! let store = GitHubStore::new(GitHubConfig::new("octocat", "notes").with_token("ghp_..."))?;
//!
//! let memo = store
//!     .memos
//!     .create(CreateMemoRequest {
//!         content: "Buy milk #errand".to_string(),
//!         ..CreateMemoRequest::default()
//!     })
//!     .await?;
//!
//! println!("created {}", memo.name);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

pub mod attachments;
pub mod hashtag;
pub mod labels;
pub mod memos;
pub mod settings;
pub mod users;

// Re-export core types
pub use carnet_core::*;

// Re-export repository implementations
pub use attachments::GitHubAttachmentRepository;
pub use hashtag::extract_inline_tags;
pub use labels::{ensure_labels, label_color};
pub use memos::GitHubMemoRepository;
pub use settings::GitHubSettingsRepository;
pub use users::GitHubUserRepository;

use carnet_github::{GitHubClient, GitHubConfig};

/// Combined store context bundling one client with all repositories.
pub struct GitHubStore {
    /// The shared API client.
    pub client: Arc<GitHubClient>,
    /// Memo repository (issues, comments, reactions).
    pub memos: GitHubMemoRepository,
    /// Attachment repository (repository files).
    pub attachments: GitHubAttachmentRepository,
    /// Settings and shortcuts repository (JSON files).
    pub settings: GitHubSettingsRepository,
    /// User identity and statistics repository.
    pub users: GitHubUserRepository,
}

impl GitHubStore {
    /// Create a store from a configuration.
    pub fn new(config: GitHubConfig) -> Result<Self> {
        Ok(Self::with_client(Arc::new(GitHubClient::new(config)?)))
    }

    /// Create a store over an existing client.
    pub fn with_client(client: Arc<GitHubClient>) -> Self {
        Self {
            memos: GitHubMemoRepository::new(client.clone()),
            attachments: GitHubAttachmentRepository::new(client.clone()),
            settings: GitHubSettingsRepository::new(client.clone()),
            users: GitHubUserRepository::new(client.clone()),
            client,
        }
    }

    /// Create a store from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(GitHubConfig::from_env())
    }
}
