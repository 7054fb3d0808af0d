//! # carnet-github
//!
//! Typed GitHub REST client for the carnet memo store.
//!
//! This crate wraps the consumed subset of the GitHub API — issues, labels,
//! comments, reactions, repository contents, authenticated user, and issue
//! search — behind one client scoped to a single repository. The stores in
//! `carnet-store` are built on top of it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use carnet_github::{GitHubClient, GitHubConfig};
//!
//! # async fn run() -> carnet_core::Result<()> {
//! let client = GitHubClient::new(
//!     GitHubConfig::new("octocat", "notes").with_token("ghp_..."),
//! )?;
//! let issue = client.get_issue(42).await?;
//! println!("{}", issue.title);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod types;

pub use client::GitHubClient;
pub use config::GitHubConfig;
pub use types::{
    Actor, ApiErrorBody, AuthenticatedUser, CommitContent, ContentEntry, ContentFile,
    CreateIssueRequest, DeleteFileRequest, FileCommit, Issue, IssueComment, IssueReaction, Label,
    ListIssuesQuery, PutFileRequest, SearchIssuesResponse, UpdateIssueRequest,
};
