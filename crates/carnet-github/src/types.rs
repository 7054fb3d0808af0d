//! Wire types for the consumed subset of the GitHub REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// =============================================================================
// ISSUES
// =============================================================================

/// The user object attached to issues, comments, and reactions.
#[derive(Debug, Clone, Deserialize)]
pub struct Actor {
    pub login: String,
}

/// A repository label.
#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// An issue, as returned by the issues endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub number: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    /// `"open"` or `"closed"`.
    pub state: String,
    #[serde(default)]
    pub user: Option<Actor>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Present iff the "issue" is actually a pull request; the list
    /// endpoint returns both.
    #[serde(default)]
    pub pull_request: Option<JsonValue>,
}

/// Body for `POST /repos/{owner}/{repo}/issues`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateIssueRequest {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// Body for `PATCH /repos/{owner}/{repo}/issues/{number}`. Absent fields
/// are left untouched by the API.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateIssueRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Query for `GET /repos/{owner}/{repo}/issues`.
#[derive(Debug, Clone)]
pub struct ListIssuesQuery {
    /// `"open"`, `"closed"`, or `"all"`.
    pub state: String,
    /// Comma-separated label names; issues must carry all of them.
    pub labels: Option<String>,
    pub per_page: i64,
    pub page: i64,
    /// `"created"`, `"updated"`, or `"comments"`; API default when absent.
    pub sort: Option<String>,
    /// `"asc"` or `"desc"`; API default when absent.
    pub direction: Option<String>,
    /// Narrow to issues created by this login.
    pub creator: Option<String>,
}

impl Default for ListIssuesQuery {
    fn default() -> Self {
        Self {
            state: "open".to_string(),
            labels: None,
            per_page: 30,
            page: 1,
            sort: None,
            direction: None,
            creator: None,
        }
    }
}

// =============================================================================
// COMMENTS & REACTIONS
// =============================================================================

/// An issue comment.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub id: i64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<Actor>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A reaction on an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueReaction {
    pub id: i64,
    /// One of `+1`, `-1`, `laugh`, `confused`, `heart`, `hooray`,
    /// `rocket`, `eyes`.
    pub content: String,
    #[serde(default)]
    pub user: Option<Actor>,
}

// =============================================================================
// REPOSITORY CONTENTS
// =============================================================================

/// One entry from the contents endpoint. Listing a directory returns an
/// array of these (without `content`); fetching a file returns a single
/// entry with base64 `content`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub size: i64,
    /// `"file"`, `"dir"`, `"symlink"`, or `"submodule"`.
    #[serde(rename = "type")]
    pub entry_type: String,
    /// Base64 content with embedded newlines, present on single-file gets.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

/// Response shape of `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ContentEntry {
    Listing(Vec<ContentFile>),
    File(Box<ContentFile>),
}

/// Body for `PUT /repos/{owner}/{repo}/contents/{path}`. The `sha` is the
/// optimistic-concurrency token: absent to create, present to replace that
/// exact version.
#[derive(Debug, Clone, Serialize)]
pub struct PutFileRequest {
    pub message: String,
    /// Base64-encoded file bytes.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

/// Body for `DELETE /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteFileRequest {
    pub message: String,
    pub sha: String,
}

/// Response of the contents write endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct FileCommit {
    #[serde(default)]
    pub content: Option<CommitContent>,
}

/// The `content` half of a [`FileCommit`].
#[derive(Debug, Clone, Deserialize)]
pub struct CommitContent {
    pub sha: String,
}

// =============================================================================
// USERS & SEARCH
// =============================================================================

/// Response of `GET /user`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatedUser {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Response of `GET /search/issues`, reduced to the count.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchIssuesResponse {
    pub total_count: i64,
}

/// Error body returned by the API on failures.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}
