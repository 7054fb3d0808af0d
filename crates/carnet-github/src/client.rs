//! Thin typed client over the GitHub REST API.
//!
//! One method per consumed endpoint; every method is a single HTTP round
//! trip. Status mapping: 404 becomes [`Error::NotFound`], 409 becomes
//! [`Error::Conflict`] (stale contents SHA), any other non-success status
//! becomes [`Error::Api`] with the message parsed from the error body.

use reqwest::{header, Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use carnet_core::{Error, Result};

use crate::config::GitHubConfig;
use crate::types::*;

/// User agent sent with every request; the API rejects requests without one.
const USER_AGENT: &str = concat!("carnet/", env!("CARGO_PKG_VERSION"));

/// API version header value.
const API_VERSION: &str = "2022-11-28";

/// Typed GitHub REST client scoped to one repository.
#[derive(Debug)]
pub struct GitHubClient {
    client: Client,
    base: Url,
    config: GitHubConfig,
}

impl GitHubClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GitHubConfig) -> Result<Self> {
        if config.owner.is_empty() || config.repo.is_empty() {
            return Err(Error::Config(
                "GitHub owner and repo must be configured".to_string(),
            ));
        }

        let base = Url::parse(&config.api_url)
            .map_err(|e| Error::Config(format!("invalid API URL {}: {e}", config.api_url)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "invalid API URL {}: not a base URL",
                config.api_url
            )));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, "application/vnd.github+json".parse().expect("static header"));
        headers.insert(
            "X-GitHub-Api-Version",
            API_VERSION.parse().expect("static header"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {e}")))?;

        info!(
            "Initializing GitHub client: repo={}/{}, authenticated={}",
            config.owner,
            config.repo,
            config.token.is_some()
        );

        Ok(Self { client, base, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(GitHubConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    /// Repository owner.
    pub fn owner(&self) -> &str {
        &self.config.owner
    }

    /// Repository name.
    pub fn repo(&self) -> &str {
        &self.config.repo
    }

    /// Raw-content URL for a repository-relative path.
    pub fn raw_content_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.config.raw_url.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            self.config.branch,
            path
        )
    }

    /// Build an API URL from path segments. Each segment is percent-encoded,
    /// so label names containing `/` stay one segment.
    fn api_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .expect("base URL validated at construction")
            .pop_if_empty()
            .extend(segments);
        url
    }

    /// Build a URL under `/repos/{owner}/{repo}/`.
    fn repo_url(&self, segments: &[&str]) -> Url {
        let mut all = vec!["repos", self.config.owner.as_str(), self.config.repo.as_str()];
        all.extend_from_slice(segments);
        self.api_url(&all)
    }

    /// Build a URL under `/repos/{owner}/{repo}/contents/`, splitting the
    /// repository path on `/` so separators survive encoding.
    fn contents_url(&self, path: &str) -> Url {
        let mut segments = vec!["contents"];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        self.repo_url(&segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut req = self.client.request(method, url);
        if let Some(token) = &self.config.token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        req
    }

    /// Map a non-success response to the error taxonomy.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_string();
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };

        match status.as_u16() {
            404 => Err(Error::NotFound(format!("{path}: {message}"))),
            409 => Err(Error::Conflict(format!("{path}: {message}"))),
            s => Err(Error::Api { status: s, message }),
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let response = Self::check(req.send().await?).await?;
        let value = response.json::<T>().await?;
        Ok(value)
    }

    async fn send_unit(&self, req: RequestBuilder) -> Result<()> {
        Self::check(req.send().await?).await?;
        Ok(())
    }

    // =========================================================================
    // ISSUES
    // =========================================================================

    /// `GET /repos/{owner}/{repo}/issues`
    pub async fn list_issues(&self, query: &ListIssuesQuery) -> Result<Vec<Issue>> {
        debug!(
            "Listing issues: state={}, page={}, per_page={}, labels={:?}",
            query.state, query.page, query.per_page, query.labels
        );

        let mut url = self.repo_url(&["issues"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("state", &query.state);
            pairs.append_pair("per_page", &query.per_page.to_string());
            pairs.append_pair("page", &query.page.to_string());
            if let Some(labels) = &query.labels {
                pairs.append_pair("labels", labels);
            }
            if let Some(sort) = &query.sort {
                pairs.append_pair("sort", sort);
            }
            if let Some(direction) = &query.direction {
                pairs.append_pair("direction", direction);
            }
            if let Some(creator) = &query.creator {
                pairs.append_pair("creator", creator);
            }
        }

        self.send_json(self.request(Method::GET, url)).await
    }

    /// `GET /repos/{owner}/{repo}/issues/{number}`
    pub async fn get_issue(&self, number: i64) -> Result<Issue> {
        let url = self.repo_url(&["issues", &number.to_string()]);
        self.send_json(self.request(Method::GET, url)).await
    }

    /// `POST /repos/{owner}/{repo}/issues`
    pub async fn create_issue(&self, req: &CreateIssueRequest) -> Result<Issue> {
        let url = self.repo_url(&["issues"]);
        self.send_json(self.request(Method::POST, url).json(req))
            .await
    }

    /// `PATCH /repos/{owner}/{repo}/issues/{number}`
    pub async fn update_issue(&self, number: i64, req: &UpdateIssueRequest) -> Result<Issue> {
        let url = self.repo_url(&["issues", &number.to_string()]);
        self.send_json(self.request(Method::PATCH, url).json(req))
            .await
    }

    // =========================================================================
    // COMMENTS
    // =========================================================================

    /// `GET /repos/{owner}/{repo}/issues/{number}/comments`
    pub async fn list_issue_comments(&self, number: i64) -> Result<Vec<IssueComment>> {
        let url = self.repo_url(&["issues", &number.to_string(), "comments"]);
        self.send_json(self.request(Method::GET, url)).await
    }

    /// `POST /repos/{owner}/{repo}/issues/{number}/comments`
    pub async fn create_issue_comment(&self, number: i64, body: &str) -> Result<IssueComment> {
        let url = self.repo_url(&["issues", &number.to_string(), "comments"]);
        let payload = serde_json::json!({ "body": body });
        self.send_json(self.request(Method::POST, url).json(&payload))
            .await
    }

    // =========================================================================
    // REACTIONS
    // =========================================================================

    /// `GET /repos/{owner}/{repo}/issues/{number}/reactions`
    pub async fn list_issue_reactions(&self, number: i64) -> Result<Vec<IssueReaction>> {
        let url = self.repo_url(&["issues", &number.to_string(), "reactions"]);
        self.send_json(self.request(Method::GET, url)).await
    }

    /// `POST /repos/{owner}/{repo}/issues/{number}/reactions`
    pub async fn create_issue_reaction(
        &self,
        number: i64,
        content: &str,
    ) -> Result<IssueReaction> {
        let url = self.repo_url(&["issues", &number.to_string(), "reactions"]);
        let payload = serde_json::json!({ "content": content });
        self.send_json(self.request(Method::POST, url).json(&payload))
            .await
    }

    /// `DELETE /repos/{owner}/{repo}/issues/{number}/reactions/{id}`
    pub async fn delete_issue_reaction(&self, number: i64, reaction_id: i64) -> Result<()> {
        let url = self.repo_url(&[
            "issues",
            &number.to_string(),
            "reactions",
            &reaction_id.to_string(),
        ]);
        self.send_unit(self.request(Method::DELETE, url)).await
    }

    // =========================================================================
    // LABELS
    // =========================================================================

    /// `GET /repos/{owner}/{repo}/labels/{name}`
    pub async fn get_label(&self, name: &str) -> Result<Label> {
        let url = self.repo_url(&["labels", name]);
        self.send_json(self.request(Method::GET, url)).await
    }

    /// `POST /repos/{owner}/{repo}/labels`
    pub async fn create_label(&self, name: &str, color: &str) -> Result<Label> {
        let url = self.repo_url(&["labels"]);
        let payload = serde_json::json!({ "name": name, "color": color });
        self.send_json(self.request(Method::POST, url).json(&payload))
            .await
    }

    /// `GET /repos/{owner}/{repo}/labels`
    pub async fn list_labels(&self, per_page: i64) -> Result<Vec<Label>> {
        let mut url = self.repo_url(&["labels"]);
        url.query_pairs_mut()
            .append_pair("per_page", &per_page.to_string());
        self.send_json(self.request(Method::GET, url)).await
    }

    // =========================================================================
    // REPOSITORY CONTENTS
    // =========================================================================

    /// `GET /repos/{owner}/{repo}/contents/{path}`
    pub async fn get_content(&self, path: &str) -> Result<ContentEntry> {
        let url = self.contents_url(path);
        self.send_json(self.request(Method::GET, url)).await
    }

    /// `PUT /repos/{owner}/{repo}/contents/{path}`
    pub async fn put_file(
        &self,
        path: &str,
        message: &str,
        content_base64: &str,
        sha: Option<&str>,
    ) -> Result<FileCommit> {
        debug!("Writing file: path={}, replacing={}", path, sha.is_some());
        let url = self.contents_url(path);
        let payload = PutFileRequest {
            message: message.to_string(),
            content: content_base64.to_string(),
            sha: sha.map(str::to_string),
        };
        self.send_json(self.request(Method::PUT, url).json(&payload))
            .await
    }

    /// `DELETE /repos/{owner}/{repo}/contents/{path}`
    pub async fn delete_file(&self, path: &str, message: &str, sha: &str) -> Result<()> {
        debug!("Deleting file: path={}", path);
        let url = self.contents_url(path);
        let payload = DeleteFileRequest {
            message: message.to_string(),
            sha: sha.to_string(),
        };
        self.send_unit(self.request(Method::DELETE, url).json(&payload))
            .await
    }

    // =========================================================================
    // USERS & SEARCH
    // =========================================================================

    /// `GET /user`
    pub async fn authenticated_user(&self) -> Result<AuthenticatedUser> {
        let url = self.api_url(&["user"]);
        self.send_json(self.request(Method::GET, url)).await
    }

    /// `GET /search/issues`, reduced to the total count.
    pub async fn search_issue_count(&self, query: &str) -> Result<i64> {
        let mut url = self.api_url(&["search", "issues"]);
        url.query_pairs_mut().append_pair("q", query);
        let response: SearchIssuesResponse = self.send_json(self.request(Method::GET, url)).await?;
        Ok(response.total_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GitHubClient {
        GitHubClient::new(GitHubConfig::new("octocat", "notes")).unwrap()
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<GitHubClient>();
        assert_sync::<GitHubClient>();
    }

    #[test]
    fn test_new_requires_owner_and_repo() {
        let err = GitHubClient::new(GitHubConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_new_rejects_invalid_api_url() {
        let config = GitHubConfig {
            api_url: "not a url".to_string(),
            ..GitHubConfig::new("octocat", "notes")
        };
        assert!(matches!(
            GitHubClient::new(config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_repo_url_shape() {
        let url = client().repo_url(&["issues", "42"]);
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/octocat/notes/issues/42"
        );
    }

    #[test]
    fn test_label_url_encodes_slash_in_name() {
        let url = client().repo_url(&["labels", "tag:project/sub"]);
        assert_eq!(
            url.path(),
            "/repos/octocat/notes/labels/tag:project%2Fsub"
        );
    }

    #[test]
    fn test_contents_url_keeps_path_separators() {
        let url = client().contents_url(".memos/settings.json");
        assert_eq!(
            url.path(),
            "/repos/octocat/notes/contents/.memos/settings.json"
        );
    }

    #[test]
    fn test_raw_content_url() {
        assert_eq!(
            client().raw_content_url("attachments/1_a.png"),
            "https://raw.githubusercontent.com/octocat/notes/main/attachments/1_a.png"
        );
    }
}
