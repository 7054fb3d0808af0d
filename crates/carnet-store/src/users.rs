//! GitHub-backed user identity and statistics.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use carnet_core::defaults::{DELETED_LABEL, TAG_LABEL_PREFIX};
use carnet_core::names;
use carnet_core::{
    MemoTypeStats, Result, User, UserRepository, UserRole, UserState, UserStats,
};
use carnet_github::{GitHubClient, ListIssuesQuery};

/// GitHub implementation of [`UserRepository`].
pub struct GitHubUserRepository {
    client: Arc<GitHubClient>,
}

impl GitHubUserRepository {
    /// Create a new repository over the given client.
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserRepository for GitHubUserRepository {
    async fn current_user(&self) -> Result<User> {
        let data = self.client.authenticated_user().await?;
        Ok(User {
            name: names::user_name(&data.login),
            display_name: data
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| data.login.clone()),
            username: data.login,
            email: data.email.unwrap_or_default(),
            avatar_url: data.avatar_url.unwrap_or_default(),
            description: data.bio.unwrap_or_default(),
            // The token owner administers their own memo repository.
            role: UserRole::Admin,
            state: UserState::Normal,
        })
    }

    async fn user_stats(&self, username: Option<&str>) -> Result<UserStats> {
        // Tag presence comes from the label list; exact per-tag counts
        // would need one search per label.
        let labels = self.client.list_labels(100).await?;
        let mut tag_count = HashMap::new();
        for label in labels {
            if let Some(tag) = label.name.strip_prefix(TAG_LABEL_PREFIX) {
                tag_count.insert(tag.to_string(), 1);
            }
        }

        let repo = format!("{}/{}", self.client.owner(), self.client.repo());
        let memo_count = self
            .client
            .search_issue_count(&format!("repo:{repo} is:issue is:open"))
            .await?;
        let archived_memo_count = self
            .client
            .search_issue_count(&format!(
                "repo:{repo} is:issue is:closed -label:{DELETED_LABEL}"
            ))
            .await?;

        let recent = self
            .client
            .list_issues(&ListIssuesQuery {
                state: "all".to_string(),
                per_page: 100,
                page: 1,
                creator: username.map(str::to_string),
                ..ListIssuesQuery::default()
            })
            .await?;
        let memo_display_timestamps = recent
            .iter()
            .filter(|i| i.pull_request.is_none())
            .map(|i| i.created_at)
            .collect();

        Ok(UserStats {
            memo_count,
            archived_memo_count,
            tag_count,
            memo_type_stats: MemoTypeStats::default(),
            memo_display_timestamps,
        })
    }
}
