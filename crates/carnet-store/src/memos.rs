//! GitHub-backed memo repository.
//!
//! Each memo is one issue in the backing repository. Tags and the pinned
//! flag live in labels, metadata lives in the frontmatter block of the
//! issue body, and soft deletion is a closed issue carrying the reserved
//! deleted label. Comments and reactions map 1:1 to the issue
//! sub-resources.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::Mutex;
use tracing::debug;

use carnet_core::defaults::{
    DELETED_LABEL, PAGE_SIZE, PINNED_LABEL, SNIPPET_MAX_CHARS, TAG_LABEL_PREFIX, TITLE_MAX_CHARS,
    UNTITLED_MEMO_TITLE,
};
use carnet_core::frontmatter::{self, MemoMetadata};
use carnet_core::names;
use carnet_core::{
    Attachment, CreateMemoRequest, Error, ListMemosRequest, ListMemosResponse, Memo, MemoField,
    MemoFilter, MemoProperty, MemoRepository, MemoState, Reaction, Result, UpdateMemoPatch,
    Visibility,
};
use carnet_github::{
    CreateIssueRequest, GitHubClient, Issue, IssueComment, IssueReaction, ListIssuesQuery,
    UpdateIssueRequest,
};

use crate::hashtag::extract_inline_tags;
use crate::labels::ensure_labels;

static LINK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)https?://|www\.").expect("static regex"));

static TASK_LIST_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*-\s\[[xX ]\]\s+").expect("static regex"));

static CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```.*?```|`[^`]+`").expect("static regex"));

// =============================================================================
// PURE DERIVATION HELPERS
// =============================================================================

/// Tracker state string for a memo state. `Deleted` maps one-way to
/// `closed`; the reverse direction needs the deleted label.
pub fn to_tracker_state(state: MemoState) -> &'static str {
    match state {
        MemoState::Normal => "open",
        MemoState::Archived | MemoState::Deleted => "closed",
    }
}

/// Memo state of an issue. Derived exactly once, here; downstream code
/// must branch on [`MemoState`], never on label contents.
fn memo_state_of(issue: &Issue) -> MemoState {
    if issue.state == "open" {
        MemoState::Normal
    } else if issue.labels.iter().any(|l| l.name == DELETED_LABEL) {
        MemoState::Deleted
    } else {
        MemoState::Archived
    }
}

fn label_tags(issue: &Issue) -> Vec<String> {
    issue
        .labels
        .iter()
        .filter_map(|l| l.name.strip_prefix(TAG_LABEL_PREFIX))
        .map(str::to_string)
        .collect()
}

fn is_pinned(issue: &Issue) -> bool {
    issue.labels.iter().any(|l| l.name == PINNED_LABEL)
}

/// First content line, truncated; `"Untitled memo"` when empty.
fn derive_title(content: &str) -> String {
    let title: String = content
        .lines()
        .next()
        .unwrap_or("")
        .chars()
        .take(TITLE_MAX_CHARS)
        .collect();
    if title.is_empty() {
        UNTITLED_MEMO_TITLE.to_string()
    } else {
        title
    }
}

fn derive_snippet(content: &str) -> String {
    content.chars().take(SNIPPET_MAX_CHARS).collect()
}

fn derive_property(content: &str) -> MemoProperty {
    MemoProperty {
        has_link: LINK_PATTERN.is_match(content),
        has_task_list: TASK_LIST_PATTERN.is_match(content),
        has_code: CODE_PATTERN.is_match(content),
    }
}

/// Union explicit tags with inline hashtags extracted from content.
/// Returns a deduplicated, sorted vector.
fn merge_tags(explicit: &[String], content: &str) -> Vec<String> {
    let mut all: HashSet<String> = explicit.iter().cloned().collect();
    all.extend(extract_inline_tags(content));
    let mut result: Vec<String> = all.into_iter().collect();
    result.sort();
    result
}

fn build_labels(tags: &[String], pinned: bool) -> Vec<String> {
    let mut labels: Vec<String> = tags
        .iter()
        .map(|t| format!("{TAG_LABEL_PREFIX}{t}"))
        .collect();
    if pinned {
        labels.push(PINNED_LABEL.to_string());
    }
    labels
}

fn creator_of(login: Option<&str>) -> String {
    names::user_name(login.unwrap_or(""))
}

/// Page tokens are 1-based page numbers; anything unparsable restarts at
/// the first page rather than failing, since a token is an opaque cursor
/// handed back by a previous response.
fn parse_page_token(token: &str) -> i64 {
    token.parse::<i64>().ok().filter(|p| *p >= 1).unwrap_or(1)
}

// =============================================================================
// REPOSITORY
// =============================================================================

/// GitHub implementation of [`MemoRepository`].
pub struct GitHubMemoRepository {
    client: Arc<GitHubClient>,
    /// Per-issue write serialization. Two in-process writers to the same
    /// memo queue behind each other instead of racing the
    /// read-modify-write; writers in other processes are still
    /// last-write-wins because the issue update API has no version token.
    write_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl GitHubMemoRepository {
    /// Create a new repository over the given client.
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self {
            client,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn write_lock(&self, number: i64) -> Arc<Mutex<()>> {
        let mut map = self.write_locks.lock().await;
        map.entry(number)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Convert an issue into a memo. Attachment records reconstructed from
    /// metadata carry only what the metadata holds: name, filename, and a
    /// derived raw-content link.
    fn issue_to_memo(&self, issue: &Issue) -> Memo {
        let body = issue.body.as_deref().unwrap_or("");
        let (meta, content) = frontmatter::decode_parts(body);

        let attachments = meta
            .attachments
            .iter()
            .map(|name| Attachment {
                name: name.clone(),
                filename: name
                    .strip_prefix(names::ATTACHMENT_NAME_PREFIX)
                    .unwrap_or(name)
                    .to_string(),
                external_link: self.client.raw_content_url(name),
                mime_type: String::new(),
                size: 0,
                sha: String::new(),
                memo: None,
                create_time: None,
            })
            .collect();

        Memo {
            name: names::memo_name(issue.number),
            uid: issue.number,
            title: issue.title.clone(),
            snippet: derive_snippet(&content),
            tags: label_tags(issue),
            state: memo_state_of(issue),
            pinned: is_pinned(issue),
            creator: creator_of(issue.user.as_ref().map(|u| u.login.as_str())),
            create_time: issue.created_at,
            update_time: issue.updated_at,
            display_time: issue.created_at,
            visibility: meta.visibility.unwrap_or_default(),
            attachments,
            relations: meta.relations,
            reactions: Vec::new(),
            location: meta.location,
            property: Some(derive_property(&content)),
            parent: None,
            content,
        }
    }

    fn comment_to_memo(parent: &str, memo_number: i64, comment: &IssueComment) -> Memo {
        let content = comment.body.clone().unwrap_or_default();
        let title: String = content
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(TITLE_MAX_CHARS)
            .collect();

        Memo {
            name: names::comment_name(memo_number, comment.id),
            uid: comment.id,
            title: if title.is_empty() {
                "Comment".to_string()
            } else {
                title
            },
            snippet: derive_snippet(&content),
            tags: Vec::new(),
            state: MemoState::Normal,
            pinned: false,
            creator: creator_of(comment.user.as_ref().map(|u| u.login.as_str())),
            create_time: comment.created_at,
            update_time: comment.updated_at,
            display_time: comment.created_at,
            visibility: Visibility::Private,
            attachments: Vec::new(),
            relations: Vec::new(),
            reactions: Vec::new(),
            location: None,
            property: Some(derive_property(&content)),
            parent: Some(parent.to_string()),
            content,
        }
    }

    fn reaction_to_model(memo_number: i64, reaction: &IssueReaction) -> Reaction {
        Reaction {
            name: names::reaction_name(memo_number, reaction.id),
            creator: creator_of(reaction.user.as_ref().map(|u| u.login.as_str())),
            reaction_type: reaction.content.clone(),
            content_id: names::memo_name(memo_number),
        }
    }
}

#[async_trait]
impl MemoRepository for GitHubMemoRepository {
    async fn list(&self, req: ListMemosRequest) -> Result<ListMemosResponse> {
        let page_size = req.page_size.unwrap_or(PAGE_SIZE);
        let page = req
            .page_token
            .as_deref()
            .map(parse_page_token)
            .unwrap_or(1);
        let filter = MemoFilter::parse(req.filter.as_deref().unwrap_or(""));

        // The tag predicate is pushed down as a label filter; the tracker
        // cannot evaluate the remaining predicates server-side.
        let labels = filter.tags.as_ref().map(|tags| {
            tags.iter()
                .map(|t| format!("{TAG_LABEL_PREFIX}{t}"))
                .collect::<Vec<_>>()
                .join(",")
        });

        let state = to_tracker_state(req.state.unwrap_or_default());
        let issues = self
            .client
            .list_issues(&ListIssuesQuery {
                state: state.to_string(),
                labels,
                per_page: page_size,
                page,
                sort: Some("updated".to_string()),
                direction: Some("desc".to_string()),
                creator: None,
            })
            .await?;

        // The issues endpoint also returns pull requests.
        let issues: Vec<Issue> = issues
            .into_iter()
            .filter(|i| i.pull_request.is_none())
            .collect();
        let fetched = issues.len() as i64;

        let mut memos: Vec<Memo> = issues.iter().map(|i| self.issue_to_memo(i)).collect();

        if let Some(needle) = &filter.content_search {
            let needle = needle.to_lowercase();
            memos.retain(|m| m.content.to_lowercase().contains(&needle));
        }
        if let Some(creator) = &filter.creator {
            memos.retain(|m| &m.creator == creator);
        }
        if let Some(pinned) = filter.pinned {
            memos.retain(|m| m.pinned == pinned);
        }

        // A full page may be the last one; the token is a cheap heuristic
        // and the follow-up page comes back empty in that case.
        let next_page_token = if fetched == page_size {
            (page + 1).to_string()
        } else {
            String::new()
        };

        debug!(
            "Listed memos: page={}, fetched={}, after_filters={}",
            page,
            fetched,
            memos.len()
        );

        Ok(ListMemosResponse {
            memos,
            next_page_token,
        })
    }

    async fn get(&self, name: &str) -> Result<Memo> {
        let number = names::parse_memo_name(name)?;
        let issue = self.client.get_issue(number).await?;
        let mut memo = self.issue_to_memo(&issue);

        let reactions = self.client.list_issue_reactions(number).await?;
        memo.reactions = reactions
            .iter()
            .map(|r| Self::reaction_to_model(number, r))
            .collect();

        Ok(memo)
    }

    async fn create(&self, req: CreateMemoRequest) -> Result<Memo> {
        let tags = merge_tags(&req.tags, &req.content);
        let labels = build_labels(&tags, req.pinned);
        if !labels.is_empty() {
            ensure_labels(&self.client, &labels).await?;
        }

        let meta = MemoMetadata {
            visibility: req.visibility,
            location: req.location.clone(),
            relations: req.relations.clone(),
            attachments: req.attachments.iter().map(|a| a.name.clone()).collect(),
        };
        let body = frontmatter::encode_body(&req.content, &meta);

        let issue = self
            .client
            .create_issue(&CreateIssueRequest {
                title: derive_title(&req.content),
                body,
                labels,
            })
            .await?;

        debug!("Created memo: memos/{}", issue.number);
        Ok(self.issue_to_memo(&issue))
    }

    async fn update(
        &self,
        name: &str,
        patch: UpdateMemoPatch,
        mask: &[MemoField],
    ) -> Result<Memo> {
        let number = names::parse_memo_name(name)?;
        let lock = self.write_lock(number).await;
        let _guard = lock.lock().await;

        let current = self.issue_to_memo(&self.client.get_issue(number).await?);
        if current.state == MemoState::Deleted {
            return Err(Error::InvalidInput(format!("memo is deleted: {name}")));
        }

        let masked = |field: MemoField| mask.contains(&field);

        let content = if masked(MemoField::Content) {
            patch.content.unwrap_or_else(|| current.content.clone())
        } else {
            current.content.clone()
        };
        let visibility = if masked(MemoField::Visibility) {
            patch.visibility.unwrap_or(current.visibility)
        } else {
            current.visibility
        };
        // A masked location of None clears it; every other masked field
        // falls back to the current value on None.
        let location = if masked(MemoField::Location) {
            patch.location
        } else {
            current.location.clone()
        };
        let relations = if masked(MemoField::Relations) {
            patch.relations.unwrap_or_else(|| current.relations.clone())
        } else {
            current.relations.clone()
        };
        let attachments = if masked(MemoField::Attachments) {
            patch
                .attachments
                .unwrap_or_else(|| current.attachments.clone())
        } else {
            current.attachments.clone()
        };
        let pinned = if masked(MemoField::Pinned) {
            patch.pinned.unwrap_or(current.pinned)
        } else {
            current.pinned
        };

        let tags = merge_tags(patch.tags.as_deref().unwrap_or(&[]), &content);
        let labels = build_labels(&tags, pinned);
        if !labels.is_empty() {
            ensure_labels(&self.client, &labels).await?;
        }

        let body = frontmatter::encode_body(
            &content,
            &MemoMetadata {
                visibility: Some(visibility),
                location,
                relations,
                attachments: attachments.iter().map(|a| a.name.clone()).collect(),
            },
        );

        let state = if masked(MemoField::State) {
            patch.state.map(|s| to_tracker_state(s).to_string())
        } else {
            None
        };

        let issue = self
            .client
            .update_issue(
                number,
                &UpdateIssueRequest {
                    title: Some(derive_title(&content)),
                    body: Some(body),
                    labels: Some(labels),
                    state,
                },
            )
            .await?;

        Ok(self.issue_to_memo(&issue))
    }

    async fn archive(&self, name: &str) -> Result<Memo> {
        let number = names::parse_memo_name(name)?;
        let lock = self.write_lock(number).await;
        let _guard = lock.lock().await;

        let current = self.client.get_issue(number).await?;
        if memo_state_of(&current) == MemoState::Deleted {
            return Err(Error::InvalidInput(format!("memo is deleted: {name}")));
        }

        let issue = self
            .client
            .update_issue(
                number,
                &UpdateIssueRequest {
                    state: Some("closed".to_string()),
                    ..UpdateIssueRequest::default()
                },
            )
            .await?;
        Ok(self.issue_to_memo(&issue))
    }

    async fn restore(&self, name: &str) -> Result<Memo> {
        let number = names::parse_memo_name(name)?;
        let lock = self.write_lock(number).await;
        let _guard = lock.lock().await;

        // Soft deletion is terminal; reopening would resurrect the memo
        // with its labels already discarded.
        let current = self.client.get_issue(number).await?;
        if memo_state_of(&current) == MemoState::Deleted {
            return Err(Error::InvalidInput(format!("memo is deleted: {name}")));
        }

        let issue = self
            .client
            .update_issue(
                number,
                &UpdateIssueRequest {
                    state: Some("open".to_string()),
                    ..UpdateIssueRequest::default()
                },
            )
            .await?;
        Ok(self.issue_to_memo(&issue))
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let number = names::parse_memo_name(name)?;
        let lock = self.write_lock(number).await;
        let _guard = lock.lock().await;

        // The tracker offers no true delete for issues: close it and
        // replace all labels with the reserved deleted marker.
        ensure_labels(&self.client, &[DELETED_LABEL.to_string()]).await?;
        self.client
            .update_issue(
                number,
                &UpdateIssueRequest {
                    state: Some("closed".to_string()),
                    labels: Some(vec![DELETED_LABEL.to_string()]),
                    ..UpdateIssueRequest::default()
                },
            )
            .await?;

        debug!("Soft-deleted memo: {}", name);
        Ok(())
    }

    async fn list_comments(&self, name: &str) -> Result<Vec<Memo>> {
        let number = names::parse_memo_name(name)?;
        let comments = self.client.list_issue_comments(number).await?;
        Ok(comments
            .iter()
            .map(|c| Self::comment_to_memo(name, number, c))
            .collect())
    }

    async fn create_comment(&self, name: &str, content: &str) -> Result<Memo> {
        let number = names::parse_memo_name(name)?;
        let comment = self.client.create_issue_comment(number, content).await?;
        Ok(Self::comment_to_memo(name, number, &comment))
    }

    async fn list_reactions(&self, name: &str) -> Result<Vec<Reaction>> {
        let number = names::parse_memo_name(name)?;
        let reactions = self.client.list_issue_reactions(number).await?;
        Ok(reactions
            .iter()
            .map(|r| Self::reaction_to_model(number, r))
            .collect())
    }

    async fn upsert_reaction(&self, name: &str, reaction_type: &str) -> Result<Reaction> {
        let number = names::parse_memo_name(name)?;
        let reaction = self
            .client
            .create_issue_reaction(number, reaction_type)
            .await?;
        Ok(Self::reaction_to_model(number, &reaction))
    }

    async fn delete_reaction(&self, reaction_name: &str) -> Result<()> {
        let (number, reaction_id) = names::parse_reaction_name(reaction_name)?;
        self.client.delete_issue_reaction(number, reaction_id).await
    }
}
