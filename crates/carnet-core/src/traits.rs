//! Core traits for the carnet store abstractions.
//!
//! These traits define the interfaces the concrete tracker-backed stores
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// MEMO REPOSITORY
// =============================================================================

/// Request for listing memos.
#[derive(Debug, Clone, Default)]
pub struct ListMemosRequest {
    /// Page size; defaults to [`crate::defaults::PAGE_SIZE`].
    pub page_size: Option<i64>,
    /// Continuation token from a previous response (a 1-based page number).
    pub page_token: Option<String>,
    /// Filter expression in the memo filter language.
    pub filter: Option<String>,
    /// Requested lifecycle state; `Normal` (open items) when absent.
    pub state: Option<MemoState>,
}

/// Response for listing memos.
#[derive(Debug, Clone)]
pub struct ListMemosResponse {
    pub memos: Vec<Memo>,
    /// Token for the next page, empty when the listing is exhausted. A full
    /// page always yields a token, so the final token may point at an empty
    /// page.
    pub next_page_token: String,
}

/// Request for creating a memo.
#[derive(Debug, Clone, Default)]
pub struct CreateMemoRequest {
    pub content: String,
    pub visibility: Option<Visibility>,
    /// Explicit tags, unioned with `#tag` tokens scanned from the content.
    pub tags: Vec<String>,
    pub pinned: bool,
    pub attachments: Vec<Attachment>,
    pub relations: Vec<MemoRelation>,
    pub location: Option<Location>,
}

/// Fields addressable by an update mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoField {
    Content,
    Visibility,
    Location,
    Relations,
    Attachments,
    Pinned,
    State,
}

/// Partial memo update. A field takes effect only when the corresponding
/// [`MemoField`] is present in the update mask; for every masked field
/// except `location`, a `None` value keeps the current one. A masked
/// `location` of `None` clears the location.
#[derive(Debug, Clone, Default)]
pub struct UpdateMemoPatch {
    pub content: Option<String>,
    pub visibility: Option<Visibility>,
    pub location: Option<Location>,
    pub relations: Option<Vec<MemoRelation>>,
    pub attachments: Option<Vec<Attachment>>,
    pub pinned: Option<bool>,
    pub state: Option<MemoState>,
    /// Explicit tags to union with tags scanned from the merged content;
    /// applied regardless of the mask, like the content scan itself.
    pub tags: Option<Vec<String>>,
}

/// Repository for memo CRUD, comment, and reaction operations.
///
/// Updates are whole-item read-modify-write against a tracker API without
/// version tokens; write paths are serialized per item within the process,
/// but concurrent writers in other processes remain last-write-wins.
#[async_trait]
pub trait MemoRepository: Send + Sync {
    /// List one page of memos in the requested state.
    async fn list(&self, req: ListMemosRequest) -> Result<ListMemosResponse>;

    /// Fetch one memo with its reactions.
    async fn get(&self, name: &str) -> Result<Memo>;

    /// Create a memo.
    async fn create(&self, req: CreateMemoRequest) -> Result<Memo>;

    /// Apply a masked partial update.
    async fn update(&self, name: &str, patch: UpdateMemoPatch, mask: &[MemoField])
        -> Result<Memo>;

    /// Transition NORMAL → ARCHIVED (close the backing item).
    async fn archive(&self, name: &str) -> Result<Memo>;

    /// Transition ARCHIVED → NORMAL (reopen the backing item).
    async fn restore(&self, name: &str) -> Result<Memo>;

    /// Soft-delete: close the backing item and replace its labels with the
    /// reserved deleted label. Terminal; there is no way back.
    async fn delete(&self, name: &str) -> Result<()>;

    /// List the comments of a memo.
    async fn list_comments(&self, name: &str) -> Result<Vec<Memo>>;

    /// Append a comment to a memo.
    async fn create_comment(&self, name: &str, content: &str) -> Result<Memo>;

    /// List the reactions of a memo.
    async fn list_reactions(&self, name: &str) -> Result<Vec<Reaction>>;

    /// Add a reaction to a memo.
    async fn upsert_reaction(&self, name: &str, reaction_type: &str) -> Result<Reaction>;

    /// Remove a reaction, addressed by `memos/{n}/reactions/{id}`.
    async fn delete_reaction(&self, reaction_name: &str) -> Result<()>;
}

// =============================================================================
// ATTACHMENT REPOSITORY
// =============================================================================

/// Request for creating an attachment.
#[derive(Debug, Clone, Default)]
pub struct CreateAttachmentRequest {
    /// Original filename; the store prefixes it to avoid collisions.
    pub filename: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
    /// MIME type; detected from the content when absent.
    pub mime_type: Option<String>,
}

/// Repository for binary attachment files.
#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    /// List every attachment; an absent directory yields an empty list.
    async fn list(&self) -> Result<Vec<Attachment>>;

    /// Upload a new attachment under a collision-resistant filename.
    async fn create(&self, req: CreateAttachmentRequest) -> Result<Attachment>;

    /// Delete an attachment. When `sha` is absent it is fetched first,
    /// costing an extra round trip; prefer supplying it from a prior read.
    async fn delete(&self, name: &str, sha: Option<&str>) -> Result<()>;
}

// =============================================================================
// SETTINGS / SHORTCUTS REPOSITORY
// =============================================================================

/// Repository for user settings and saved search shortcuts.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Read settings, merged over defaults with the theme/appearance alias
    /// pair resolved.
    async fn get_settings(&self) -> Result<UserSettings>;

    /// Apply a partial settings update.
    async fn update_settings(&self, patch: UserSettingsPatch) -> Result<UserSettings>;

    /// List all shortcuts.
    async fn list_shortcuts(&self) -> Result<Vec<Shortcut>>;

    /// Fetch one shortcut by `shortcuts/{id}`; absent ids are an error.
    async fn get_shortcut(&self, name: &str) -> Result<Shortcut>;

    /// Append a new shortcut with a generated id.
    async fn create_shortcut(&self, title: &str, filter: &str) -> Result<Shortcut>;

    /// Replace a shortcut matched by id; absent ids are an error.
    async fn update_shortcut(&self, shortcut: Shortcut) -> Result<Shortcut>;

    /// Remove a shortcut by `shortcuts/{id}`; removing an absent shortcut
    /// is a no-op.
    async fn delete_shortcut(&self, name: &str) -> Result<()>;
}

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Repository for user identity and statistics.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// The authenticated user of the backing repository.
    async fn current_user(&self) -> Result<User>;

    /// Aggregate memo statistics, optionally narrowed to one creator.
    async fn user_stats(&self, username: Option<&str>) -> Result<UserStats>;
}
