//! Core data models for carnet.
//!
//! These types are shared across all carnet crates and represent the
//! domain entities the adapter exposes on top of the backing issue tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::defaults;

// =============================================================================
// MEMO TYPES
// =============================================================================

/// Lifecycle state of a memo.
///
/// `Normal` maps to an open tracker item and `Archived` to a closed one.
/// `Deleted` is the terminal soft-deleted state: a closed item carrying the
/// reserved deleted label. It is derived once when converting from the
/// tracker and never re-inferred from labels downstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemoState {
    #[default]
    Normal,
    Archived,
    Deleted,
}

/// Visibility of a memo, stored in the frontmatter block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Private,
    Protected,
    Public,
}

impl Visibility {
    /// Frontmatter/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "PRIVATE",
            Visibility::Protected => "PROTECTED",
            Visibility::Public => "PUBLIC",
        }
    }

    /// Parse the frontmatter/wire representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PRIVATE" => Some(Visibility::Private),
            "PROTECTED" => Some(Visibility::Protected),
            "PUBLIC" => Some(Visibility::Public),
            _ => None,
        }
    }
}

/// Geolocation attached to a memo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// Content-derived flags, computed by regex heuristics over the memo body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoProperty {
    pub has_link: bool,
    pub has_task_list: bool,
    pub has_code: bool,
}

/// Kind of a relation between two memos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    Reference,
    Comment,
}

/// One side of a memo relation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedMemo {
    pub name: String,
    #[serde(default)]
    pub snippet: String,
}

/// A typed link between two memos, embedded in the frontmatter block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoRelation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<RelatedMemo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_memo: Option<RelatedMemo>,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
}

/// A reaction attached to a memo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    /// `memos/{n}/reactions/{id}`
    pub name: String,
    /// `users/{login}`
    pub creator: String,
    pub reaction_type: String,
    /// Name of the memo the reaction belongs to.
    pub content_id: String,
}

/// A binary attachment stored as a repository file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// `attachments/{filename}`
    pub name: String,
    pub filename: String,
    /// Resolvable raw-content URL.
    pub external_link: String,
    /// MIME type; known only at creation time, empty when listed.
    #[serde(rename = "type")]
    pub mime_type: String,
    pub size: i64,
    /// Content hash, used as optimistic-concurrency token for deletion.
    #[serde(default)]
    pub sha: String,
    /// Back-reference to the owning memo, populated only when correlated
    /// through a memo's metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
}

/// A note, backed by one tracker item. Comments share the same shape with
/// `parent` set to the owning memo's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    /// `memos/{uid}`
    pub name: String,
    /// Tracker item number (comment id for comments).
    pub uid: i64,
    pub title: String,
    /// Body with the frontmatter block stripped.
    pub content: String,
    pub snippet: String,
    pub tags: Vec<String>,
    pub state: MemoState,
    pub pinned: bool,
    /// `users/{login}`
    pub creator: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub display_time: DateTime<Utc>,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<MemoRelation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<Reaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<MemoProperty>,
    /// Owning memo name, set only on comments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

// =============================================================================
// SHORTCUT TYPES
// =============================================================================

/// A saved search shortcut, persisted inside a single JSON array file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortcut {
    /// `shortcuts/{id}`
    pub name: String,
    pub id: String,
    pub title: String,
    /// Filter expression string, in the memo filter language.
    pub filter: String,
}

// =============================================================================
// SETTINGS TYPES
// =============================================================================

fn default_locale() -> String {
    defaults::DEFAULT_LOCALE.to_string()
}

/// Per-user settings, persisted inside a single JSON object file.
///
/// `appearance` and `theme` are aliases kept for backward compatibility;
/// reads and writes resolve them so the pair never diverges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Default visibility applied to newly created memos.
    #[serde(default)]
    pub memo_visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            memo_visibility: Visibility::Private,
            appearance: Some(defaults::DEFAULT_APPEARANCE.to_string()),
            theme: Some(defaults::DEFAULT_APPEARANCE.to_string()),
        }
    }
}

/// Partial settings update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserSettingsPatch {
    pub locale: Option<String>,
    pub memo_visibility: Option<Visibility>,
    pub appearance: Option<String>,
    pub theme: Option<String>,
}

// =============================================================================
// USER TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserState {
    Normal,
    Archived,
}

/// The authenticated user of the backing repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// `users/{login}`
    pub name: String,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub avatar_url: String,
    pub description: String,
    pub role: UserRole,
    pub state: UserState,
}

/// Per-type memo counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoTypeStats {
    pub link_count: i64,
    pub code_count: i64,
    pub todo_count: i64,
}

/// Aggregate statistics shown on a user's profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub memo_count: i64,
    /// Closed memos, excluding soft-deleted ones.
    pub archived_memo_count: i64,
    pub tag_count: HashMap<String, i64>,
    pub memo_type_stats: MemoTypeStats,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub memo_display_timestamps: Vec<DateTime<Utc>>,
}
