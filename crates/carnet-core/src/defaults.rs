//! Centralized default constants for the carnet stores.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates should reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for memo listing.
pub const PAGE_SIZE: i64 = 20;

// =============================================================================
// REPOSITORY LAYOUT
// =============================================================================

/// Path of the settings JSON object inside the backing repository.
pub const SETTINGS_PATH: &str = ".memos/settings.json";

/// Path of the shortcuts JSON array inside the backing repository.
pub const SHORTCUTS_PATH: &str = ".memos/shortcuts.json";

/// Directory holding binary attachment files.
pub const ATTACHMENTS_DIR: &str = "attachments";

// =============================================================================
// LABELS
// =============================================================================

/// Prefix carried by every tag label.
pub const TAG_LABEL_PREFIX: &str = "tag:";

/// Reserved label marking a pinned memo.
pub const PINNED_LABEL: &str = "pinned";

/// Reserved label marking a soft-deleted memo.
pub const DELETED_LABEL: &str = "deleted";

/// Color used when creating the pinned label.
pub const PINNED_LABEL_COLOR: &str = "e4e669";

/// Color used when creating tag labels and the deleted label.
pub const TAG_LABEL_COLOR: &str = "0075ca";

// =============================================================================
// MEMO DERIVATION
// =============================================================================

/// Maximum characters kept from the first content line for the title.
pub const TITLE_MAX_CHARS: usize = 100;

/// Maximum characters kept for the content snippet.
pub const SNIPPET_MAX_CHARS: usize = 200;

/// Title fallback for memos whose content yields no usable first line.
pub const UNTITLED_MEMO_TITLE: &str = "Untitled memo";

// =============================================================================
// SETTINGS
// =============================================================================

/// Default UI locale.
pub const DEFAULT_LOCALE: &str = "en";

/// Default appearance/theme value.
pub const DEFAULT_APPEARANCE: &str = "system";

// =============================================================================
// CONCURRENCY
// =============================================================================

/// Retries attempted after a stale-token conflict on a JSON file write.
pub const WRITE_CONFLICT_RETRIES: u32 = 3;
