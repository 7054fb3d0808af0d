//! Canonical resource-name construction and parsing.
//!
//! Resource names are the string identifiers passed across the store
//! boundary: `memos/{n}`, `attachments/{path}`, `shortcuts/{uuid}`,
//! `users/{login}`, plus the composite sub-resource names for comments and
//! reactions. Construction is infallible; parsing is strict and fails fast
//! with [`Error::InvalidInput`] on anything malformed.

use uuid::Uuid;

use crate::error::{Error, Result};

/// Prefix of memo resource names.
pub const MEMO_NAME_PREFIX: &str = "memos/";

/// Prefix of user resource names.
pub const USER_NAME_PREFIX: &str = "users/";

/// Prefix of attachment resource names.
pub const ATTACHMENT_NAME_PREFIX: &str = "attachments/";

/// Prefix of shortcut resource names.
pub const SHORTCUT_NAME_PREFIX: &str = "shortcuts/";

/// Build `memos/{number}`.
pub fn memo_name(number: i64) -> String {
    format!("{MEMO_NAME_PREFIX}{number}")
}

/// Build `users/{login}`.
pub fn user_name(login: &str) -> String {
    format!("{USER_NAME_PREFIX}{login}")
}

/// Build `attachments/{filename}`.
pub fn attachment_name(filename: &str) -> String {
    format!("{ATTACHMENT_NAME_PREFIX}{filename}")
}

/// Build `shortcuts/{id}`.
pub fn shortcut_name(id: &str) -> String {
    format!("{SHORTCUT_NAME_PREFIX}{id}")
}

/// Build `memos/{number}/comments/{id}`.
pub fn comment_name(memo_number: i64, comment_id: i64) -> String {
    format!("{MEMO_NAME_PREFIX}{memo_number}/comments/{comment_id}")
}

/// Build `memos/{number}/reactions/{id}`.
pub fn reaction_name(memo_number: i64, reaction_id: i64) -> String {
    format!("{MEMO_NAME_PREFIX}{memo_number}/reactions/{reaction_id}")
}

/// Parse `memos/{number}` into the tracker item number.
pub fn parse_memo_name(name: &str) -> Result<i64> {
    let rest = name
        .strip_prefix(MEMO_NAME_PREFIX)
        .ok_or_else(|| Error::InvalidInput(format!("not a memo name: {name}")))?;
    rest.parse::<i64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| Error::InvalidInput(format!("not a memo name: {name}")))
}

/// Parse `users/{login}` into the login.
pub fn parse_user_name(name: &str) -> Result<&str> {
    name.strip_prefix(USER_NAME_PREFIX)
        .filter(|login| !login.is_empty())
        .ok_or_else(|| Error::InvalidInput(format!("not a user name: {name}")))
}

/// Parse `attachments/{filename}` into the bare filename.
pub fn parse_attachment_name(name: &str) -> Result<&str> {
    name.strip_prefix(ATTACHMENT_NAME_PREFIX)
        .filter(|filename| !filename.is_empty() && !filename.contains('/'))
        .ok_or_else(|| Error::InvalidInput(format!("not an attachment name: {name}")))
}

/// Parse `shortcuts/{id}` into the shortcut UUID.
pub fn parse_shortcut_name(name: &str) -> Result<Uuid> {
    let rest = name
        .strip_prefix(SHORTCUT_NAME_PREFIX)
        .ok_or_else(|| Error::InvalidInput(format!("not a shortcut name: {name}")))?;
    Uuid::parse_str(rest).map_err(|_| Error::InvalidInput(format!("not a shortcut name: {name}")))
}

/// Parse `memos/{number}/reactions/{id}` into (memo number, reaction id).
pub fn parse_reaction_name(name: &str) -> Result<(i64, i64)> {
    let invalid = || Error::InvalidInput(format!("not a reaction name: {name}"));
    let rest = name.strip_prefix(MEMO_NAME_PREFIX).ok_or_else(invalid)?;
    let (number, rest) = rest.split_once('/').ok_or_else(invalid)?;
    let id = rest.strip_prefix("reactions/").ok_or_else(invalid)?;
    let number = number.parse::<i64>().ok().filter(|n| *n > 0);
    let id = id.parse::<i64>().ok().filter(|n| *n > 0);
    match (number, id) {
        (Some(number), Some(id)) => Ok((number, id)),
        _ => Err(invalid()),
    }
}
