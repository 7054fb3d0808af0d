//! GitHub-backed settings and shortcuts store.
//!
//! Both entities live in single JSON files inside the backing repository:
//! a settings object and a shortcut array. Every mutation is a
//! read-modify-write of the whole file, carrying the file's content SHA as
//! an optimistic-concurrency token; a stale token comes back as a
//! conflict, and the store retries with a fresh read a bounded number of
//! times before giving up.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use carnet_core::defaults::{
    DEFAULT_APPEARANCE, SETTINGS_PATH, SHORTCUTS_PATH, WRITE_CONFLICT_RETRIES,
};
use carnet_core::names;
use carnet_core::{
    Error, Result, SettingsRepository, Shortcut, UserSettings, UserSettingsPatch,
};
use carnet_github::{ContentEntry, ContentFile, GitHubClient};

/// Resolve the theme/appearance alias pair on a stored settings object so
/// the two fields never diverge: each side prefers its own stored value,
/// then the other alias, then the default.
fn resolve_aliases(stored: UserSettings) -> UserSettings {
    let theme = stored
        .theme
        .clone()
        .or_else(|| stored.appearance.clone())
        .unwrap_or_else(|| DEFAULT_APPEARANCE.to_string());
    let appearance = stored
        .appearance
        .or(stored.theme)
        .unwrap_or_else(|| DEFAULT_APPEARANCE.to_string());
    UserSettings {
        locale: stored.locale,
        memo_visibility: stored.memo_visibility,
        appearance: Some(appearance),
        theme: Some(theme),
    }
}

/// Apply a partial update over current settings. The alias resolution
/// prefers the explicit new value, then the other patched alias, then the
/// stored values, then the default.
fn merge_settings(current: &UserSettings, patch: &UserSettingsPatch) -> UserSettings {
    let theme = patch
        .theme
        .clone()
        .or_else(|| patch.appearance.clone())
        .or_else(|| current.theme.clone())
        .or_else(|| current.appearance.clone())
        .unwrap_or_else(|| DEFAULT_APPEARANCE.to_string());
    let appearance = patch
        .appearance
        .clone()
        .or_else(|| patch.theme.clone())
        .or_else(|| current.appearance.clone())
        .or_else(|| current.theme.clone())
        .unwrap_or_else(|| DEFAULT_APPEARANCE.to_string());

    UserSettings {
        locale: patch
            .locale
            .clone()
            .unwrap_or_else(|| current.locale.clone()),
        memo_visibility: patch.memo_visibility.unwrap_or(current.memo_visibility),
        appearance: Some(appearance),
        theme: Some(theme),
    }
}

fn decode_file_content(file: &ContentFile) -> Result<Vec<u8>> {
    let Some(content) = &file.content else {
        return Ok(Vec::new());
    };
    // The contents API returns base64 with embedded newlines.
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64_STANDARD
        .decode(compact)
        .map_err(|e| Error::Serialization(format!("invalid base64 in {}: {e}", file.path)))
}

/// GitHub implementation of [`SettingsRepository`].
pub struct GitHubSettingsRepository {
    client: Arc<GitHubClient>,
}

impl GitHubSettingsRepository {
    /// Create a new repository over the given client.
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }

    /// Read a JSON file, yielding `(default, empty token)` when it does not
    /// exist yet. Any other failure propagates.
    async fn read_json_file<T: DeserializeOwned>(
        &self,
        path: &str,
        default: T,
    ) -> Result<(T, String)> {
        match self.client.get_content(path).await {
            Err(e) if e.is_not_found() => Ok((default, String::new())),
            Err(e) => Err(e),
            Ok(ContentEntry::Listing(_)) => Ok((default, String::new())),
            Ok(ContentEntry::File(file)) => {
                let bytes = decode_file_content(&file)?;
                if bytes.is_empty() {
                    return Ok((default, String::new()));
                }
                let value = serde_json::from_slice(&bytes)?;
                Ok((value, file.sha))
            }
        }
    }

    /// Write a JSON file. An empty token means "create new file"; a
    /// non-empty token means "replace this exact version". Returns the new
    /// token.
    async fn write_json_file<T: Serialize>(
        &self,
        path: &str,
        value: &T,
        token: &str,
        message: &str,
    ) -> Result<String> {
        let json = serde_json::to_string_pretty(value)?;
        let encoded = BASE64_STANDARD.encode(json);
        let sha = (!token.is_empty()).then_some(token);
        let commit = self.client.put_file(path, message, &encoded, sha).await?;
        Ok(commit.content.map(|c| c.sha).unwrap_or_default())
    }

    /// Run one read-modify-write attempt of `mutate` over the shortcuts
    /// file, retrying on a stale token.
    async fn rewrite_shortcuts<F>(&self, message: &str, mut mutate: F) -> Result<Vec<Shortcut>>
    where
        F: FnMut(Vec<Shortcut>) -> Result<Vec<Shortcut>>,
    {
        let mut attempt = 0;
        loop {
            let (shortcuts, token) = self
                .read_json_file::<Vec<Shortcut>>(SHORTCUTS_PATH, Vec::new())
                .await?;
            let updated = mutate(shortcuts)?;
            match self
                .write_json_file(SHORTCUTS_PATH, &updated, &token, message)
                .await
            {
                Ok(_) => return Ok(updated),
                Err(e) if e.is_conflict() && attempt < WRITE_CONFLICT_RETRIES => {
                    attempt += 1;
                    warn!(
                        "Stale token writing {}, retrying ({}/{})",
                        SHORTCUTS_PATH, attempt, WRITE_CONFLICT_RETRIES
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl SettingsRepository for GitHubSettingsRepository {
    async fn get_settings(&self) -> Result<UserSettings> {
        let (stored, _) = self
            .read_json_file(SETTINGS_PATH, UserSettings::default())
            .await?;
        Ok(resolve_aliases(stored))
    }

    async fn update_settings(&self, patch: UserSettingsPatch) -> Result<UserSettings> {
        let mut attempt = 0;
        loop {
            let (current, token) = self
                .read_json_file(SETTINGS_PATH, UserSettings::default())
                .await?;
            let updated = merge_settings(&current, &patch);
            match self
                .write_json_file(SETTINGS_PATH, &updated, &token, "Update user settings")
                .await
            {
                Ok(_) => {
                    debug!("Updated settings: {:?}", updated);
                    return Ok(updated);
                }
                Err(e) if e.is_conflict() && attempt < WRITE_CONFLICT_RETRIES => {
                    attempt += 1;
                    warn!(
                        "Stale token writing {}, retrying ({}/{})",
                        SETTINGS_PATH, attempt, WRITE_CONFLICT_RETRIES
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn list_shortcuts(&self) -> Result<Vec<Shortcut>> {
        let (shortcuts, _) = self
            .read_json_file::<Vec<Shortcut>>(SHORTCUTS_PATH, Vec::new())
            .await?;
        Ok(shortcuts)
    }

    async fn get_shortcut(&self, name: &str) -> Result<Shortcut> {
        let id = names::parse_shortcut_name(name)?.to_string();
        let shortcuts = self.list_shortcuts().await?;
        shortcuts
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| Error::NotFound(format!("shortcut {name}")))
    }

    async fn create_shortcut(&self, title: &str, filter: &str) -> Result<Shortcut> {
        let id = Uuid::new_v4().to_string();
        let shortcut = Shortcut {
            name: names::shortcut_name(&id),
            id,
            title: title.to_string(),
            filter: filter.to_string(),
        };

        let created = shortcut.clone();
        self.rewrite_shortcuts(&format!("Create shortcut: {title}"), move |mut shortcuts| {
            shortcuts.push(shortcut.clone());
            Ok(shortcuts)
        })
        .await?;
        Ok(created)
    }

    async fn update_shortcut(&self, shortcut: Shortcut) -> Result<Shortcut> {
        let updated = shortcut.clone();
        self.rewrite_shortcuts(
            &format!("Update shortcut: {}", shortcut.title),
            move |mut shortcuts| {
                let index = shortcuts
                    .iter()
                    .position(|s| s.id == shortcut.id)
                    .ok_or_else(|| Error::NotFound(format!("shortcut {}", shortcut.name)))?;
                shortcuts[index] = shortcut.clone();
                Ok(shortcuts)
            },
        )
        .await?;
        Ok(updated)
    }

    async fn delete_shortcut(&self, name: &str) -> Result<()> {
        let id = names::parse_shortcut_name(name)?.to_string();
        self.rewrite_shortcuts(&format!("Delete shortcut: {id}"), move |shortcuts| {
            Ok(shortcuts.into_iter().filter(|s| s.id != id).collect())
        })
        .await?;
        Ok(())
    }
}
