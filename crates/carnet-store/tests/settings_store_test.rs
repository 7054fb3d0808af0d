//! Integration tests for the settings and shortcuts store against a
//! mocked GitHub API.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use carnet_core::{
    Error, SettingsRepository, Shortcut, UserSettings, UserSettingsPatch, Visibility,
};
use carnet_github::GitHubConfig;
use carnet_store::GitHubStore;

fn store(server: &MockServer) -> GitHubStore {
    GitHubStore::new(GitHubConfig {
        api_url: server.uri(),
        owner: "octo".to_string(),
        repo: "notes".to_string(),
        token: Some("test-token".to_string()),
        timeout_seconds: 5,
        ..GitHubConfig::default()
    })
    .expect("store")
}

fn file_json(path: &str, sha: &str, value: &serde_json::Value) -> serde_json::Value {
    let pretty = serde_json::to_string_pretty(value).unwrap();
    json!({
        "name": path.rsplit('/').next().unwrap(),
        "path": path,
        "sha": sha,
        "size": pretty.len(),
        "type": "file",
        "encoding": "base64",
        // The contents API wraps base64 with newlines.
        "content": BASE64_STANDARD
            .encode(&pretty)
            .as_bytes()
            .chunks(60)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" }))
}

fn commit_json(sha: &str) -> serde_json::Value {
    json!({ "content": { "sha": sha } })
}

#[tokio::test]
async fn test_update_settings_theme_updates_both_aliases() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/contents/.memos/settings.json"))
        .respond_with(not_found())
        .expect(1)
        .mount(&server)
        .await;

    // The first write of a missing file must not carry a sha token.
    let expected = UserSettings {
        theme: Some("dark".to_string()),
        appearance: Some("dark".to_string()),
        ..UserSettings::default()
    };
    let expected_content = BASE64_STANDARD.encode(serde_json::to_string_pretty(&expected).unwrap());
    Mock::given(method("PUT"))
        .and(path("/repos/octo/notes/contents/.memos/settings.json"))
        .and(body_partial_json(json!({
            "message": "Update user settings",
            "content": expected_content,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(commit_json("sha1")))
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server);
    let updated = store
        .settings
        .update_settings(UserSettingsPatch {
            theme: Some("dark".to_string()),
            ..UserSettingsPatch::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.theme.as_deref(), Some("dark"));
    assert_eq!(updated.appearance.as_deref(), Some("dark"));
}

#[tokio::test]
async fn test_get_settings_resolves_alias_and_merges_defaults() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/contents/.memos/settings.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json(
            ".memos/settings.json",
            "abc",
            &json!({ "appearance": "light" }),
        )))
        .mount(&server)
        .await;

    let store = store(&server);
    let settings = store.settings.get_settings().await.unwrap();

    assert_eq!(settings.locale, "en");
    assert_eq!(settings.memo_visibility, Visibility::Private);
    assert_eq!(settings.theme.as_deref(), Some("light"));
    assert_eq!(settings.appearance.as_deref(), Some("light"));
}

#[tokio::test]
async fn test_get_settings_defaults_when_file_missing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/contents/.memos/settings.json"))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let store = store(&server);
    let settings = store.settings.get_settings().await.unwrap();
    assert_eq!(settings, UserSettings::default());
}

#[tokio::test]
async fn test_update_settings_retries_on_stale_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/contents/.memos/settings.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json(
            ".memos/settings.json",
            "stale",
            &json!({ "locale": "en" }),
        )))
        .mount(&server)
        .await;

    // First write loses the race; the retry with a fresh read succeeds.
    Mock::given(method("PUT"))
        .and(path("/repos/octo/notes/contents/.memos/settings.json"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "sha mismatch" })),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/octo/notes/contents/.memos/settings.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(commit_json("sha2")))
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server);
    let updated = store
        .settings
        .update_settings(UserSettingsPatch {
            locale: Some("fr".to_string()),
            ..UserSettingsPatch::default()
        })
        .await
        .unwrap();

    assert_eq!(updated.locale, "fr");
}

#[tokio::test]
async fn test_create_shortcut_appends_to_missing_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/contents/.memos/shortcuts.json"))
        .respond_with(not_found())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/repos/octo/notes/contents/.memos/shortcuts.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(commit_json("sha1")))
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server);
    let shortcut = store
        .settings
        .create_shortcut("Pinned work", r#"tag in ["work"] && pinned == true"#)
        .await
        .unwrap();

    assert_eq!(shortcut.name, format!("shortcuts/{}", shortcut.id));
    assert_eq!(shortcut.title, "Pinned work");
    assert!(uuid::Uuid::parse_str(&shortcut.id).is_ok());
}

#[tokio::test]
async fn test_update_missing_shortcut_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/contents/.memos/shortcuts.json"))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let store = store(&server);
    let err = store
        .settings
        .update_shortcut(Shortcut {
            name: "shortcuts/5a40b9e6-7a54-4ffa-8bc2-3f04e2b05e7d".to_string(),
            id: "5a40b9e6-7a54-4ffa-8bc2-3f04e2b05e7d".to_string(),
            title: "Gone".to_string(),
            filter: String::new(),
        })
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_shortcut_filters_entry_out() {
    let server = MockServer::start().await;

    let keep = Shortcut {
        name: "shortcuts/11111111-1111-4111-8111-111111111111".to_string(),
        id: "11111111-1111-4111-8111-111111111111".to_string(),
        title: "Keep".to_string(),
        filter: "pinned == true".to_string(),
    };
    let drop = Shortcut {
        name: "shortcuts/22222222-2222-4222-8222-222222222222".to_string(),
        id: "22222222-2222-4222-8222-222222222222".to_string(),
        title: "Drop".to_string(),
        filter: String::new(),
    };

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/contents/.memos/shortcuts.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json(
            ".memos/shortcuts.json",
            "abc",
            &serde_json::to_value([&keep, &drop]).unwrap(),
        )))
        .expect(1)
        .mount(&server)
        .await;

    // The whole file is written back with the entry removed, replacing the
    // exact version that was read.
    let expected_content =
        BASE64_STANDARD.encode(serde_json::to_string_pretty(&[&keep]).unwrap());
    Mock::given(method("PUT"))
        .and(path("/repos/octo/notes/contents/.memos/shortcuts.json"))
        .and(body_partial_json(json!({
            "sha": "abc",
            "content": expected_content,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(commit_json("sha2")))
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server);
    store.settings.delete_shortcut(&drop.name).await.unwrap();
}

#[tokio::test]
async fn test_get_shortcut_by_name() {
    let server = MockServer::start().await;

    let shortcut = Shortcut {
        name: "shortcuts/11111111-1111-4111-8111-111111111111".to_string(),
        id: "11111111-1111-4111-8111-111111111111".to_string(),
        title: "Mine".to_string(),
        filter: String::new(),
    };

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/contents/.memos/shortcuts.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json(
            ".memos/shortcuts.json",
            "abc",
            &serde_json::to_value([&shortcut]).unwrap(),
        )))
        .mount(&server)
        .await;

    let store = store(&server);
    let found = store.settings.get_shortcut(&shortcut.name).await.unwrap();
    assert_eq!(found, shortcut);

    let err = store
        .settings
        .get_shortcut("shortcuts/99999999-9999-4999-8999-999999999999")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_non_404_read_failure_propagates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/contents/.memos/settings.json"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "server error" })),
        )
        .mount(&server)
        .await;

    let store = store(&server);
    let err = store.settings.get_settings().await.unwrap_err();
    assert!(matches!(err, Error::Api { status: 500, .. }));
}
