//! Integration tests for the memo store against a mocked GitHub API.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use carnet_core::{
    CreateMemoRequest, Error, ListMemosRequest, MemoField, MemoRepository, MemoState,
    UpdateMemoPatch, Visibility,
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

/// Matches PATCH bodies that carry no state transition at all.
struct NoStateTransition;

impl wiremock::Match for NoStateTransition {
    fn matches(&self, request: &wiremock::Request) -> bool {
        serde_json::from_slice::<serde_json::Value>(&request.body)
            .map(|v| v.get("state").is_none())
            .unwrap_or(false)
    }
}

fn issue_json(number: i64, state: &str, labels: &[&str], body: &str) -> serde_json::Value {
    json!({
        "number": number,
        "title": body.lines().next().unwrap_or("t"),
        "body": body,
        "labels": labels.iter().map(|l| json!({ "name": l })).collect::<Vec<_>>(),
        "state": state,
        "user": { "login": "octo" },
        "created_at": "2026-07-01T10:00:00Z",
        "updated_at": "2026-07-01T10:05:00Z",
    })
}

#[tokio::test]
async fn test_create_then_get_scenario() {
    let server = MockServer::start().await;

    // The errand tag label does not exist yet and gets created.
    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/labels/tag:errand"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repos/octo/notes/labels"))
        .and(body_partial_json(json!({ "name": "tag:errand", "color": "0075ca" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "name": "tag:errand" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Plain content carries no frontmatter block.
    Mock::given(method("POST"))
        .and(path("/repos/octo/notes/issues"))
        .and(body_partial_json(json!({
            "title": "Buy milk #errand",
            "body": "Buy milk #errand",
            "labels": ["tag:errand"],
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(issue_json(
            1,
            "open",
            &["tag:errand"],
            "Buy milk #errand",
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/issues/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(issue_json(
            1,
            "open",
            &["tag:errand"],
            "Buy milk #errand",
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/issues/1/reactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = store(&server);
    let created = store
        .memos
        .create(CreateMemoRequest {
            content: "Buy milk #errand".to_string(),
            ..CreateMemoRequest::default()
        })
        .await
        .unwrap();

    assert_eq!(created.name, "memos/1");
    assert_eq!(created.tags, vec!["errand".to_string()]);
    assert_eq!(created.visibility, Visibility::Private);
    assert_eq!(created.state, MemoState::Normal);
    assert!(!created.pinned);

    let fetched = store.memos.get("memos/1").await.unwrap();
    assert_eq!(fetched.content, created.content);
    assert_eq!(fetched.tags, created.tags);
}

#[tokio::test]
async fn test_pagination_terminates_after_full_page() {
    let server = MockServer::start().await;

    // Three matching memos listed two at a time.
    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/issues"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "2"))
        .and(query_param("state", "open"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            issue_json(3, "open", &[], "three"),
            issue_json(2, "open", &[], "two"),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/issues"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([issue_json(1, "open", &[], "one")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server);

    let first = store
        .memos
        .list(ListMemosRequest {
            page_size: Some(2),
            ..ListMemosRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(first.memos.len(), 2);
    assert_eq!(first.next_page_token, "2");

    let second = store
        .memos
        .list(ListMemosRequest {
            page_size: Some(2),
            page_token: Some(first.next_page_token),
            ..ListMemosRequest::default()
        })
        .await
        .unwrap();
    assert_eq!(second.memos.len(), 1);
    assert_eq!(second.next_page_token, "");
}

#[tokio::test]
async fn test_list_pushes_tag_filter_down_and_post_filters_creator() {
    let server = MockServer::start().await;

    let mut foreign = issue_json(5, "open", &["tag:work"], "by someone else");
    foreign["user"] = json!({ "login": "hubot" });

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/issues"))
        .and(query_param("labels", "tag:work"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            issue_json(6, "open", &["tag:work"], "mine"),
            foreign,
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server);
    let page = store
        .memos
        .list(ListMemosRequest {
            filter: Some(r#"tag in ["work"] && creator == "users/octo""#.to_string()),
            ..ListMemosRequest::default()
        })
        .await
        .unwrap();

    assert_eq!(page.memos.len(), 1);
    assert_eq!(page.memos[0].name, "memos/6");
    assert_eq!(page.memos[0].creator, "users/octo");
}

#[tokio::test]
async fn test_list_excludes_pull_requests() {
    let server = MockServer::start().await;

    let mut pr = issue_json(8, "open", &[], "a pull request");
    pr["pull_request"] = json!({ "url": "https://example.com/pr/8" });

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/issues"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(json!([issue_json(9, "open", &[], "a memo"), pr])))
        .mount(&server)
        .await;

    let store = store(&server);
    let page = store
        .memos
        .list(ListMemosRequest {
            page_size: Some(2),
            ..ListMemosRequest::default()
        })
        .await
        .unwrap();

    assert_eq!(page.memos.len(), 1);
    assert_eq!(page.memos[0].name, "memos/9");
    // The fetched page shrank below page_size once the PR was dropped, so
    // the listing reports itself exhausted.
    assert_eq!(page.next_page_token, "");
}

#[tokio::test]
async fn test_update_mask_keeps_unmasked_fields() {
    let server = MockServer::start().await;

    let body = "---\nvisibility: PUBLIC\n---\nold content";
    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/issues/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(issue_json(5, "open", &[], body)))
        .expect(1)
        .mount(&server)
        .await;

    // Only `content` is masked: the patch's visibility change must not
    // reach the written body, and no state lands in the PATCH.
    let expected_body = "---\nvisibility: PUBLIC\n---\nnew content";
    Mock::given(method("PATCH"))
        .and(path("/repos/octo/notes/issues/5"))
        .and(body_partial_json(json!({
            "title": "new content",
            "body": expected_body,
            "labels": [],
        })))
        .and(NoStateTransition)
        .respond_with(
            ResponseTemplate::new(200).set_body_json(issue_json(5, "open", &[], expected_body)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server);
    let updated = store
        .memos
        .update(
            "memos/5",
            UpdateMemoPatch {
                content: Some("new content".to_string()),
                visibility: Some(Visibility::Private),
                state: Some(MemoState::Archived),
                ..UpdateMemoPatch::default()
            },
            &[MemoField::Content],
        )
        .await
        .unwrap();

    assert_eq!(updated.content, "new content");
    assert_eq!(updated.visibility, Visibility::Public);
    assert_eq!(updated.state, MemoState::Normal);
}

#[tokio::test]
async fn test_soft_delete_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/labels/deleted"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "deleted" })))
        .mount(&server)
        .await;

    // Deletion discards prior labels and closes the issue.
    Mock::given(method("PATCH"))
        .and(path("/repos/octo/notes/issues/9"))
        .and(body_partial_json(json!({ "state": "closed", "labels": ["deleted"] })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(issue_json(9, "closed", &["deleted"], "gone")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/issues/9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(issue_json(9, "closed", &["deleted"], "gone")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/issues/9/reactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = store(&server);
    store.memos.delete("memos/9").await.unwrap();

    let memo = store.memos.get("memos/9").await.unwrap();
    assert_eq!(memo.state, MemoState::Deleted);

    // No path back to NORMAL: restore refuses, and the single expected
    // PATCH (the deletion) stays the only one.
    let err = store.memos.restore("memos/9").await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = store
        .memos
        .update(
            "memos/9",
            UpdateMemoPatch {
                content: Some("resurrected".to_string()),
                ..UpdateMemoPatch::default()
            },
            &[MemoField::Content],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_archive_and_restore_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/issues/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(issue_json(3, "open", &[], "x")))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/repos/octo/notes/issues/3"))
        .and(body_partial_json(json!({ "state": "closed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(issue_json(3, "closed", &[], "x")))
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server);
    let archived = store.memos.archive("memos/3").await.unwrap();
    assert_eq!(archived.state, MemoState::Archived);
}

#[tokio::test]
async fn test_get_missing_memo_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/issues/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
        .mount(&server)
        .await;

    let store = store(&server);
    let err = store.memos.get("memos/404").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_get_rejects_malformed_name() {
    let server = MockServer::start().await;
    let store = store(&server);

    let err = store.memos.get("not-a-memo").await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_comments_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/notes/issues/7/comments"))
        .and(body_partial_json(json!({ "body": "Sounds good" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 91,
            "body": "Sounds good",
            "user": { "login": "hubot" },
            "created_at": "2026-07-02T08:00:00Z",
            "updated_at": "2026-07-02T08:00:00Z",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/notes/issues/7/comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 91,
            "body": "Sounds good",
            "user": { "login": "hubot" },
            "created_at": "2026-07-02T08:00:00Z",
            "updated_at": "2026-07-02T08:00:00Z",
        }])))
        .mount(&server)
        .await;

    let store = store(&server);
    let created = store
        .memos
        .create_comment("memos/7", "Sounds good")
        .await
        .unwrap();
    assert_eq!(created.name, "memos/7/comments/91");
    assert_eq!(created.parent.as_deref(), Some("memos/7"));
    assert_eq!(created.visibility, Visibility::Private);

    let comments = store.memos.list_comments("memos/7").await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].content, "Sounds good");
    assert_eq!(comments[0].creator, "users/hubot");
}

#[tokio::test]
async fn test_reactions_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/octo/notes/issues/7/reactions"))
        .and(body_partial_json(json!({ "content": "heart" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 55,
            "content": "heart",
            "user": { "login": "octo" },
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/repos/octo/notes/issues/7/reactions/55$"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server);
    let reaction = store
        .memos
        .upsert_reaction("memos/7", "heart")
        .await
        .unwrap();
    assert_eq!(reaction.name, "memos/7/reactions/55");
    assert_eq!(reaction.content_id, "memos/7");
    assert_eq!(reaction.reaction_type, "heart");

    store.memos.delete_reaction(&reaction.name).await.unwrap();
}
