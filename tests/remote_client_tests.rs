use std::io::Write;

use mdbrowse::remote::{
    Backend, ClientConfig, DocumentQuery, DocumentUpdate, RemoteClient, RemoteError, UploadMeta,
    Role, UserChange,
};
use serde_json::json;
use tokio_test::assert_ok;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_string_contains, header, method, path, query_param},
};

// ============================================================================
// Helper Functions
// ============================================================================

fn client_for(server: &MockServer) -> RemoteClient {
    RemoteClient::new(ClientConfig {
        base_url: server.uri(),
        ..Default::default()
    })
}

/// Mounts a successful login returning `token` and logs the client in.
async fn logged_in(server: &MockServer, token: &str) -> RemoteClient {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "ada", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .expect(1)
        .mount(server)
        .await;

    let client = client_for(server);
    client.login("ada", "pw").await.expect("login should succeed");
    client
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn test_token_from_login_is_sent_as_bearer() {
    let server = MockServer::start().await;
    let client = logged_in(&server, "tok-1").await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "username": "ada", "role": "admin" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let me = client.current_user().await.unwrap();
    assert_eq!(me.username, "ada");
    assert_eq!(me.role, "admin");
    assert!(client.has_token());
}

#[tokio::test]
async fn test_failed_login_keeps_no_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": "invalid_credentials", "message": "Invalid username or password" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.login("ada", "nope").await.unwrap_err();
    assert!(err.is_auth_failure());
    assert_eq!(err.to_string(), "Invalid username or password");
    assert!(!client.has_token());
}

#[tokio::test]
async fn test_base_url_override_before_login() {
    let unused = MockServer::start().await;
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&unused);
    client.set_base_url(&format!("{}/", server.uri()));
    assert_eq!(client.base_url(), server.uri());
    client.login("ada", "pw").await.unwrap();
}

// ============================================================================
// Documents
// ============================================================================

#[tokio::test]
async fn test_document_list_forwards_query_params() {
    let server = MockServer::start().await;
    let client = logged_in(&server, "t").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/documents"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "25"))
        .and(query_param("sort_by", "updated_at"))
        .and(query_param("sort_order", "desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "d1", "title": "Runbook", "tags": ["ops"] }],
            "total": 26,
            "page": 2,
            "page_size": 25
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client
        .list_documents(&DocumentQuery {
            page: 2,
            page_size: 25,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.total, Some(26));
    assert_eq!(page.data[0].title, "Runbook");
    assert_eq!(page.data[0].tags, vec!["ops"]);
}

#[tokio::test]
async fn test_error_envelope_is_surfaced_verbatim() {
    let server = MockServer::start().await;
    let client = logged_in(&server, "t").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/documents/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": "not_found", "message": "Document not found", "hint": "Refresh the list" }
        })))
        .mount(&server)
        .await;

    let err = client.get_document("missing").await.unwrap_err();
    assert_eq!(
        err,
        RemoteError::Api {
            status: 404,
            code: "not_found".into(),
            message: "Document not found".into(),
            hint: Some("Refresh the list".into()),
        }
    );
}

#[tokio::test]
async fn test_non_envelope_error_body_falls_back_to_raw_text() {
    let server = MockServer::start().await;
    let client = logged_in(&server, "t").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    match client.search("rust", 1, 20).await.unwrap_err() {
        RemoteError::Api { status, code, message, .. } => {
            assert_eq!(status, 502);
            assert_eq!(code, "error");
            assert_eq!(message, "Bad Gateway");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_accepts_empty_204() {
    let server = MockServer::start().await;
    let client = logged_in(&server, "t").await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/documents/d1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    assert_ok!(client.delete_document("d1").await);
}

#[tokio::test]
async fn test_malformed_success_body() {
    let server = MockServer::start().await;
    let client = logged_in(&server, "t").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/documents/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.get_document("d1").await.unwrap_err();
    assert!(matches!(err, RemoteError::Malformed(_)));
}

#[tokio::test]
async fn test_null_fields_read_as_empty() {
    let server = MockServer::start().await;
    let client = logged_in(&server, "t").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "d1", "title": "Runbook", "category": null, "tags": null, "folder_id": null }],
            "total": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/documents/d1/versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "versions": [{ "version_number": 1, "change_note": null, "created_by": null }]
        })))
        .mount(&server)
        .await;

    let page = client.list_documents(&DocumentQuery::default()).await.unwrap();
    assert_eq!(page.data[0].title, "Runbook");
    assert_eq!(page.data[0].category, "");
    assert!(page.data[0].tags.is_empty());

    let versions = client.list_versions("d1").await.unwrap();
    assert_eq!(versions[0].version_number, 1);
    assert_eq!(versions[0].change_note, "");
}

#[tokio::test]
async fn test_update_sends_only_changed_fields() {
    let server = MockServer::start().await;
    let client = logged_in(&server, "t").await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/documents/d1"))
        .and(body_json(json!({ "title": "New title", "change_note": "rename" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .update_document(
            "d1",
            &DocumentUpdate {
                title: Some("New title".into()),
                change_note: Some("rename".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rollback_body() {
    let server = MockServer::start().await;
    let client = logged_in(&server, "t").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/documents/d1/rollback"))
        .and(body_json(json!({ "target_version": 2, "change_note": "Rollback to v2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    assert_ok!(client.rollback("d1", 2, "Rollback to v2").await);
}

// ============================================================================
// Upload
// ============================================================================

#[tokio::test]
async fn test_markdown_upload_is_multipart() {
    let server = MockServer::start().await;
    let client = logged_in(&server, "t").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/documents/upload"))
        .and(header("authorization", "Bearer t"))
        .and(body_string_contains("filename=\"notes.md\""))
        .and(body_string_contains("# Notes"))
        .and(body_string_contains("name=\"visibility\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "d9" })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("notes.md");
    let mut file = std::fs::File::create(&file_path).unwrap();
    writeln!(file, "# Notes").unwrap();

    let answer = client
        .upload_document(&file_path, &UploadMeta::default())
        .await
        .unwrap();
    assert_eq!(answer["id"], "d9");
}

#[tokio::test]
async fn test_non_markdown_upload_never_reaches_server() {
    let server = MockServer::start().await;
    let client = logged_in(&server, "t").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/documents/upload"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("notes.txt");
    std::fs::write(&file_path, "plain").unwrap();

    let err = client
        .upload_document(&file_path, &UploadMeta::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Validation(_)));
}

// ============================================================================
// Folders, users, settings, vocabulary
// ============================================================================

#[tokio::test]
async fn test_folders_accept_bare_and_wrapped_lists() {
    let bare = MockServer::start().await;
    let client = logged_in(&bare, "t").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/folders"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "id": "f1", "name": "Guides" }])),
        )
        .mount(&bare)
        .await;
    assert_eq!(client.list_folders().await.unwrap()[0].name, "Guides");

    let wrapped = MockServer::start().await;
    let client = logged_in(&wrapped, "t").await;
    Mock::given(method("GET"))
        .and(path("/api/v1/folders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "f1", "name": "Guides" }, { "id": "f2", "name": "Ops", "parent_id": "f1" }]
        })))
        .mount(&wrapped)
        .await;
    let folders = client.list_folders().await.unwrap();
    assert_eq!(folders.len(), 2);
    assert_eq!(folders[1].parent_id.as_deref(), Some("f1"));
}

#[tokio::test]
async fn test_user_role_change_body() {
    let server = MockServer::start().await;
    let client = logged_in(&server, "t").await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/admin/users/bob"))
        .and(body_json(json!({ "role": "editor" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .update_user("bob", &UserChange::Role(Role::Editor))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_settings_round_trip_through_server() {
    let server = MockServer::start().await;
    let client = logged_in(&server, "t").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/admin/settings"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "registration_enabled": false, "site_name": "docs" })),
        )
        .mount(&server)
        .await;

    let settings = client.get_settings().await.unwrap();
    assert!(!settings.registration_enabled());
    assert!(
        settings
            .entries()
            .contains(&("site_name".to_string(), "docs".to_string()))
    );
}

#[tokio::test]
async fn test_vocabulary_accepts_strings_and_records() {
    let server = MockServer::start().await;
    let client = logged_in(&server, "t").await;

    Mock::given(method("GET"))
        .and(path("/api/v1/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["guides", "notes"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "name": "ops", "count": 4 }, { "name": "rust", "count": 1 }]
        })))
        .mount(&server)
        .await;

    assert_eq!(client.list_categories().await.unwrap(), vec!["guides", "notes"]);
    assert_eq!(client.list_tags().await.unwrap(), vec!["ops", "rust"]);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let client = RemoteClient::new(ClientConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        ..Default::default()
    });
    let err = client.login("ada", "pw").await.unwrap_err();
    assert!(matches!(err, RemoteError::Network(_)));
}
