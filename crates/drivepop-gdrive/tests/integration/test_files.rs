//! Integration tests for listing, lookup and folder creation

use drivepop_core::ports::{ICloudProvider, ParentRef};
use drivepop_gdrive::client::DriveClient;
use drivepop_gdrive::provider::DriveCloudProvider;
use wiremock::matchers::{body_partial_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{self, rid};

// ============================================================================
// find_drive
// ============================================================================

#[tokio::test]
async fn test_find_drive_returns_first_match() {
    let (server, provider) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/drives"))
        .and(query_param("q", "name = 'Team Drive'"))
        .and(query_param("pageSize", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "drives": [{ "id": "0ABteam", "name": "Team Drive" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = provider.find_drive("Team Drive").await.unwrap();
    assert_eq!(id, Some(rid("0ABteam")));
}

#[tokio::test]
async fn test_find_drive_not_found() {
    let (server, provider) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/drives"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "drives": []
        })))
        .mount(&server)
        .await;

    assert_eq!(provider.find_drive("Nope").await.unwrap(), None);
}

// ============================================================================
// find_child / list_children
// ============================================================================

#[tokio::test]
async fn test_find_child_queries_by_parent_and_name() {
    let (server, provider) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param(
            "q",
            "'root' in parents and trashed = false and name = 'Backups'",
        ))
        .and(query_param("orderBy", "createdTime"))
        .and(query_param("pageSize", "1"))
        .and(query_param("corpora", "user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [common::folder_json("base1", "Backups")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let item = provider
        .find_child(&ParentRef::DriveRoot, "Backups")
        .await
        .unwrap()
        .expect("folder should be found");
    assert_eq!(item.id, rid("base1"));
    assert!(item.is_folder);
}

#[tokio::test]
async fn test_find_child_absent() {
    let (server, provider) = common::setup_drive_mock().await;
    common::mount_list(
        &server,
        "'f1' in parents and trashed = false and name = 'a.txt'",
        serde_json::json!([]),
    )
    .await;

    let item = provider
        .find_child(&ParentRef::Folder(rid("f1")), "a.txt")
        .await
        .unwrap();
    assert!(item.is_none());
}

#[tokio::test]
async fn test_shared_drive_listing_uses_drive_corpus() {
    let server = MockServer::start().await;
    let provider = DriveCloudProvider::new(DriveClient::with_base_url("t", server.uri()))
        .with_shared_drive(rid("0ABteam"));

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", "'0ABteam' in parents and trashed = false"))
        .and(query_param("corpora", "drive"))
        .and(query_param("driveId", "0ABteam"))
        .and(query_param("supportsAllDrives", "true"))
        .and(query_param("includeItemsFromAllDrives", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [common::folder_json("base1", "Backups")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = provider
        .list_children(&ParentRef::DriveRoot, None, None)
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert!(page.next_page_token.is_none());
}

#[tokio::test]
async fn test_list_children_pagination_tokens() {
    let (server, provider) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nextPageToken": "page2",
            "files": [common::file_json("a1", "a.txt", "00ff")]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("pageToken", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [common::file_json("b1", "b.txt", "11ee")]
        })))
        .mount(&server)
        .await;

    let parent = ParentRef::Folder(rid("f1"));
    let first = provider.list_children(&parent, None, None).await.unwrap();
    assert_eq!(first.items[0].id, rid("a1"));
    assert_eq!(first.items[0].checksum.as_deref(), Some("00ff"));
    assert_eq!(first.next_page_token.as_deref(), Some("page2"));

    let second = provider
        .list_children(&parent, None, Some("page2"))
        .await
        .unwrap();
    assert_eq!(second.items[0].id, rid("b1"));
    assert!(second.next_page_token.is_none());
}

#[tokio::test]
async fn test_list_escapes_quotes_in_names() {
    let (server, provider) = common::setup_drive_mock().await;
    common::mount_list(
        &server,
        r"'f1' in parents and trashed = false and name = 'Bob\'s.txt'",
        serde_json::json!([common::file_json("x1", "Bob's.txt", "aa")]),
    )
    .await;

    let item = provider
        .find_child(&ParentRef::Folder(rid("f1")), "Bob's.txt")
        .await
        .unwrap();
    assert_eq!(item.unwrap().name, "Bob's.txt");
}

// ============================================================================
// create_folder
// ============================================================================

#[tokio::test]
async fn test_create_folder_sends_folder_mime_type() {
    let (server, provider) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/drive/v3/files"))
        .and(body_partial_json(serde_json::json!({
            "name": "docs",
            "mimeType": common::FOLDER_MIME,
            "parents": ["base1"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::folder_json("docs1", "docs")))
        .expect(1)
        .mount(&server)
        .await;

    let item = provider
        .create_folder(&ParentRef::Folder(rid("base1")), "docs")
        .await
        .unwrap();
    assert_eq!(item.id, rid("docs1"));
    assert!(item.is_folder);
}

// ============================================================================
// Error handling
// ============================================================================

#[tokio::test]
async fn test_unauthorized_listing_fails() {
    let (server, provider) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "code": 401, "message": "Invalid Credentials" }
        })))
        .mount(&server)
        .await;

    let err = provider
        .list_children(&ParentRef::DriveRoot, None, None)
        .await
        .unwrap_err();
    let drive_err = err
        .downcast_ref::<drivepop_gdrive::DriveError>()
        .expect("should carry a DriveError");
    assert!(matches!(drive_err, drivepop_gdrive::DriveError::Unauthorized(m) if m == "Invalid Credentials"));
}
