//! Integration tests for file content uploads

use drivepop_core::ports::{ICloudProvider, ParentRef};
use drivepop_gdrive::upload::SIMPLE_UPLOAD_LIMIT;
use tempfile::TempDir;
use wiremock::matchers::{
    body_bytes, body_json, body_string_contains, header, header_regex, method, path, query_param,
};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, rid};

#[tokio::test]
async fn test_create_file_uses_multipart_upload() {
    let (server, provider) = common::setup_drive_mock().await;
    let dir = TempDir::new().unwrap();
    let file = common::local_file(dir.path(), "a.txt", b"hello world");

    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(query_param("uploadType", "multipart"))
        .and(header_regex("content-type", "^multipart/related; boundary=.+"))
        .and(body_string_contains(r#""name":"a.txt""#))
        .and(body_string_contains(r#""parents":["docs1"]"#))
        .and(body_string_contains("hello world"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::file_json("a1", "a.txt", "abc123")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let item = provider
        .create_file(&ParentRef::Folder(rid("docs1")), "a.txt", &file)
        .await
        .unwrap();
    assert_eq!(item.id, rid("a1"));
    assert_eq!(item.checksum.as_deref(), Some("abc123"));
    assert!(!item.is_folder);
}

#[tokio::test]
async fn test_update_file_uses_media_upload_and_keeps_id() {
    let (server, provider) = common::setup_drive_mock().await;
    let dir = TempDir::new().unwrap();
    let file = common::local_file(dir.path(), "a.txt", b"new content");

    Mock::given(method("PATCH"))
        .and(path("/upload/drive/v3/files/a1"))
        .and(query_param("uploadType", "media"))
        .and(header("content-type", "application/octet-stream"))
        .and(body_bytes(b"new content".to_vec()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::file_json("a1", "a.txt", "def456")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let item = provider.update_file(&rid("a1"), &file).await.unwrap();
    assert_eq!(item.id, rid("a1"));
    assert_eq!(item.checksum.as_deref(), Some("def456"));
}

#[tokio::test]
async fn test_large_file_goes_through_resumable_session() {
    let (server, provider) = common::setup_drive_mock().await;
    let dir = TempDir::new().unwrap();
    let size = SIMPLE_UPLOAD_LIMIT + 1;
    let content = vec![7u8; size as usize];
    let file = common::local_file(dir.path(), "big.bin", &content);

    let session = format!("{}/upload/session/s1", server.uri());
    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(query_param("uploadType", "resumable"))
        .and(header("x-upload-content-length", size.to_string().as_str()))
        .and(body_json(serde_json::json!({"name": "big.bin", "parents": ["docs1"]})))
        .respond_with(ResponseTemplate::new(200).insert_header("Location", session.as_str()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/upload/session/s1"))
        .and(header(
            "content-range",
            format!("bytes 0-{}/{}", size - 1, size).as_str(),
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::file_json("big1", "big.bin", "f00d")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let item = provider
        .create_file(&ParentRef::Folder(rid("docs1")), "big.bin", &file)
        .await
        .unwrap();
    assert_eq!(item.id, rid("big1"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].body.len() as u64, size);
}

#[tokio::test]
async fn test_large_update_opens_session_on_existing_file() {
    let (server, provider) = common::setup_drive_mock().await;
    let dir = TempDir::new().unwrap();
    let content = vec![1u8; SIMPLE_UPLOAD_LIMIT as usize + 10];
    let file = common::local_file(dir.path(), "big.bin", &content);

    let session = format!("{}/upload/session/s2", server.uri());
    Mock::given(method("PATCH"))
        .and(path("/upload/drive/v3/files/big1"))
        .and(query_param("uploadType", "resumable"))
        .respond_with(ResponseTemplate::new(200).insert_header("Location", session.as_str()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/upload/session/s2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::file_json("big1", "big.bin", "beef")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let item = provider.update_file(&rid("big1"), &file).await.unwrap();
    assert_eq!(item.checksum.as_deref(), Some("beef"));
}

#[tokio::test]
async fn test_session_without_location_is_an_error() {
    let (server, provider) = common::setup_drive_mock().await;
    let dir = TempDir::new().unwrap();
    let content = vec![0u8; SIMPLE_UPLOAD_LIMIT as usize + 1];
    let file = common::local_file(dir.path(), "big.bin", &content);

    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider
        .create_file(&ParentRef::DriveRoot, "big.bin", &file)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("Location"));
}

#[tokio::test]
async fn test_upload_server_error_propagates() {
    let (server, provider) = common::setup_drive_mock().await;
    let dir = TempDir::new().unwrap();
    let file = common::local_file(dir.path(), "a.txt", b"x");

    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let result = provider
        .create_file(&ParentRef::DriveRoot, "a.txt", &file)
        .await;
    assert!(result.is_err());
}
