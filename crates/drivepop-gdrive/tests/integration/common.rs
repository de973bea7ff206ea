//! Shared test helpers for Drive API integration tests
//!
//! Each helper mounts mock endpoints on a wiremock server; providers are
//! built pointing at that server.

use std::path::Path;

use drivepop_core::domain::RemoteId;
use drivepop_core::ports::LocalFile;
use drivepop_gdrive::client::DriveClient;
use drivepop_gdrive::provider::DriveCloudProvider;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

pub fn rid(s: &str) -> RemoteId {
    RemoteId::new(s.to_string()).unwrap()
}

/// Starts a mock server and returns a My Drive provider pointing at it.
pub async fn setup_drive_mock() -> (MockServer, DriveCloudProvider) {
    let server = MockServer::start().await;
    let client = DriveClient::with_base_url("test-access-token", server.uri());
    (server, DriveCloudProvider::new(client))
}

/// Writes `content` to `dir/name` and describes it as a [`LocalFile`].
///
/// The checksum is left empty; uploads never look at it.
pub fn local_file(dir: &Path, name: &str, content: &[u8]) -> LocalFile {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    LocalFile {
        path,
        size: content.len() as u64,
        sha256: String::new(),
    }
}

/// JSON for a folder resource.
pub fn folder_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({ "id": id, "name": name, "mimeType": FOLDER_MIME })
}

/// JSON for a plain file resource with a SHA-256 checksum.
pub fn file_json(id: &str, name: &str, sha256: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "mimeType": "text/plain",
        "sha256Checksum": sha256
    })
}

/// Mounts a files.list endpoint answering queries equal to `q`.
pub async fn mount_list(server: &MockServer, q: &str, files: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", q))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": files
        })))
        .mount(server)
        .await;
}

/// Builds a `multipart/mixed` batch response body from
/// `(content_id, status_line, json_body)` triples.
pub fn batch_response(boundary: &str, parts: &[(&str, &str, &str)]) -> String {
    let mut body = String::new();
    for (content_id, status, json) in parts {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Type: application/http\r\nContent-ID: <{content_id}>\r\n\r\n\
             HTTP/1.1 {status}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{json}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    body
}
