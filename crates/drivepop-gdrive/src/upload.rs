//! Upload operations for the Google Drive API
//!
//! Provides functions for writing file content:
//! - [`create_file`] - Creates a new file with metadata and content
//! - [`update_file`] - Replaces the content of an existing file
//!
//! Files up to [`SIMPLE_UPLOAD_LIMIT`] go out in one request (multipart for
//! creation, media for updates). Anything larger opens a resumable session
//! and is streamed from disk in [`CHUNK_SIZE`] pieces, so memory use stays
//! bounded by one chunk.
//!
//! ## Google Drive API References
//!
//! - [Multipart upload](https://developers.google.com/drive/api/guides/manage-uploads#multipart)
//! - [Resumable upload](https://developers.google.com/drive/api/guides/manage-uploads#resumable)
//! - [files.update](https://developers.google.com/drive/api/reference/rest/v3/files/update)

use std::path::Path;

use anyhow::{bail, Context, Result};
use reqwest::header::{CONTENT_RANGE, LOCATION};
use reqwest::{Method, StatusCode};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use uuid::Uuid;

use drivepop_core::domain::RemoteId;
use drivepop_core::ports::{LocalFile, RemoteItem};

use crate::client::{classify_status, DriveClient};
use crate::files::{DriveFile, FILE_FIELDS};
use crate::DriveError;

/// Largest file sent in a single request (5 MiB)
pub const SIMPLE_UPLOAD_LIMIT: u64 = 5 * 1024 * 1024;

/// Bytes per resumable chunk; Drive requires a multiple of 256 KiB
pub const CHUNK_SIZE: usize = 8 * 1024 * 1024;

// ============================================================================
// multipart/related body
// ============================================================================

/// Builds a `multipart/related` body holding JSON metadata and raw content
fn related_body(boundary: &str, metadata: &serde_json::Value, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 512);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!("--{boundary}\r\nContent-Type: application/octet-stream\r\n\r\n").as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

async fn read_small(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

// ============================================================================
// create_file
// ============================================================================

/// Creates a new file called `name` under `parent_id` with the content of `file`
///
/// Uses `POST /upload/drive/v3/files` with `uploadType=multipart`, or
/// `uploadType=resumable` when the file is larger than
/// [`SIMPLE_UPLOAD_LIMIT`].
///
/// # Errors
/// Returns an error if the file cannot be read, any upload request fails,
/// or the response cannot be parsed
pub async fn create_file(
    client: &DriveClient,
    parent_id: &str,
    name: &str,
    file: &LocalFile,
) -> Result<RemoteItem> {
    debug!(parent = parent_id, name, bytes = file.size, "Uploading new file");

    let metadata = serde_json::json!({
        "name": name,
        "parents": [parent_id],
    });

    let created: DriveFile = if file.size > SIMPLE_UPLOAD_LIMIT {
        let session =
            create_upload_session(client, Method::POST, "/upload/drive/v3/files", &metadata, file.size)
                .await
                .with_context(|| format!("Failed to start upload of '{name}'"))?;
        upload_chunks(client, &session, file, CHUNK_SIZE)
            .await
            .with_context(|| format!("Failed to upload '{name}'"))?
    } else {
        let data = read_small(&file.path).await?;
        let boundary = format!("drivepop_{}", Uuid::new_v4().simple());
        let builder = client
            .request(Method::POST, "/upload/drive/v3/files")
            .query(&[
                ("uploadType", "multipart"),
                ("supportsAllDrives", "true"),
                ("fields", FILE_FIELDS),
            ])
            .header(
                "Content-Type",
                format!("multipart/related; boundary={boundary}"),
            )
            .body(related_body(&boundary, &metadata, &data));

        client
            .send(builder)
            .await
            .with_context(|| format!("Failed to upload '{name}'"))?
            .json()
            .await
            .context("Failed to parse upload response")?
    };

    let item = created.into_remote_item()?;
    debug!(id = %item.id, name = %item.name, "File created");
    Ok(item)
}

// ============================================================================
// update_file
// ============================================================================

/// Replaces the content of file `id`, keeping its identifier and metadata
///
/// Uses `PATCH /upload/drive/v3/files/{id}` with `uploadType=media`, or a
/// resumable session above [`SIMPLE_UPLOAD_LIMIT`].
pub async fn update_file(client: &DriveClient, id: &RemoteId, file: &LocalFile) -> Result<RemoteItem> {
    debug!(id = %id, bytes = file.size, "Uploading new content");

    let path = format!("/upload/drive/v3/files/{}", id.as_str());
    let updated: DriveFile = if file.size > SIMPLE_UPLOAD_LIMIT {
        let session =
            create_upload_session(client, Method::PATCH, &path, &serde_json::json!({}), file.size)
                .await
                .with_context(|| format!("Failed to start content update of {id}"))?;
        upload_chunks(client, &session, file, CHUNK_SIZE)
            .await
            .with_context(|| format!("Failed to update content of {id}"))?
    } else {
        let data = read_small(&file.path).await?;
        let builder = client
            .request(Method::PATCH, &path)
            .query(&[
                ("uploadType", "media"),
                ("supportsAllDrives", "true"),
                ("fields", FILE_FIELDS),
            ])
            .header("Content-Type", "application/octet-stream")
            .body(data);

        client
            .send(builder)
            .await
            .with_context(|| format!("Failed to update content of {id}"))?
            .json()
            .await
            .context("Failed to parse update response")?
    };

    Ok(updated.into_remote_item()?)
}

// ============================================================================
// Resumable sessions
// ============================================================================

/// Opens a resumable upload session and returns its URL
///
/// `path` is the upload endpoint (`/upload/drive/v3/files` for a new file,
/// `/upload/drive/v3/files/{id}` for new content) and `method` the matching
/// verb. The session URL comes back in the `Location` header.
pub(crate) async fn create_upload_session(
    client: &DriveClient,
    method: Method,
    path: &str,
    metadata: &serde_json::Value,
    size: u64,
) -> Result<String> {
    let builder = client
        .request(method, path)
        .query(&[
            ("uploadType", "resumable"),
            ("supportsAllDrives", "true"),
            ("fields", FILE_FIELDS),
        ])
        .header("X-Upload-Content-Type", "application/octet-stream")
        .header("X-Upload-Content-Length", size.to_string())
        .json(metadata);

    let response = client.send(builder).await?;
    let session = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            DriveError::InvalidResponse("upload session response has no Location header".into())
        })?
        .to_string();

    debug!(bytes = size, "Upload session created");
    Ok(session)
}

/// `Content-Range` value for `len` bytes starting at `offset`
fn content_range(offset: u64, len: u64, total: u64) -> String {
    format!("bytes {}-{}/{}", offset, offset + len - 1, total)
}

/// Sends one chunk to a session
///
/// Returns `None` while Drive asks for more (HTTP 308) and the final file
/// resource once the upload completes.
pub(crate) async fn upload_chunk(
    client: &DriveClient,
    session_url: &str,
    data: Vec<u8>,
    offset: u64,
    total: u64,
) -> Result<Option<DriveFile>> {
    let range = content_range(offset, data.len() as u64, total);
    debug!(range = %range, "Uploading chunk");

    let response = client
        .http_client()
        .put(session_url)
        .bearer_auth(client.access_token())
        .header(CONTENT_RANGE, &range)
        .body(data)
        .send()
        .await
        .map_err(DriveError::from)?;

    let status = response.status();
    match status {
        StatusCode::PERMANENT_REDIRECT => Ok(None),
        StatusCode::OK | StatusCode::CREATED => {
            let file = response
                .json()
                .await
                .context("Failed to parse upload session response")?;
            Ok(Some(file))
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(anyhow::Error::new(classify_status(status, &body))
                .context(format!("Chunk {range} was rejected")))
        }
    }
}

/// Streams `file` into an open session, `chunk_size` bytes at a time
///
/// The file is reopened and read sequentially; a file that turns out
/// shorter than `file.size` aborts the upload.
pub(crate) async fn upload_chunks(
    client: &DriveClient,
    session_url: &str,
    file: &LocalFile,
    chunk_size: usize,
) -> Result<DriveFile> {
    let total = file.size;
    info!(
        path = %file.path.display(),
        bytes = total,
        chunks = total.div_ceil(chunk_size as u64),
        "Starting resumable upload"
    );

    let mut reader = tokio::fs::File::open(&file.path)
        .await
        .with_context(|| format!("Failed to open {}", file.path.display()))?;

    let mut offset = 0u64;
    while offset < total {
        let want = (total - offset).min(chunk_size as u64);
        let mut chunk = Vec::with_capacity(want as usize);
        (&mut reader)
            .take(want)
            .read_to_end(&mut chunk)
            .await
            .with_context(|| format!("Failed to read {}", file.path.display()))?;
        if (chunk.len() as u64) < want {
            bail!(
                "{} shrank to {} bytes during upload, expected {}",
                file.path.display(),
                offset + chunk.len() as u64,
                total
            );
        }

        let finished = upload_chunk(client, session_url, chunk, offset, total).await?;
        offset += want;

        if let Some(uploaded) = finished {
            if offset < total {
                bail!("Upload session closed at byte {offset} of {total}");
            }
            info!(bytes = total, "Resumable upload complete");
            return Ok(uploaded);
        }
    }

    bail!("Upload session accepted all {total} bytes without returning the file")
}
