//! Batched trash requests
//!
//! Drive accepts up to [`MAX_BATCH_SIZE`] sub-requests in one
//! `multipart/mixed` POST to `/batch/drive/v3`. Each part is an
//! `application/http` message tagged with a `Content-ID`; the response
//! echoes it as `response-<id>` so outcomes can be matched back to the
//! items that produced them, whatever order the parts come back in.
//!
//! ## Google Drive API References
//!
//! - [Batching requests](https://developers.google.com/drive/api/guides/performance#batch-requests)

use std::collections::HashMap;

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use tracing::{debug, warn};
use uuid::Uuid;

use drivepop_core::domain::RemoteId;
use drivepop_core::ports::TrashOutcome;

use crate::client::{error_message, DriveClient};
use crate::DriveError;

/// Maximum number of sub-requests Drive accepts in one batch
pub const MAX_BATCH_SIZE: usize = 100;

// ============================================================================
// Request encoding
// ============================================================================

/// Content-ID of the sub-request at `position`
fn content_id(position: usize) -> String {
    format!("item-{position}")
}

/// Encodes one `multipart/mixed` batch body trashing every item in `ids`
///
/// `first` is the position of `ids[0]` in the overall request and
/// numbers the Content-IDs.
pub fn encode_trash_batch(boundary: &str, ids: &[RemoteId], first: usize) -> String {
    let mut body = String::new();
    for (offset, id) in ids.iter().enumerate() {
        body.push_str(&format!(
            "--{boundary}\r\n\
             Content-Type: application/http\r\n\
             Content-ID: <{}>\r\n\
             \r\n\
             PATCH /drive/v3/files/{}?supportsAllDrives=true\r\n\
             Content-Type: application/json; charset=UTF-8\r\n\
             \r\n\
             {{\"trashed\":true}}\r\n",
            content_id(first + offset),
            id.as_str(),
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    body
}

// ============================================================================
// Response parsing
// ============================================================================

/// One part of a batch response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartResponse {
    /// Content-ID without angle brackets, e.g. `response-item-3`
    pub content_id: Option<String>,
    /// HTTP status of the sub-request
    pub status: u16,
    /// Sub-response body
    pub body: String,
}

impl PartResponse {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Extracts the `boundary` parameter of a multipart Content-Type
pub fn boundary_of(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("boundary") {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}

/// Looks up a header value in a block of `Name: value` lines
fn header<'a>(block: &'a str, name: &str) -> Option<&'a str> {
    block.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim())
    })
}

/// Splits a block at its first blank line
fn split_head(block: &str) -> (&str, &str) {
    block.split_once("\n\n").unwrap_or((block, ""))
}

/// Parses a `multipart/mixed` batch response body
///
/// # Errors
/// Returns [`DriveError::InvalidResponse`] if a part lacks a parseable
/// HTTP status line.
pub fn parse_batch_response(boundary: &str, body: &str) -> Result<Vec<PartResponse>, DriveError> {
    let body = body.replace("\r\n", "\n");
    let delimiter = format!("--{boundary}");
    let mut parts = Vec::new();

    // The first chunk is the preamble; a chunk starting with "--" is the epilogue.
    for chunk in body.split(delimiter.as_str()).skip(1) {
        if chunk.starts_with("--") {
            break;
        }
        let chunk = chunk.trim_start_matches('\n');
        let (outer_headers, message) = split_head(chunk);
        let (inner_head, inner_body) = split_head(message.trim_start_matches('\n'));

        let status_line = inner_head.lines().next().unwrap_or_default();
        let status = status_line
            .split_whitespace()
            .nth(1)
            .and_then(|code| code.parse::<u16>().ok())
            .ok_or_else(|| {
                DriveError::InvalidResponse(format!("bad status line in batch part: {status_line:?}"))
            })?;

        parts.push(PartResponse {
            content_id: header(outer_headers, "Content-ID")
                .map(|v| v.trim_start_matches('<').trim_end_matches('>').to_string()),
            status,
            body: inner_body.trim_end_matches('\n').to_string(),
        });
    }

    Ok(parts)
}

/// Maps parsed parts back to the items that produced them
///
/// Parts without a Content-ID are matched by position. Items without a
/// matching part get a failed outcome.
pub fn match_outcomes(ids: &[RemoteId], first: usize, parts: Vec<PartResponse>) -> Vec<TrashOutcome> {
    let mut by_id: HashMap<String, PartResponse> = HashMap::new();
    for (offset, part) in parts.into_iter().enumerate() {
        let key = part
            .content_id
            .clone()
            .unwrap_or_else(|| format!("response-{}", content_id(first + offset)));
        by_id.insert(key, part);
    }

    ids.iter()
        .enumerate()
        .map(|(offset, id)| {
            let key = format!("response-{}", content_id(first + offset));
            let result = match by_id.remove(&key) {
                Some(part) if part.is_success() => Ok(()),
                Some(part) => Err(format!("HTTP {}: {}", part.status, error_message(&part.body))),
                None => Err("no response for sub-request".to_string()),
            };
            TrashOutcome {
                id: id.clone(),
                result,
            }
        })
        .collect()
}

// ============================================================================
// trash_items
// ============================================================================

/// Moves every item in `ids` to the trash with batched requests
///
/// Sends one `POST /batch/drive/v3` per [`MAX_BATCH_SIZE`] items. A failed
/// sub-request is reported in its outcome. A batch that cannot be sent or
/// read fails every item it carried and the remaining batches still go
/// out. An error from this function means no batch got through at all.
pub async fn trash_items(client: &DriveClient, ids: &[RemoteId]) -> Result<Vec<TrashOutcome>> {
    let mut outcomes = Vec::with_capacity(ids.len());
    let mut delivered = 0usize;
    let mut first_error = None;

    for (chunk_no, chunk) in ids.chunks(MAX_BATCH_SIZE).enumerate() {
        let first = chunk_no * MAX_BATCH_SIZE;
        match send_trash_batch(client, chunk, first).await {
            Ok(batch) => {
                delivered += 1;
                outcomes.extend(batch);
            }
            Err(e) => {
                let message = format!("batch request failed: {e:#}");
                warn!(first, items = chunk.len(), error = %message, "Trash batch failed");
                outcomes.extend(chunk.iter().map(|id| TrashOutcome {
                    id: id.clone(),
                    result: Err(message.clone()),
                }));
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) if delivered == 0 => Err(e),
        _ => Ok(outcomes),
    }
}

/// Sends one batch and matches its parts back to `chunk`
async fn send_trash_batch(
    client: &DriveClient,
    chunk: &[RemoteId],
    first: usize,
) -> Result<Vec<TrashOutcome>> {
    let boundary = format!("batch_{}", Uuid::new_v4().simple());
    debug!(items = chunk.len(), first, "Sending trash batch");

    let builder = client
        .request(Method::POST, "/batch/drive/v3")
        .header(
            CONTENT_TYPE,
            format!("multipart/mixed; boundary={boundary}"),
        )
        .body(encode_trash_batch(&boundary, chunk, first));

    let response = client
        .send(builder)
        .await
        .context("Batch trash request failed")?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let response_boundary = boundary_of(&content_type)
        .ok_or_else(|| {
            DriveError::InvalidResponse(format!(
                "batch response is not multipart: {content_type:?}"
            ))
        })?
        .to_string();
    let text = response
        .text()
        .await
        .context("Failed to read batch response")?;

    let parts = parse_batch_response(&response_boundary, &text)?;
    if parts.len() != chunk.len() {
        warn!(
            expected = chunk.len(),
            received = parts.len(),
            "Batch response part count mismatch"
        );
    }
    Ok(match_outcomes(chunk, first, parts))
}
