//! File listing, drive lookup and folder creation
//!
//! ## Google Drive API References
//!
//! - [files.list](https://developers.google.com/drive/api/reference/rest/v3/files/list)
//! - [files.create](https://developers.google.com/drive/api/reference/rest/v3/files/create)
//! - [drives.list](https://developers.google.com/drive/api/reference/rest/v3/drives/list)

use anyhow::{Context, Result};
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use drivepop_core::domain::RemoteId;
use drivepop_core::ports::{ItemPage, RemoteItem};

use crate::client::DriveClient;
use crate::query;
use crate::DriveError;

/// MIME type Drive uses to mark folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Fields requested for every file resource
pub(crate) const FILE_FIELDS: &str = "id,name,mimeType,sha256Checksum";

// ============================================================================
// Drive API response types
// ============================================================================

/// A file resource, restricted to [`FILE_FIELDS`]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DriveFile {
    id: String,
    name: String,
    mime_type: Option<String>,
    /// Lowercase hex SHA-256, absent for folders and Google-native documents
    sha256_checksum: Option<String>,
}

impl DriveFile {
    /// Converts the resource into the port-level [`RemoteItem`]
    pub(crate) fn into_remote_item(self) -> Result<RemoteItem, DriveError> {
        let id = RemoteId::new(self.id)
            .map_err(|e| DriveError::InvalidResponse(e.to_string()))?;
        Ok(RemoteItem {
            id,
            is_folder: self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE),
            name: self.name,
            checksum: self.sha256_checksum.map(|c| c.to_ascii_lowercase()),
        })
    }
}

/// Response from `GET /drive/v3/files`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// Response from `GET /drive/v3/drives`
#[derive(Debug, Deserialize)]
struct DriveList {
    #[serde(default)]
    drives: Vec<SharedDrive>,
}

#[derive(Debug, Deserialize)]
struct SharedDrive {
    id: String,
    name: String,
}

// ============================================================================
// Corpus
// ============================================================================

/// The body of items a listing searches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Corpus {
    /// The authenticated user's My Drive
    MyDrive,
    /// A shared drive, by ID
    SharedDrive(RemoteId),
}

impl Corpus {
    /// The folder ID of the corpus root
    ///
    /// My Drive exposes its root under the `root` alias; a shared drive's
    /// root folder has the drive's own ID.
    pub fn root_id(&self) -> &str {
        match self {
            Corpus::MyDrive => "root",
            Corpus::SharedDrive(id) => id.as_str(),
        }
    }
}

// ============================================================================
// files.list
// ============================================================================

/// Parameters of one children listing page
#[derive(Debug, Clone, Default)]
pub struct ListRequest<'a> {
    /// Folder whose direct children are listed
    pub parent_id: &'a str,
    /// Restrict to items with exactly this name
    pub name: Option<&'a str>,
    /// Maximum items per page (`None` leaves the server default)
    pub page_size: Option<u32>,
    /// Continuation token from a previous page
    pub page_token: Option<&'a str>,
}

/// Lists one page of non-trashed children, oldest first
///
/// Uses `GET /drive/v3/files` with a `'<parent>' in parents` query, ordered
/// by `createdTime`.
///
/// # Errors
/// Returns an error if the request fails or the response cannot be parsed
pub async fn list_children(
    client: &DriveClient,
    corpus: &Corpus,
    request: &ListRequest<'_>,
) -> Result<ItemPage> {
    let q = query::children(request.parent_id, request.name);
    let fields = format!("nextPageToken,files({FILE_FIELDS})");
    debug!(q = %q, page_token = ?request.page_token, "Listing children");

    let mut builder = client.request(Method::GET, "/drive/v3/files").query(&[
        ("q", q.as_str()),
        ("orderBy", "createdTime"),
        ("fields", fields.as_str()),
        ("supportsAllDrives", "true"),
        ("includeItemsFromAllDrives", "true"),
    ]);
    builder = match corpus {
        Corpus::MyDrive => builder.query(&[("corpora", "user")]),
        Corpus::SharedDrive(id) => {
            builder.query(&[("corpora", "drive"), ("driveId", id.as_str())])
        }
    };
    if let Some(size) = request.page_size {
        builder = builder.query(&[("pageSize", size)]);
    }
    if let Some(token) = request.page_token {
        builder = builder.query(&[("pageToken", token)]);
    }

    let list: FileList = client
        .send(builder)
        .await
        .context("files.list request failed")?
        .json()
        .await
        .context("Failed to parse files.list response")?;

    let items = list
        .files
        .into_iter()
        .map(DriveFile::into_remote_item)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        count = items.len(),
        has_more = list.next_page_token.is_some(),
        "Listed children"
    );
    Ok(ItemPage {
        items,
        next_page_token: list.next_page_token,
    })
}

// ============================================================================
// drives.list
// ============================================================================

/// Looks up a shared drive by exact name
///
/// # Returns
/// The ID of the first matching drive, or `None`
pub async fn find_drive(client: &DriveClient, name: &str) -> Result<Option<RemoteId>> {
    let q = query::drive_named(name);
    debug!(name, "Looking up shared drive");

    let builder = client
        .request(Method::GET, "/drive/v3/drives")
        .query(&[("q", q.as_str()), ("pageSize", "1")]);

    let list: DriveList = client
        .send(builder)
        .await
        .context("drives.list request failed")?
        .json()
        .await
        .context("Failed to parse drives.list response")?;

    match list.drives.into_iter().next() {
        Some(drive) => {
            debug!(name = %drive.name, id = %drive.id, "Found shared drive");
            let id = RemoteId::new(drive.id)
                .map_err(|e| DriveError::InvalidResponse(e.to_string()))?;
            Ok(Some(id))
        }
        None => Ok(None),
    }
}

// ============================================================================
// files.create (metadata only)
// ============================================================================

/// Creates a folder called `name` under `parent_id`
///
/// Uses `POST /drive/v3/files` with the folder MIME type.
pub async fn create_folder(client: &DriveClient, parent_id: &str, name: &str) -> Result<RemoteItem> {
    debug!(parent = parent_id, name, "Creating folder");

    let metadata = serde_json::json!({
        "name": name,
        "mimeType": FOLDER_MIME_TYPE,
        "parents": [parent_id],
    });
    let builder = client
        .request(Method::POST, "/drive/v3/files")
        .query(&[("supportsAllDrives", "true"), ("fields", FILE_FIELDS)])
        .json(&metadata);

    let file: DriveFile = client
        .send(builder)
        .await
        .with_context(|| format!("Failed to create folder '{name}'"))?
        .json()
        .await
        .context("Failed to parse files.create response")?;

    let item = file.into_remote_item()?;
    debug!(id = %item.id, name = %item.name, "Folder created");
    Ok(item)
}
