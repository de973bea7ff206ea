//! Cloud provider port (driven/secondary port)
//!
//! This module defines the interface for the remote storage service. The
//! implementation targets Google Drive v3, but the sync engine only sees
//! the operations below, all keyed by remote identifiers.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific
//!   and don't need domain-level classification.
//! - Uses `#[async_trait]` for async trait methods.
//! - [`ICloudProvider::trash_items`] is the only call that reports failures
//!   per item instead of failing as a whole.

use serde::{Deserialize, Serialize};

use crate::domain::newtypes::RemoteId;
use crate::ports::local_filesystem::LocalFile;

// ============================================================================
// Parent references
// ============================================================================

/// Where a lookup or creation happens
///
/// `DriveRoot` is the top of the configured corpus: the shared drive when
/// one is configured, otherwise the user's My Drive root. The adapter
/// resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentRef {
    DriveRoot,
    Folder(RemoteId),
}

impl ParentRef {
    /// The folder ID, or `None` for the drive root
    #[must_use]
    pub fn folder_id(&self) -> Option<&RemoteId> {
        match self {
            Self::Folder(id) => Some(id),
            Self::DriveRoot => None,
        }
    }
}

impl std::fmt::Display for ParentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DriveRoot => write!(f, "<drive root>"),
            Self::Folder(id) => write!(f, "{id}"),
        }
    }
}

// ============================================================================
// Port-level DTOs
// ============================================================================

/// A remote item as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteItem {
    /// Provider-specific item identifier
    pub id: RemoteId,
    /// Item name
    pub name: String,
    /// Whether this item is a folder
    pub is_folder: bool,
    /// Lowercase hex content checksum (None for folders, or when the
    /// provider did not compute one)
    pub checksum: Option<String>,
}

/// One page of a children listing
#[derive(Debug, Clone, Default)]
pub struct ItemPage {
    pub items: Vec<RemoteItem>,
    /// Token for the next page (None on the last page)
    pub next_page_token: Option<String>,
}

/// Outcome of one sub-request of a batched trash call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrashOutcome {
    /// The item the sub-request targeted
    pub id: RemoteId,
    /// `Err` carries the provider's description of the failure
    pub result: Result<(), String>,
}

impl TrashOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

// ============================================================================
// ICloudProvider trait
// ============================================================================

/// Port trait for remote storage operations
///
/// ## Implementation Notes
///
/// - Lookups ignore trashed items.
/// - Implementations must not retry mutations: the engine relies on at most
///   one mutation attempt per item per run.
/// - All methods assume that a valid access token is available.
#[async_trait::async_trait]
pub trait ICloudProvider: Send + Sync {
    /// Looks up a shared drive by name
    ///
    /// # Returns
    /// The drive ID, or `None` if no drive has that name
    async fn find_drive(&self, name: &str) -> anyhow::Result<Option<RemoteId>>;

    /// Finds the oldest non-trashed item called `name` directly under `parent`
    async fn find_child(&self, parent: &ParentRef, name: &str)
        -> anyhow::Result<Option<RemoteItem>>;

    /// Lists one page of non-trashed items directly under `parent`
    ///
    /// # Arguments
    /// * `parent` - Folder (or drive root) to list
    /// * `name` - Restrict the listing to items with exactly this name
    /// * `page_token` - Token from the previous page, `None` for the first
    async fn list_children(
        &self,
        parent: &ParentRef,
        name: Option<&str>,
        page_token: Option<&str>,
    ) -> anyhow::Result<ItemPage>;

    /// Creates a folder called `name` under `parent`
    async fn create_folder(&self, parent: &ParentRef, name: &str) -> anyhow::Result<RemoteItem>;

    /// Creates a file called `name` under `parent` with the content of `file`
    async fn create_file(
        &self,
        parent: &ParentRef,
        name: &str,
        file: &LocalFile,
    ) -> anyhow::Result<RemoteItem>;

    /// Replaces the content of an existing file with `file`, keeping its ID
    async fn update_file(&self, id: &RemoteId, file: &LocalFile) -> anyhow::Result<RemoteItem>;

    /// Moves every item in `ids` to the trash using batched requests
    ///
    /// # Returns
    /// One [`TrashOutcome`] per requested ID, in request order. A failed
    /// sub-request, or a batch that could not be sent, is reported in the
    /// outcomes of the items it carried. An `Err` means nothing was
    /// delivered at all.
    async fn trash_items(&self, ids: &[RemoteId]) -> anyhow::Result<Vec<TrashOutcome>>;
}
