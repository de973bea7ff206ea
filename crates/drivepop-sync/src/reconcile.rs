//! Reconciliation: remote items the run does not manage
//!
//! After a populate pass, anything Drive holds under a managed folder that
//! the run index does not know about is *unmanaged*. Two listings find them:
//!
//! 1. Items at the drive root carrying the base folder's name. Only one
//!    of them is the managed base; the others are duplicates.
//! 2. The direct children of every indexed folder.
//!
//! Unmanaged folders are reported as a whole and never listed, so their
//! contents are not reported separately.

use std::collections::VecDeque;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, trace};

use drivepop_core::domain::{Index, RemoteId};
use drivepop_core::ports::{ICloudProvider, ParentRef, RemoteItem};

/// A remote item absent from the run index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmanagedItem {
    pub id: RemoteId,
    /// Remote path, `/`-separated, starting at the base folder name
    pub path: String,
    pub is_folder: bool,
}

/// Factory for [`UnmanagedItems`] cursors
pub struct Reconciler {
    cloud_provider: Arc<dyn ICloudProvider>,
    base_name: String,
}

impl Reconciler {
    pub fn new(cloud_provider: Arc<dyn ICloudProvider>, base_name: impl Into<String>) -> Self {
        Self {
            cloud_provider,
            base_name: base_name.into(),
        }
    }

    /// Starts a fresh enumeration of the items `index` does not contain
    ///
    /// Nothing is listed until the cursor is pulled.
    pub fn unmanaged<'a>(&self, index: &'a Index) -> UnmanagedItems<'a> {
        let mut listings = VecDeque::new();
        listings.push_back(Listing {
            parent: ParentRef::DriveRoot,
            name: Some(self.base_name.clone()),
            prefix: None,
        });
        for folder in index.folders() {
            listings.push_back(Listing {
                parent: ParentRef::Folder(folder.id().clone()),
                name: None,
                prefix: Some(folder.path().to_string()),
            });
        }

        UnmanagedItems {
            cloud_provider: self.cloud_provider.clone(),
            index,
            listings,
            current: None,
            buffer: VecDeque::new(),
        }
    }
}

/// One paginated children listing
#[derive(Debug)]
struct Listing {
    parent: ParentRef,
    /// Exact-name restriction
    name: Option<String>,
    /// Path of the listed folder; `None` for the drive root
    prefix: Option<String>,
}

/// Listing in progress and the token of its next page
#[derive(Debug)]
struct ActiveListing {
    listing: Listing,
    /// `None` before the first page is fetched
    next_page: Option<Option<String>>,
}

/// Pull-based cursor over unmanaged items
///
/// Pages are fetched on demand; each listing is followed until Drive
/// returns no further page token.
pub struct UnmanagedItems<'a> {
    cloud_provider: Arc<dyn ICloudProvider>,
    index: &'a Index,
    listings: VecDeque<Listing>,
    current: Option<ActiveListing>,
    buffer: VecDeque<RemoteItem>,
}

impl UnmanagedItems<'_> {
    /// The next unmanaged item, or `None` when every listing is exhausted
    ///
    /// # Errors
    /// Returns an error if a listing request fails.
    pub async fn next(&mut self) -> Result<Option<UnmanagedItem>> {
        loop {
            if let Some(active) = &self.current {
                while let Some(item) = self.buffer.pop_front() {
                    if self.index.contains(&item.id) {
                        trace!(id = %item.id, "Managed");
                        continue;
                    }
                    let path = match &active.listing.prefix {
                        Some(prefix) => format!("{prefix}/{}", item.name),
                        None => item.name.clone(),
                    };
                    debug!(path = %path, id = %item.id, "Unmanaged item");
                    return Ok(Some(UnmanagedItem {
                        id: item.id,
                        path,
                        is_folder: item.is_folder,
                    }));
                }
            }

            let page_token = match &self.current {
                None => {
                    let Some(listing) = self.listings.pop_front() else {
                        return Ok(None);
                    };
                    self.current = Some(ActiveListing {
                        listing,
                        next_page: None,
                    });
                    None
                }
                Some(ActiveListing {
                    next_page: Some(None),
                    ..
                }) => {
                    self.current = None;
                    continue;
                }
                Some(ActiveListing {
                    next_page: Some(Some(token)),
                    ..
                }) => Some(token.clone()),
                Some(ActiveListing {
                    next_page: None, ..
                }) => None,
            };

            let Some(active) = self.current.as_mut() else {
                continue;
            };
            let page = self
                .cloud_provider
                .list_children(
                    &active.listing.parent,
                    active.listing.name.as_deref(),
                    page_token.as_deref(),
                )
                .await
                .with_context(|| format!("Failed to list children of {}", active.listing.parent))?;

            active.next_page = Some(page.next_page_token);
            self.buffer.extend(page.items);
        }
    }

    /// Drains the cursor into a vector
    pub async fn collect_all(mut self) -> Result<Vec<UnmanagedItem>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }
}
