//! DriveCloudProvider - ICloudProvider implementation for Google Drive
//!
//! Wraps the [`DriveClient`] and delegates to the files, upload, and batch
//! modules to fulfil the [`ICloudProvider`] port contract.
//!
//! ## Design Notes
//!
//! - The provider holds the [`Corpus`] so that `ParentRef::DriveRoot`
//!   resolves to the shared drive root or to My Drive's `root` alias.
//! - [`ICloudProvider::find_drive`] does not depend on the corpus, so the
//!   CLI can look the drive up first and then call
//!   [`DriveCloudProvider::with_shared_drive`].

use anyhow::Result;
use tracing::debug;

use drivepop_core::domain::RemoteId;
use drivepop_core::ports::{
    ICloudProvider, ItemPage, LocalFile, ParentRef, RemoteItem, TrashOutcome,
};

use crate::batch;
use crate::client::DriveClient;
use crate::files::{self, Corpus, ListRequest};
use crate::upload;

/// Cloud provider implementation that delegates to the Google Drive API
pub struct DriveCloudProvider {
    client: DriveClient,
    corpus: Corpus,
}

impl DriveCloudProvider {
    /// Creates a provider targeting the user's My Drive
    pub fn new(client: DriveClient) -> Self {
        Self {
            client,
            corpus: Corpus::MyDrive,
        }
    }

    /// Targets the shared drive `drive_id` instead of My Drive
    pub fn with_shared_drive(mut self, drive_id: RemoteId) -> Self {
        debug!(drive = %drive_id, "Provider targets shared drive");
        self.corpus = Corpus::SharedDrive(drive_id);
        self
    }

    /// The corpus this provider lists and creates in
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    fn parent_id<'a>(&'a self, parent: &'a ParentRef) -> &'a str {
        match parent {
            ParentRef::DriveRoot => self.corpus.root_id(),
            ParentRef::Folder(id) => id.as_str(),
        }
    }
}

#[async_trait::async_trait]
impl ICloudProvider for DriveCloudProvider {
    async fn find_drive(&self, name: &str) -> Result<Option<RemoteId>> {
        files::find_drive(&self.client, name).await
    }

    async fn find_child(&self, parent: &ParentRef, name: &str) -> Result<Option<RemoteItem>> {
        let request = ListRequest {
            parent_id: self.parent_id(parent),
            name: Some(name),
            page_size: Some(1),
            page_token: None,
        };
        let page = files::list_children(&self.client, &self.corpus, &request).await?;
        Ok(page.items.into_iter().next())
    }

    async fn list_children(
        &self,
        parent: &ParentRef,
        name: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<ItemPage> {
        let request = ListRequest {
            parent_id: self.parent_id(parent),
            name,
            page_size: None,
            page_token,
        };
        files::list_children(&self.client, &self.corpus, &request).await
    }

    async fn create_folder(&self, parent: &ParentRef, name: &str) -> Result<RemoteItem> {
        files::create_folder(&self.client, self.parent_id(parent), name).await
    }

    async fn create_file(&self, parent: &ParentRef, name: &str, file: &LocalFile) -> Result<RemoteItem> {
        upload::create_file(&self.client, self.parent_id(parent), name, file).await
    }

    async fn update_file(&self, id: &RemoteId, file: &LocalFile) -> Result<RemoteItem> {
        upload::update_file(&self.client, id, file).await
    }

    async fn trash_items(&self, ids: &[RemoteId]) -> Result<Vec<TrashOutcome>> {
        batch::trash_items(&self.client, ids).await
    }
}
