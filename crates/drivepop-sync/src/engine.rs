//! One-way mirror engine
//!
//! The [`SyncEngine`] walks the source tree, filters it, and for each
//! surviving file makes sure the same path exists under the base folder on
//! the drive with the same content. Every remote folder and file it finds
//! or creates is recorded in the run [`Index`], which later drives
//! reconciliation.
//!
//! ## Path resolution
//!
//! For a target path `base/a/b/file`, [`SyncEngine::update_path`] asks the
//! index for the deepest known ancestor and only talks to Drive about the
//! segments below it. Two files in the same folder therefore cost one
//! folder lookup, not two.
//!
//! Remote calls are issued one at a time and never retried.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, trace};

use drivepop_core::config::{expand_home, Config};
use drivepop_core::domain::{Index, ItemPath};
use drivepop_core::ports::{ICloudProvider, ILocalFileSystem, LocalFile, ParentRef, RemoteItem};

use crate::filesystem::LocalWalk;
use crate::filter::FileFilter;
use crate::SyncError;

// ============================================================================
// Results
// ============================================================================

/// What [`SyncEngine::update_path`] did with one file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// No remote file existed; it was uploaded
    Created,
    /// The remote file had different content; it was replaced in place
    Updated,
    /// The remote checksum matched; nothing was written
    Unchanged,
    /// The path was already handled earlier in this run
    AlreadyIndexed,
}

/// Counters for one [`SyncEngine::populate`] pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopulateSummary {
    /// Regular files found under the source
    pub scanned: usize,
    /// Files that passed the include/exclude filter
    pub matched: usize,
    /// Files filtered out
    pub skipped: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Remote folders created (lookups that found a folder are not counted)
    pub folders_created: usize,
}

impl PopulateSummary {
    fn record(&mut self, outcome: UpdateOutcome) {
        match outcome {
            UpdateOutcome::Created => self.created += 1,
            UpdateOutcome::Updated => self.updated += 1,
            UpdateOutcome::Unchanged => self.unchanged += 1,
            UpdateOutcome::AlreadyIndexed => {}
        }
    }
}

// ============================================================================
// SyncEngine
// ============================================================================

/// One-way mirror engine for a single run
///
/// ## Dependencies
///
/// - `cloud_provider`: Remote lookups, creations and content updates
/// - `local_filesystem`: Source tree listing and file hashing
pub struct SyncEngine {
    cloud_provider: Arc<dyn ICloudProvider>,
    local_filesystem: Arc<dyn ILocalFileSystem>,
    /// Local directory being mirrored
    source: PathBuf,
    /// Name of the managed top-level remote folder
    base_name: String,
    filter: FileFilter,
    /// Items found or created during this run
    index: Index,
    folders_created: usize,
}

impl SyncEngine {
    /// Creates an engine for the source, base folder and patterns in `config`
    ///
    /// # Errors
    /// Returns [`SyncError::InvalidPattern`] if a glob does not compile.
    pub fn new(
        cloud_provider: Arc<dyn ICloudProvider>,
        local_filesystem: Arc<dyn ILocalFileSystem>,
        config: &Config,
    ) -> Result<Self, SyncError> {
        Ok(Self {
            cloud_provider,
            local_filesystem,
            source: expand_home(&config.source),
            base_name: config.base_name.clone(),
            filter: FileFilter::from_config(config)?,
            index: Index::new(),
            folders_created: 0,
        })
    }

    /// The run index built so far
    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Starts a fresh walk of the source tree
    pub fn walk(&self) -> LocalWalk {
        LocalWalk::new(self.local_filesystem.clone(), self.source.clone())
    }

    // ========================================================================
    // populate
    // ========================================================================

    /// Mirrors every matching source file
    ///
    /// The base folder is resolved first, so it is indexed even when no
    /// file matches and reconciliation still covers it.
    ///
    /// # Errors
    /// Any local read or remote call failure aborts the pass.
    pub async fn populate(&mut self) -> Result<PopulateSummary> {
        let is_dir = tokio::fs::metadata(&self.source)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(SyncError::SourceNotFound(self.source.clone()).into());
        }
        info!(source = %self.source.display(), base = %self.base_name, "Populating");

        let folders_before = self.folders_created;
        self.ensure_base_folder().await?;

        let mut summary = PopulateSummary::default();
        let mut walk = self.walk();
        while let Some(relative) = walk.next().await? {
            summary.scanned += 1;
            if !self.filter.matches(&relative) {
                trace!(path = %relative.display(), "Filtered out");
                summary.skipped += 1;
                continue;
            }
            summary.matched += 1;

            let target = ItemPath::from_local(&self.base_name, &relative)
                .map_err(SyncError::from)?;
            let file = self
                .local_filesystem
                .hash_file(&self.source.join(&relative))
                .await?;
            let outcome = self.update_path(&target, &file).await?;
            summary.record(outcome);
        }

        summary.folders_created = self.folders_created - folders_before;
        info!(
            scanned = summary.scanned,
            matched = summary.matched,
            created = summary.created,
            updated = summary.updated,
            unchanged = summary.unchanged,
            folders_created = summary.folders_created,
            "Populate complete"
        );
        Ok(summary)
    }

    async fn ensure_base_folder(&mut self) -> Result<()> {
        if self.index.get_path(&[self.base_name.as_str()]).is_some() {
            return Ok(());
        }
        let base = self.base_name.clone();
        self.find_or_create_folder(&ParentRef::DriveRoot, &base)
            .await?;
        Ok(())
    }

    // ========================================================================
    // update_path
    // ========================================================================

    /// Makes `target` exist remotely with the content of `file`
    ///
    /// Missing folders on the way are looked up or created below the
    /// deepest ancestor the index already knows; then the file itself is
    /// created, updated or left alone depending on its checksum.
    ///
    /// # Errors
    /// Remote failures propagate; index inconsistencies are fatal.
    pub async fn update_path(&mut self, target: &ItemPath, file: &LocalFile) -> Result<UpdateOutcome> {
        let segments = target.segments();
        let known = self
            .index
            .get_path(segments)
            .map(|item| (item.path(), item.id().clone(), item.is_folder()));

        let (mut parent, start) = match known {
            None => (ParentRef::DriveRoot, 0),
            Some((path, _, true)) if &path == target => {
                return Err(SyncError::KindMismatch {
                    path: path.to_string(),
                    found: "folder",
                    expected: "file",
                }
                .into());
            }
            Some((path, id, false)) if &path == target => {
                debug!(path = %target, id = %id, "Already handled in this run");
                return Ok(UpdateOutcome::AlreadyIndexed);
            }
            Some((path, _, false)) => {
                return Err(SyncError::KindMismatch {
                    path: path.to_string(),
                    found: "file",
                    expected: "folder",
                }
                .into());
            }
            Some((path, id, true)) => (ParentRef::Folder(id), path.len()),
        };

        info!(path = %target, "Updating");

        let folder_segments = &segments[..segments.len() - 1];
        for name in &folder_segments[start..] {
            parent = self.find_or_create_folder(&parent, name).await?;
        }

        self.find_or_create_file(&parent, target, file).await
    }

    /// Resolves folder `name` under `parent`, creating it if absent
    async fn find_or_create_folder(&mut self, parent: &ParentRef, name: &str) -> Result<ParentRef> {
        let existing = self
            .cloud_provider
            .find_child(parent, name)
            .await
            .with_context(|| format!("Failed to look up folder '{name}' in {parent}"))?;

        let folder = match existing {
            Some(item) if item.is_folder => {
                trace!(name, id = %item.id, "Reusing remote folder");
                item
            }
            Some(item) => {
                return Err(SyncError::KindMismatch {
                    path: format!("{parent}/{}", item.name),
                    found: "file",
                    expected: "folder",
                }
                .into());
            }
            None => {
                debug!(name, parent = %parent, "Creating folder");
                let item = self
                    .cloud_provider
                    .create_folder(parent, name)
                    .await
                    .with_context(|| format!("Failed to create folder '{name}' in {parent}"))?;
                self.folders_created += 1;
                item
            }
        };

        self.index
            .add_folder(name, folder.id.clone(), parent.folder_id())
            .map_err(SyncError::from)?;
        Ok(ParentRef::Folder(folder.id))
    }

    /// Resolves the leaf file of `target` under `parent` and syncs its content
    async fn find_or_create_file(
        &mut self,
        parent: &ParentRef,
        target: &ItemPath,
        file: &LocalFile,
    ) -> Result<UpdateOutcome> {
        let name = target.file_name();

        let existing: Option<RemoteItem> = self
            .cloud_provider
            .find_child(parent, name)
            .await
            .with_context(|| format!("Failed to look up {target}"))?;

        let (id, outcome) = match existing {
            Some(item) if item.is_folder => {
                return Err(SyncError::KindMismatch {
                    path: target.to_string(),
                    found: "folder",
                    expected: "file",
                }
                .into());
            }
            Some(item) if item.checksum.as_deref() == Some(file.sha256.as_str()) => {
                debug!(path = %target, "Content unchanged");
                (item.id, UpdateOutcome::Unchanged)
            }
            Some(item) => {
                debug!(path = %target, id = %item.id, "Content changed, uploading");
                self.cloud_provider
                    .update_file(&item.id, file)
                    .await
                    .with_context(|| format!("Failed to update {target}"))?;
                (item.id, UpdateOutcome::Updated)
            }
            None => {
                debug!(path = %target, bytes = file.size, "Creating file");
                let item = self
                    .cloud_provider
                    .create_file(parent, name, file)
                    .await
                    .with_context(|| format!("Failed to create {target}"))?;
                (item.id, UpdateOutcome::Created)
            }
        };

        self.index
            .add_file(name, id, parent.folder_id())
            .map_err(SyncError::from)?;
        Ok(outcome)
    }
}
