//! Local filesystem adapter (secondary/driven adapter)
//!
//! Implements [`ILocalFileSystem`] using `tokio::fs`, and provides the
//! [`LocalWalk`] producer that enumerates a source tree through that port.
//!
//! ## Design Decisions
//!
//! - **No symlink following**: entry kinds come from `DirEntry::file_type`,
//!   which reports the link itself. The walker skips links to files and to
//!   directories alike.
//! - **Lazy walk**: directories are listed one at a time as the consumer
//!   pulls paths; a walk is restarted by creating a new [`LocalWalk`].
//! - **SHA-256**: Drive reports `sha256Checksum` for binary content, so
//!   local and remote content can be compared without a download. Files
//!   are hashed in [`HASH_BUFFER_SIZE`] reads and never loaded whole.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument, trace};

use drivepop_core::ports::{EntryKind, ILocalFileSystem, LocalEntry, LocalFile};

/// Read size used while hashing: 64 KiB
pub const HASH_BUFFER_SIZE: usize = 64 * 1024;

// ============================================================================
// LocalFileSystemAdapter
// ============================================================================

/// Adapter that bridges the [`ILocalFileSystem`] port to the real filesystem.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystemAdapter;

impl LocalFileSystemAdapter {
    /// Create a new `LocalFileSystemAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ILocalFileSystem for LocalFileSystemAdapter {
    #[instrument(skip(self), fields(dir = %dir.display()))]
    async fn read_dir(&self, dir: &Path) -> anyhow::Result<Vec<LocalEntry>> {
        let mut entries = Vec::new();
        let mut reader = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("Failed to list {}", dir.display()))?;

        while let Some(entry) = reader.next_entry().await? {
            let file_type = entry.file_type().await?;
            let kind = if file_type.is_symlink() {
                EntryKind::Symlink
            } else if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };
            entries.push(LocalEntry {
                path: entry.path(),
                kind,
            });
        }

        trace!(count = entries.len(), "directory listed");
        Ok(entries)
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn hash_file(&self, path: &Path) -> anyhow::Result<LocalFile> {
        let mut file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
        let mut size: u64 = 0;
        loop {
            let read = file
                .read(&mut buffer)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
            size += read as u64;
        }

        // Lowercase hex, the format of Drive's sha256Checksum
        let sha256 = format!("{:x}", hasher.finalize());
        debug!(bytes = size, sha256 = %sha256, "hash computed");
        Ok(LocalFile {
            path: path.to_path_buf(),
            size,
            sha256,
        })
    }
}

// ============================================================================
// LocalWalk
// ============================================================================

/// Pull-based depth-first enumeration of the regular files under a root
///
/// Yields paths relative to the root. Entries of a directory are visited
/// in name order; symbolic links and special files are skipped.
pub struct LocalWalk {
    fs: Arc<dyn ILocalFileSystem>,
    root: PathBuf,
    /// Directories still to list, next one last
    pending: Vec<PathBuf>,
    /// Files of the last listed directory not yet handed out
    ready: VecDeque<PathBuf>,
}

impl LocalWalk {
    /// Starts a walk of `root`; nothing is read until [`LocalWalk::next`]
    pub fn new(fs: Arc<dyn ILocalFileSystem>, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            fs,
            pending: vec![root.clone()],
            root,
            ready: VecDeque::new(),
        }
    }

    /// The next file path relative to the root, or `None` when done
    ///
    /// # Errors
    /// Returns an error if a directory cannot be listed.
    pub async fn next(&mut self) -> anyhow::Result<Option<PathBuf>> {
        loop {
            if let Some(path) = self.ready.pop_front() {
                return Ok(Some(path));
            }
            let Some(dir) = self.pending.pop() else {
                return Ok(None);
            };

            let mut entries = self.fs.read_dir(&dir).await?;
            entries.sort_by(|a, b| a.path.cmp(&b.path));

            let mut subdirs = Vec::new();
            for entry in entries {
                match entry.kind {
                    EntryKind::File => {
                        let relative = entry
                            .path
                            .strip_prefix(&self.root)
                            .with_context(|| {
                                format!("{} is outside the walk root", entry.path.display())
                            })?
                            .to_path_buf();
                        self.ready.push_back(relative);
                    }
                    EntryKind::Directory => subdirs.push(entry.path),
                    EntryKind::Symlink => {
                        debug!(path = %entry.path.display(), "Skipping symbolic link");
                    }
                    EntryKind::Other => {
                        trace!(path = %entry.path.display(), "Skipping special file");
                    }
                }
            }
            self.pending.extend(subdirs.into_iter().rev());
        }
    }

    /// Drains the walk into a vector
    pub async fn collect_all(mut self) -> anyhow::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        while let Some(path) = self.next().await? {
            paths.push(path);
        }
        Ok(paths)
    }
}
