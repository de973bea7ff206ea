//! Local filesystem port (driven/secondary port)
//!
//! The sync engine reads the source tree only through this trait, one
//! directory listing at a time, so the walk stays lazy and tests can
//! substitute a fake tree. File content is never held in memory as a
//! whole: it is hashed as a stream, and uploads reopen the file.

use std::path::{Path, PathBuf};

/// What a directory entry is, without following symbolic links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    /// Sockets, FIFOs, devices
    Other,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEntry {
    /// Full path of the entry (the listed directory joined with its name)
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// A regular source file, sized and hashed
///
/// Adapters that upload the content reopen `path` and stream it; `size`
/// and `sha256` describe the content at hashing time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    /// Length in bytes
    pub size: u64,
    /// Lowercase hex SHA-256 of the content
    pub sha256: String,
}

/// Port trait for reading the local source tree
#[async_trait::async_trait]
pub trait ILocalFileSystem: Send + Sync {
    /// Lists the direct entries of `dir`
    ///
    /// Entry kinds must describe the entry itself, never a symlink target.
    async fn read_dir(&self, dir: &Path) -> anyhow::Result<Vec<LocalEntry>>;

    /// Streams a regular file through SHA-256
    async fn hash_file(&self, path: &Path) -> anyhow::Result<LocalFile>;
}
