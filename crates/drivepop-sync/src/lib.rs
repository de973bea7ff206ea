//! drivepop Sync - One-way mirror engine
//!
//! Provides:
//! - Lazy local tree walking and SHA-256 content checksums
//! - Include/exclude glob filtering
//! - Path resolution against the run index with minimal folder creation
//! - Reconciliation of unmanaged remote items and the deletion policy
//!
//! ## Modules
//!
//! - [`engine`] - Sync engine populating the remote tree and the run index
//! - [`filesystem`] - Local filesystem adapter, lazy walker, checksums
//! - [`filter`] - Include/exclude matching on source-relative paths
//! - [`reconcile`] - Enumeration of remote items the run does not manage
//! - [`purge`] - Deletion policy applied to unmanaged items

pub mod engine;
pub mod filesystem;
pub mod filter;
pub mod purge;
pub mod reconcile;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during synchronization operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error occurred during file operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The configured source directory does not exist
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),

    /// An include or exclude glob could not be compiled
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Parser error from the glob crate
        #[source]
        source: glob::PatternError,
    },

    /// A remote item is not of the kind its local counterpart needs
    #[error("Remote item at {path} is a {found}, expected a {expected}")]
    KindMismatch {
        /// Remote path of the item
        path: String,
        /// Kind found remotely
        found: &'static str,
        /// Kind required by the local tree
        expected: &'static str,
    },

    /// A domain-level error propagated from drivepop-core
    #[error("Domain error: {0}")]
    DomainError(#[from] drivepop_core::domain::DomainError),

    /// The run index rejected an insertion (internal inconsistency)
    #[error("Index error: {0}")]
    IndexError(#[from] drivepop_core::domain::IndexError),
}
