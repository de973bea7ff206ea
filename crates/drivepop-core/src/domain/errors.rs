//! Domain error types
//!
//! Validation failures for domain newtypes and consistency failures
//! raised by the run index.

use thiserror::Error;

use super::newtypes::RemoteId;

/// Errors that can occur while validating domain values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid remote ID format
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// Invalid path segment (empty, contains a separator, or a dot segment)
    #[error("Invalid path segment: {0}")]
    InvalidSegment(String),

    /// A local path could not be expressed as remote segments
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Errors raised by [`Index`](super::index::Index) operations
///
/// Every variant except [`IndexError::NotFound`] signals an internal
/// inconsistency: the caller registered items in an order the tree
/// cannot represent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// The parent identifier passed to `add_folder`/`add_file` is not indexed
    #[error("parent {0} is not in the index")]
    ParentNotFound(RemoteId),

    /// The parent identifier refers to a file, which cannot hold children
    #[error("parent {0} is a file and cannot hold children")]
    ParentNotFolder(RemoteId),

    /// The identifier is already registered for another item
    #[error("remote ID {0} is already indexed")]
    DuplicateId(RemoteId),

    /// The parent already holds an item with this name
    #[error("an item is already indexed at {0}")]
    NameTaken(String),

    /// The item name is not a valid path segment
    #[error(transparent)]
    InvalidName(#[from] DomainError),

    /// Exact identifier lookup failed
    #[error("remote ID {0} not found in index")]
    NotFound(RemoteId),
}
