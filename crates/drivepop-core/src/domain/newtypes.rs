//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for remote identifiers and
//! remote paths. Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::path::{Component, Path};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// Google Drive identifiers
// ============================================================================

/// Google Drive item ID (opaque identifier)
///
/// Format: URL-safe alphanumeric string, typically like
/// "1a2B3c4D5e6F7g8H9i0J_kLmNoPqRsTuV" or "0ABcdEfGhIjKlUk9PVA" for shared drives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteId(String);

impl RemoteId {
    /// Create a new RemoteId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains characters that would
    /// break a Drive query string
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidRemoteId(
                "Remote ID cannot be empty".to_string(),
            ));
        }

        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::InvalidRemoteId(format!(
                "Remote ID contains invalid characters: {id}"
            )));
        }

        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemoteId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RemoteId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemoteId> for String {
    fn from(id: RemoteId) -> Self {
        id.0
    }
}

// ============================================================================
// Remote paths
// ============================================================================

/// A path in the managed remote tree, as an ordered list of name segments
///
/// The first segment is the base folder name; the last is the item's own
/// name. Drive has no path addressing, so this is purely the structural
/// path that the run index derives from parent links.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemPath(Vec<String>);

impl ItemPath {
    /// Create a path from its segments
    ///
    /// # Errors
    /// Returns error if there are no segments or any segment is invalid
    pub fn new<I, S>(segments: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(DomainError::InvalidPath(
                "path must have at least one segment".to_string(),
            ));
        }
        for segment in &segments {
            validate_segment(segment)?;
        }
        Ok(Self(segments))
    }

    /// Build the remote path `base / relative` for a source-relative local path
    ///
    /// `.` components are dropped; `..`, absolute roots and non-UTF-8 names
    /// are rejected.
    ///
    /// # Errors
    /// Returns error if the local path cannot be expressed as remote segments
    pub fn from_local(base: &str, relative: &Path) -> Result<Self, DomainError> {
        let mut segments = vec![base.to_string()];
        for component in relative.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| {
                        DomainError::InvalidPath(format!(
                            "non UTF-8 component in {}",
                            relative.display()
                        ))
                    })?;
                    segments.push(part.to_string());
                }
                Component::CurDir => continue,
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(DomainError::InvalidPath(format!(
                        "path escapes the source root: {}",
                        relative.display()
                    )));
                }
            }
        }
        Self::new(segments)
    }

    /// Wrap segments that were already validated by the caller
    pub(crate) fn from_validated(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// The path segments, root first
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: a path has at least one segment
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The last segment
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// The path without its last segment, or `None` for a single segment
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() < 2 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Append a segment
    ///
    /// # Errors
    /// Returns error if the segment is invalid
    pub fn join(&self, segment: &str) -> Result<Self, DomainError> {
        validate_segment(segment)?;
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Ok(Self(segments))
    }
}

impl Display for ItemPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

pub(crate) fn validate_segment(segment: &str) -> Result<(), DomainError> {
    if segment.is_empty() || segment == "." || segment == ".." || segment.contains('/') {
        return Err(DomainError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}
