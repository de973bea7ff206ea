//! Domain entities and business logic
//!
//! This module contains the core domain types for drivepop:
//! - Newtypes for remote identifiers and remote paths
//! - The run-scoped [`Index`] of managed remote items
//! - Domain-specific error types

pub mod errors;
pub mod index;
pub mod newtypes;

pub use errors::{DomainError, IndexError};
pub use index::{Index, ItemKind, ItemRef};
pub use newtypes::{ItemPath, RemoteId};
