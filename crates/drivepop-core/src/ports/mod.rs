//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! core. Ports are interfaces that the sync engine depends on, but whose
//! implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`ICloudProvider`] - Remote folder/file operations (Google Drive)
//! - [`ILocalFileSystem`] - Local directory listing and file hashing

pub mod cloud_provider;
pub mod local_filesystem;

pub use cloud_provider::{ICloudProvider, ItemPage, ParentRef, RemoteItem, TrashOutcome};
pub use local_filesystem::{EntryKind, ILocalFileSystem, LocalEntry, LocalFile};
