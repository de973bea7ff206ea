//! drivepop Core - Domain logic for mirroring a local tree into Google Drive
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `Index`, `ItemRef`, `ItemPath`, `RemoteId`
//! - **Port definitions** - Traits for adapters: `ICloudProvider`, `ILocalFileSystem`
//! - **Configuration** - YAML configuration with validation
//!
//! # Architecture
//!
//! The domain module holds the in-memory run index and is free of I/O.
//! Ports define the trait interfaces that the Drive adapter and the
//! filesystem adapter implement; the sync crate orchestrates them.

pub mod config;
pub mod domain;
pub mod ports;
