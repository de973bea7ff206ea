//! drivepop Drive - Google Drive v3 API client
//!
//! Provides an async client for:
//! - Children listings with Drive's query language (paginated)
//! - Folder creation and file uploads (multipart create, media update)
//! - Batched trash requests with per-item outcomes
//! - Shared drive lookup by name
//!
//! ## Modules
//!
//! - [`client`] - Authenticated HTTP client and status classification
//! - [`query`] - Drive `q` expression building and escaping
//! - [`files`] - File listing, drive lookup and folder creation
//! - [`upload`] - File content uploads
//! - [`batch`] - `multipart/mixed` batch encoding and response parsing
//! - [`provider`] - [`ICloudProvider`](drivepop_core::ports::ICloudProvider) adapter

pub mod batch;
pub mod client;
pub mod files;
pub mod provider;
pub mod query;
pub mod upload;

use thiserror::Error;

/// Errors that can occur when communicating with the Google Drive API
#[derive(Debug, Error)]
pub enum DriveError {
    /// Authentication credentials are invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded (requests are never retried)
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// The request was rejected for another client-side reason (4xx)
    #[error("Request rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message extracted from the error body
        message: String,
    },

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
