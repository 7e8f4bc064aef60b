//! Error types for share mirroring operations.

use std::io;
use thiserror::Error;

/// Errors that can occur while mirroring a share.
#[derive(Error, Debug)]
pub enum SyncError {
    /// I/O error during file operations.
    #[error(transparent)]
    IoError(#[from] io::Error),

    /// HTTP request error during listing or download.
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    /// Malformed API base or share URL.
    #[error(transparent)]
    UrlError(#[from] url::ParseError),

    /// General download failure.
    #[error("Download failed: {0}")]
    DownloadFailed(String),
}
