//! Error types for the gallery core

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("fetching page {page} failed: {reason}")]
    FetchFailed { page: u32, reason: String },

    #[error("page {page} did not match the expected listing shape: {reason}")]
    SchemaMismatch { page: u32, reason: String },

    #[error("page {page} timed out after {after:?}")]
    Timeout { page: u32, after: Duration },

    #[error("a load is already in flight")]
    Busy,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GalleryError {
    /// Whether this error came from talking to the upstream source.
    ///
    /// Schema mismatches and timeouts are handled exactly like transport
    /// failures: the buffer is left untouched and nothing is retried.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. } | Self::SchemaMismatch { .. } | Self::Timeout { .. }
        )
    }
}

pub type GalleryResult<T> = Result<T, GalleryError>;
