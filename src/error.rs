//! Error taxonomy for catalog operations.
//!
//! Argument errors abort an operation before any mutation. I/O-class errors
//! raised while scanning a directory are reported through the progress
//! callback instead of being returned. Cancellation is always propagated.

use std::path::PathBuf;

use thiserror::Error;

use crate::platform::CodecError;
use crate::storage::StorageError;

/// Errors raised by the catalog services and repository
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl CatalogError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Shorthand for an argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
