//! Persistent table store for the catalog.
//!
//! The catalog repository only consumes the [`TableStore`] load/save
//! contract: two named tables (folders, assets) and one named thumbnail blob
//! per folder. Two adapters ship with the crate:
//!
//! - [`JsonTableStore`]: JSON documents in a directory (default)
//! - [`SqliteTableStore`]: a single SQLite database file
//!
//! # Storage Layout (JSON)
//!
//! ```text
//! ~/.photocat/
//! ├── folders.json              # Folders table
//! ├── assets.json               # Assets table
//! └── thumbnails/
//!     └── <folder_id>.bin       # file name -> hex-encoded preview bytes
//! ```

pub mod json;
pub mod sqlite;

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use crate::config::{ResolvedConfig, StorageBackend};
use crate::domain::{Asset, Folder};

pub use json::JsonTableStore;
pub use sqlite::SqliteTableStore;

/// Per-folder thumbnail blob: file name -> encoded preview bytes
pub type Thumbnails = HashMap<String, Vec<u8>>;

/// Errors raised by table store adapters
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt {table} data: {reason}")]
    Corrupt { table: String, reason: String },

    #[error("Unsupported {table} format version: {version}")]
    UnsupportedVersion { table: String, version: u32 },
}

/// Load/save contract for the catalog tables and thumbnail blobs
pub trait TableStore: Send {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Load the Folders table (empty if it was never saved)
    fn load_folders(&mut self) -> Result<Vec<Folder>, StorageError>;

    fn save_folders(&mut self, folders: &[Folder]) -> Result<(), StorageError>;

    /// Load the Assets table (empty if it was never saved)
    fn load_assets(&mut self) -> Result<Vec<Asset>, StorageError>;

    fn save_assets(&mut self, assets: &[Asset]) -> Result<(), StorageError>;

    /// Load a thumbnail blob, `None` if it does not exist yet
    fn load_blob(&mut self, name: &str) -> Result<Option<Thumbnails>, StorageError>;

    fn save_blob(&mut self, name: &str, thumbnails: &Thumbnails) -> Result<(), StorageError>;
}

/// Open the adapter selected by configuration
pub fn open_store(config: &ResolvedConfig) -> Result<Box<dyn TableStore>, StorageError> {
    open_store_at(&config.home, config.catalog.storage)
}

/// Open an adapter rooted at `home`
pub fn open_store_at(
    home: &Path,
    backend: StorageBackend,
) -> Result<Box<dyn TableStore>, StorageError> {
    match backend {
        StorageBackend::Json => Ok(Box::new(JsonTableStore::open(home)?)),
        StorageBackend::Sqlite => Ok(Box::new(SqliteTableStore::open(
            &home.join("catalog.db"),
        )?)),
    }
}
