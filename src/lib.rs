//! photocat - Incremental image catalog and sync engine
//!
//! Keeps a persistent catalog of the images under a pictures directory:
//! content hashes, pixel dimensions, timestamps and small JPEG previews.
//!
//! # Architecture
//!
//! The catalog is owned by a [`CatalogRepository`] and mutated only by
//! explicit service calls:
//! - A scan diffs each directory against the catalog and applies at most
//!   `batch_size` changes per run
//! - Thumbnail blobs are stored per folder and loaded on first use
//! - Nothing is written until the repository is saved
//!
//! # Modules
//!
//! - `catalog`: Repository and services (scan, move, duplicates, import, sync)
//! - `domain`: Data structures (Folder, Asset, CatalogChange, DirectoryMapping)
//! - `storage`: Table/blob persistence (JSON files or SQLite)
//! - `platform`: Filesystem and image codec adapters
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Catalog new and deleted images
//! photocat scan
//!
//! # Find duplicates and keep one copy of each
//! photocat duplicates --delete-extra
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod platform;
pub mod storage;

// Re-export main types at crate root for convenience
pub use catalog::{
    CancellationToken, CatalogAssetsService, CatalogRepository, FindDuplicatedAssetsService,
    ImportNewAssetsService, MoveAssetsService, ScanSummary, SyncAssetsService,
};
pub use config::{CatalogSettings, ResolvedConfig, StorageBackend};
pub use domain::{Asset, CatalogChange, CatalogChangeReason, DirectoryMapping, Folder, FolderId};
pub use error::{CatalogError, CatalogResult};
pub use platform::{FileSystem, ImageCodec, ImageCrateCodec, LocalFileSystem};
pub use storage::{open_store, StorageError, TableStore};
