//! Domain types for the photocat catalog.
//!
//! This module contains the core data structures:
//! - Folder: a catalogued directory
//! - Asset: a catalogued image file
//! - CatalogChange: progress events emitted during scans
//! - DirectoryMapping: import/sync definitions

pub mod asset;
pub mod events;
pub mod folder;
pub mod mapping;
pub mod path;

// Re-export commonly used types
pub use asset::{Asset, AssetKey};
pub use events::{CatalogChange, CatalogChangeReason};
pub use folder::{Folder, FolderId};
pub use mapping::{prepare_definitions, DirectoryMapping};
pub use path::{is_nested_under, is_valid_directory_path, join_path, normalize_path};
