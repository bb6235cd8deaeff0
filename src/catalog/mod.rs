//! Catalog services.
//!
//! - `repository`: in-memory catalog index and persistence
//! - `scan`: incremental, batch-bounded catalog scan
//! - `moves`: move/copy assets between folders
//! - `duplicates`: byte-identical duplicate groups
//! - `import` / `sync`: bring images in from source directories

pub mod cancel;
pub mod comparer;
pub mod duplicates;
pub mod factory;
pub mod hash;
pub mod import;
pub mod moves;
pub mod repository;
pub mod scan;
pub mod sync;

pub use cancel::CancellationToken;
pub use comparer::{DirectoryComparer, SUPPORTED_EXTENSIONS};
pub use duplicates::FindDuplicatedAssetsService;
pub use factory::{thumbnail_size, AssetFactory};
pub use hash::HashCalculator;
pub use import::{ImportNewAssetsResult, ImportNewAssetsService};
pub use moves::MoveAssetsService;
pub use repository::CatalogRepository;
pub use scan::{CatalogAssetsService, ScanSummary};
pub use sync::{SyncAssetsResult, SyncAssetsService};
