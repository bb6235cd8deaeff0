//! Collaborator contracts for the filesystem and the image codec.
//!
//! The catalog services only depend on these traits. The default adapters
//! are [`LocalFileSystem`] and [`ImageCrateCodec`]; tests may substitute
//! their own implementations.

pub mod codec;
pub mod fs;

use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

pub use codec::{CodecError, ImageCrateCodec};
pub use fs::LocalFileSystem;

/// Size and timestamps of a file on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub size: u64,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Filesystem capabilities used by the catalog
pub trait FileSystem: Send + Sync {
    /// Immediate file names in `dir`, sorted
    fn list_file_names(&self, dir: &Path) -> io::Result<Vec<String>>;

    /// Sub-directories of `dir`, sorted, optionally recursive
    fn list_sub_directories(&self, dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>>;

    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Copy a file, creating the destination directory if needed
    fn copy_file(&self, source: &Path, destination: &Path) -> io::Result<()>;

    fn delete_file(&self, path: &Path) -> io::Result<()>;

    fn file_exists(&self, path: &Path) -> bool;

    fn directory_exists(&self, path: &Path) -> bool;

    fn create_directory(&self, path: &Path) -> io::Result<()>;

    fn file_info(&self, path: &Path) -> io::Result<FileInfo>;
}

/// Image decode/resize/encode capabilities used by the catalog
pub trait ImageCodec: Send + Sync {
    /// Pixel dimensions of an encoded image
    fn dimensions(&self, bytes: &[u8]) -> Result<(u32, u32), CodecError>;

    /// Decode, resize to exactly `width` x `height` and re-encode
    fn thumbnail(&self, bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>, CodecError>;
}
