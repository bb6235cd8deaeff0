//! Mirroring source directories into destinations.
//!
//! Unlike import, sync compares each directory against its exact mirrored
//! counterpart and can remove destination files the source no longer has.
//! The catalog itself is not touched; the next scan picks the changes up.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::comparer::DirectoryComparer;
use crate::domain::{prepare_definitions, DirectoryMapping};
use crate::error::{CatalogError, CatalogResult};
use crate::platform::FileSystem;

/// Outcome of one sync definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncAssetsResult {
    pub source_directory: String,
    pub destination_directory: String,
    pub synced_images: usize,
    pub deleted_images: usize,
    pub message: String,
}

pub struct SyncAssetsService {
    fs: Arc<dyn FileSystem>,
    comparer: DirectoryComparer,
}

impl SyncAssetsService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            comparer: DirectoryComparer::new(),
        }
    }

    /// Run every valid definition; invalid ones are skipped
    #[instrument(skip_all, fields(definitions = definitions.len()))]
    pub fn execute(&self, definitions: &[DirectoryMapping]) -> Vec<SyncAssetsResult> {
        prepare_definitions(definitions)
            .into_iter()
            .map(|definition| self.sync_definition(&definition))
            .collect()
    }

    fn sync_definition(&self, definition: &DirectoryMapping) -> SyncAssetsResult {
        let mut result = SyncAssetsResult {
            source_directory: definition.source_directory.clone(),
            destination_directory: definition.destination_directory.clone(),
            ..Default::default()
        };

        let source = Path::new(&definition.source_directory);
        let destination = Path::new(&definition.destination_directory);

        if !self.fs.directory_exists(source) {
            result.message = format!("Source directory '{}' not found.", source.display());
            return result;
        }

        result.message = match self.sync_directory(source, destination, definition, &mut result) {
            Ok(()) => format!(
                "{} images synced, {} deleted, from '{}' to '{}'.",
                result.synced_images,
                result.deleted_images,
                source.display(),
                destination.display()
            ),
            Err(e) => {
                warn!(source = %source.display(), error = %e, "Sync failed");
                format!("Sync from '{}' failed: {}", source.display(), e)
            }
        };

        info!(
            source = %result.source_directory,
            destination = %result.destination_directory,
            synced = result.synced_images,
            deleted = result.deleted_images,
            "Sync finished"
        );
        result
    }

    fn sync_directory(
        &self,
        source: &Path,
        destination: &Path,
        definition: &DirectoryMapping,
        result: &mut SyncAssetsResult,
    ) -> CatalogResult<()> {
        self.fs
            .create_directory(destination)
            .map_err(|e| CatalogError::io(destination, e))?;

        let source_names = self
            .fs
            .list_file_names(source)
            .map_err(|e| CatalogError::io(source, e))?;
        let destination_names = self
            .fs
            .list_file_names(destination)
            .map_err(|e| CatalogError::io(destination, e))?;

        for file_name in self
            .comparer
            .files_missing_from(&source_names, &destination_names)
        {
            let target = destination.join(&file_name);
            self.fs
                .copy_file(&source.join(&file_name), &target)
                .map_err(|e| CatalogError::io(&target, e))?;
            result.synced_images += 1;
        }

        if definition.delete_assets_not_in_source {
            for file_name in self
                .comparer
                .files_missing_from(&destination_names, &source_names)
            {
                let target = destination.join(&file_name);
                self.fs
                    .delete_file(&target)
                    .map_err(|e| CatalogError::io(&target, e))?;
                result.deleted_images += 1;
            }
        }

        if definition.include_sub_folders {
            let sub_directories: Vec<PathBuf> = self
                .fs
                .list_sub_directories(source, false)
                .map_err(|e| CatalogError::io(source, e))?;

            for sub_directory in sub_directories {
                let Some(name) = sub_directory.file_name() else {
                    continue;
                };
                self.sync_directory(&sub_directory, &destination.join(name), definition, result)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::LocalFileSystem;
    use std::fs;
    use tempfile::TempDir;

    fn path_str(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }

    #[test]
    fn test_sync_copies_and_deletes() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        let destination = temp.path().join("destination");
        fs::create_dir_all(source.join("nested")).unwrap();
        fs::create_dir_all(&destination).unwrap();

        fs::write(source.join("a.jpg"), b"a").unwrap();
        fs::write(source.join("nested/b.jpg"), b"b").unwrap();
        fs::write(destination.join("stale.jpg"), b"s").unwrap();
        fs::write(destination.join("keep.txt"), b"t").unwrap();

        let definition = DirectoryMapping::new(path_str(&source), path_str(&destination))
            .with_sub_folders()
            .deleting_assets_not_in_source();
        let results = SyncAssetsService::new(Arc::new(LocalFileSystem)).execute(&[definition]);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].synced_images, 2);
        assert_eq!(results[0].deleted_images, 1);
        assert!(destination.join("a.jpg").exists());
        assert!(destination.join("nested/b.jpg").exists());
        assert!(!destination.join("stale.jpg").exists());
        // Only image files are managed
        assert!(destination.join("keep.txt").exists());
    }

    #[test]
    fn test_sync_keeps_extra_files_by_default() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        let destination = temp.path().join("destination");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&destination).unwrap();
        fs::write(destination.join("extra.jpg"), b"e").unwrap();

        let definition = DirectoryMapping::new(path_str(&source), path_str(&destination));
        let results = SyncAssetsService::new(Arc::new(LocalFileSystem)).execute(&[definition]);

        assert_eq!(results[0].deleted_images, 0);
        assert!(destination.join("extra.jpg").exists());
    }
}
