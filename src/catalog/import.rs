//! Importing new images from source directories into the picture tree.
//!
//! A source file counts as already imported when its name appears anywhere
//! under the destination root, so files the user reorganized into
//! sub-folders are not imported again.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::comparer::DirectoryComparer;
use crate::domain::{prepare_definitions, DirectoryMapping};
use crate::error::{CatalogError, CatalogResult};
use crate::platform::FileSystem;

/// Outcome of one import definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportNewAssetsResult {
    pub source_directory: String,
    pub destination_directory: String,
    pub imported_images: usize,
    pub message: String,
}

pub struct ImportNewAssetsService {
    fs: Arc<dyn FileSystem>,
    comparer: DirectoryComparer,
}

impl ImportNewAssetsService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            comparer: DirectoryComparer::new(),
        }
    }

    /// Run every valid definition; invalid ones are skipped.
    ///
    /// Failures are recorded in the per-definition message and do not stop
    /// the remaining definitions.
    #[instrument(skip_all, fields(definitions = definitions.len()))]
    pub fn import(&self, definitions: &[DirectoryMapping]) -> Vec<ImportNewAssetsResult> {
        prepare_definitions(definitions)
            .into_iter()
            .map(|definition| self.import_definition(&definition))
            .collect()
    }

    fn import_definition(&self, definition: &DirectoryMapping) -> ImportNewAssetsResult {
        let mut result = ImportNewAssetsResult {
            source_directory: definition.source_directory.clone(),
            destination_directory: definition.destination_directory.clone(),
            imported_images: 0,
            message: String::new(),
        };

        let source = Path::new(&definition.source_directory);
        let destination = Path::new(&definition.destination_directory);

        if !self.fs.directory_exists(source) {
            result.message = format!("Source directory '{}' not found.", source.display());
            return result;
        }

        let outcome = self.destination_subtree(destination).and_then(|subtree| {
            self.import_directory(
                source,
                destination,
                definition.include_sub_folders,
                &subtree,
                &mut result.imported_images,
            )
        });

        result.message = match outcome {
            Err(e) => {
                warn!(source = %source.display(), error = %e, "Import failed");
                format!("Import from '{}' failed: {}", source.display(), e)
            }
            Ok(()) => match result.imported_images {
                0 => format!(
                    "No images imported from '{}' to '{}'.",
                    source.display(),
                    destination.display()
                ),
                1 => format!(
                    "1 image imported from '{}' to '{}'.",
                    source.display(),
                    destination.display()
                ),
                n => format!(
                    "{} images imported from '{}' to '{}'.",
                    n,
                    source.display(),
                    destination.display()
                ),
            },
        };

        info!(
            source = %result.source_directory,
            destination = %result.destination_directory,
            imported = result.imported_images,
            "Import finished"
        );
        result
    }

    /// Every file name under the destination root, recursively
    fn destination_subtree(&self, destination: &Path) -> CatalogResult<HashSet<String>> {
        let mut names = HashSet::new();
        if !self.fs.directory_exists(destination) {
            return Ok(names);
        }

        let mut dirs = vec![destination.to_path_buf()];
        dirs.extend(
            self.fs
                .list_sub_directories(destination, true)
                .map_err(|e| CatalogError::io(destination, e))?,
        );

        for dir in dirs {
            names.extend(
                self.fs
                    .list_file_names(&dir)
                    .map_err(|e| CatalogError::io(&dir, e))?,
            );
        }

        Ok(names)
    }

    fn import_directory(
        &self,
        source: &Path,
        destination: &Path,
        include_sub_folders: bool,
        destination_subtree: &HashSet<String>,
        imported: &mut usize,
    ) -> CatalogResult<()> {
        let source_names = self
            .fs
            .list_file_names(source)
            .map_err(|e| CatalogError::io(source, e))?;

        let to_import = self
            .comparer
            .files_to_import(&source_names, destination_subtree);

        if !to_import.is_empty() {
            self.fs
                .create_directory(destination)
                .map_err(|e| CatalogError::io(destination, e))?;
        }

        for file_name in to_import {
            let target = destination.join(&file_name);
            self.fs
                .copy_file(&source.join(&file_name), &target)
                .map_err(|e| CatalogError::io(&target, e))?;
            *imported += 1;
        }

        if include_sub_folders {
            let sub_directories: Vec<PathBuf> = self
                .fs
                .list_sub_directories(source, false)
                .map_err(|e| CatalogError::io(source, e))?;

            for sub_directory in sub_directories {
                let Some(name) = sub_directory.file_name() else {
                    continue;
                };
                self.import_directory(
                    &sub_directory,
                    &destination.join(name),
                    include_sub_folders,
                    destination_subtree,
                    imported,
                )?;
            }
        }

        Ok(())
    }
}
