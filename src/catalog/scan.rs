//! Incremental catalog scan.
//!
//! Walks every root depth-first, pre-order: a directory's own files are
//! processed before its sub-directories are visited. For each directory the
//! on-disk listing is diffed against the catalog, new files are hashed and
//! thumbnailed, and entries whose file disappeared are dropped. At most
//! `batch_size` creations and deletions happen per run; the rest waits for
//! the next run.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::cancel::CancellationToken;
use super::comparer::DirectoryComparer;
use super::factory::AssetFactory;
use super::repository::CatalogRepository;
use crate::config::ResolvedConfig;
use crate::domain::{is_nested_under, join_path, normalize_path, Asset, CatalogChange, Folder};
use crate::error::{CatalogError, CatalogResult};
use crate::platform::{FileSystem, ImageCodec};

/// Counters for one scan run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub created: usize,
    pub deleted: usize,
    /// Directories or files that reported a failure event
    pub failures: usize,
    /// The batch budget ran out before the scan finished
    pub batch_exhausted: bool,
}

struct ScanRun {
    summary: ScanSummary,
    budget: usize,
}

impl ScanRun {
    fn has_budget(&self) -> bool {
        self.budget > 0
    }

    fn consume(&mut self) {
        self.budget = self.budget.saturating_sub(1);
        if self.budget == 0 {
            self.summary.batch_exhausted = true;
        }
    }
}

/// Keeps the catalog in sync with the filesystem
pub struct CatalogAssetsService {
    pictures_directory: String,
    batch_size: usize,
    fs: Arc<dyn FileSystem>,
    factory: AssetFactory,
    comparer: DirectoryComparer,
}

impl CatalogAssetsService {
    pub fn new(
        config: &ResolvedConfig,
        fs: Arc<dyn FileSystem>,
        codec: Arc<dyn ImageCodec>,
    ) -> Self {
        Self {
            pictures_directory: normalize_path(&config.pictures_directory.to_string_lossy()),
            batch_size: config.catalog.batch_size,
            factory: AssetFactory::new(fs.clone(), codec, &config.catalog),
            fs,
            comparer: DirectoryComparer::new(),
        }
    }

    /// Scan every root and report each change through `callback`.
    ///
    /// Per-directory failures become failure events and the scan moves on.
    /// Cancellation saves the work done so far and is returned as
    /// [`CatalogError::Cancelled`].
    #[instrument(skip_all, fields(root = %self.pictures_directory))]
    pub fn catalog_assets(
        &self,
        repo: &mut CatalogRepository,
        callback: &mut dyn FnMut(CatalogChange),
        cancel: &CancellationToken,
    ) -> CatalogResult<ScanSummary> {
        let mut run = ScanRun {
            summary: ScanSummary::default(),
            budget: self.batch_size,
        };

        for root in self.folders_to_catalog(repo) {
            if let Err(e) = self.catalog_directory(repo, &root, callback, cancel, &mut run) {
                warn!(error = %e, "Scan interrupted, saving completed work");
                repo.save_catalog(None)?;
                return Err(e);
            }
        }

        if repo.has_changes() {
            repo.save_catalog(None)?;
        }

        info!(
            created = run.summary.created,
            deleted = run.summary.deleted,
            failures = run.summary.failures,
            batch_exhausted = run.summary.batch_exhausted,
            "Scan finished"
        );
        callback(CatalogChange::completed());

        Ok(run.summary)
    }

    /// The primary picture root plus every catalogued folder living outside it.
    ///
    /// A candidate nested under any other candidate is dropped, whatever the
    /// catalog order, so no directory is visited twice.
    pub fn folders_to_catalog(&self, repo: &CatalogRepository) -> Vec<String> {
        let mut candidates = vec![self.pictures_directory.clone()];
        for folder in repo.get_folders() {
            if !candidates.contains(&folder.path) {
                candidates.push(folder.path.clone());
            }
        }

        candidates
            .iter()
            .filter(|candidate| {
                !candidates
                    .iter()
                    .any(|other| other != *candidate && is_nested_under(candidate, other))
            })
            .cloned()
            .collect()
    }

    /// Only cancellation escapes; other errors are reported and swallowed
    fn catalog_directory(
        &self,
        repo: &mut CatalogRepository,
        directory: &str,
        callback: &mut dyn FnMut(CatalogChange),
        cancel: &CancellationToken,
        run: &mut ScanRun,
    ) -> CatalogResult<()> {
        cancel.check()?;
        if !run.has_budget() {
            return Ok(());
        }

        let files_ok = match self.catalog_folder_files(repo, directory, callback, run) {
            Ok(()) => true,
            Err(e) if e.is_cancellation() => return Err(e),
            Err(e) => {
                self.report_failure(callback, run, directory, &e);
                false
            }
        };

        let sub_directories = match self.fs.list_sub_directories(Path::new(directory), false) {
            Ok(dirs) => dirs,
            Err(e) => {
                if files_ok {
                    self.report_failure(callback, run, directory, &CatalogError::io(directory, e));
                }
                return Ok(());
            }
        };

        for sub_directory in sub_directories {
            self.catalog_directory(
                repo,
                &sub_directory.to_string_lossy(),
                callback,
                cancel,
                run,
            )?;
        }

        Ok(())
    }

    fn catalog_folder_files(
        &self,
        repo: &mut CatalogRepository,
        directory: &str,
        callback: &mut dyn FnMut(CatalogChange),
        run: &mut ScanRun,
    ) -> CatalogResult<()> {
        let folder = repo.add_folder(directory);
        let on_disk = self
            .fs
            .list_file_names(Path::new(&folder.path))
            .map_err(|e| CatalogError::io(&folder.path, e))?;

        let (_, is_new_file) = repo.get_thumbnails(&folder.thumbnails_key())?;
        let catalogued = repo.get_catalogued_assets(&folder.path);

        if is_new_file && !catalogued.is_empty() {
            self.rehydrate_thumbnails(repo, &folder, &catalogued)?;
        }

        let new_file_names = self.comparer.new_file_names(&on_disk, &catalogued);
        let deleted_file_names = self.comparer.deleted_file_names(&on_disk, &catalogued);
        debug!(
            folder = %folder.path,
            new = new_file_names.len(),
            deleted = deleted_file_names.len(),
            "Directory diffed"
        );

        for file_name in &new_file_names {
            if !run.has_budget() {
                return Ok(());
            }

            let full_path = join_path(&folder.path, file_name);
            let (asset, thumbnail) = match self.factory.create_asset(&folder, file_name) {
                Ok(created) => created,
                Err(e) => {
                    // One unreadable image must not block the rest of the folder
                    self.report_failure(callback, run, &full_path, &e);
                    continue;
                }
            };

            repo.add_asset(asset.clone(), Some(thumbnail))?;
            run.consume();
            run.summary.created += 1;

            let snapshot = repo.get_catalogued_assets(&folder.path);
            callback(CatalogChange::created(
                asset,
                snapshot,
                format!("Image {} added to catalog", full_path),
            ));
        }

        for file_name in &deleted_file_names {
            if !run.has_budget() {
                return Ok(());
            }

            if let Some(removed) = repo.delete_asset(&folder.path, file_name, false)? {
                run.consume();
                run.summary.deleted += 1;
                callback(CatalogChange::deleted(
                    removed,
                    format!(
                        "Image {} deleted from catalog",
                        join_path(&folder.path, file_name)
                    ),
                ));
            }
        }

        Ok(())
    }

    /// Rebuild previews after the folder's thumbnail blob was (re)initialized
    fn rehydrate_thumbnails(
        &self,
        repo: &mut CatalogRepository,
        folder: &Folder,
        catalogued: &[Asset],
    ) -> CatalogResult<()> {
        debug!(folder = %folder.path, assets = catalogued.len(), "Rebuilding thumbnails");

        for asset in catalogued {
            let full_path = join_path(&folder.path, &asset.file_name);
            if !self.fs.file_exists(Path::new(&full_path)) {
                continue;
            }

            match self.factory.create_thumbnail(asset, folder) {
                Ok(thumbnail) => repo.add_asset(asset.clone(), Some(thumbnail))?,
                Err(e) => warn!(file = %full_path, error = %e, "Failed to rebuild thumbnail"),
            }
        }

        Ok(())
    }

    fn report_failure(
        &self,
        callback: &mut dyn FnMut(CatalogChange),
        run: &mut ScanRun,
        path: &str,
        error: &CatalogError,
    ) {
        warn!(path, error = %error, "Failed to catalog");
        run.summary.failures += 1;
        callback(CatalogChange::failed(
            format!("Failed to catalog {}", path),
            error.to_string(),
        ));
    }
}
