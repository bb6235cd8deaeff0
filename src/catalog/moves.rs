//! Moving and copying catalogued assets between folders.
//!
//! Every mutating branch saves the affected folder right away instead of
//! waiting for a scan to flush.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use super::factory::AssetFactory;
use super::repository::CatalogRepository;
use crate::config::CatalogSettings;
use crate::domain::{join_path, normalize_path, Asset, Folder};
use crate::error::{CatalogError, CatalogResult};
use crate::platform::{FileSystem, ImageCodec};

pub struct MoveAssetsService {
    fs: Arc<dyn FileSystem>,
    factory: AssetFactory,
}

impl MoveAssetsService {
    pub fn new(
        settings: &CatalogSettings,
        fs: Arc<dyn FileSystem>,
        codec: Arc<dyn ImageCodec>,
    ) -> Self {
        Self {
            factory: AssetFactory::new(fs.clone(), codec, settings),
            fs,
        }
    }

    /// Copy `asset` into `destination`, then drop the source unless
    /// `preserve_original_file`.
    ///
    /// Returns `false` without touching anything when source and
    /// destination resolve to the same path. The destination gets a catalog
    /// entry only if its folder is already catalogued.
    #[instrument(skip_all, fields(file = %asset.file_name, destination = %destination.path))]
    pub fn move_asset(
        &self,
        repo: &mut CatalogRepository,
        asset: &Asset,
        destination: &Folder,
        preserve_original_file: bool,
    ) -> CatalogResult<bool> {
        let (source_folder, source_path, destination_path) = self.validate(asset, destination)?;

        if normalize_path(&source_path) == normalize_path(&destination_path) {
            return Ok(false);
        }

        let destination_is_catalogued = repo.folder_exists(&destination.path);

        self.fs
            .copy_file(Path::new(&source_path), Path::new(&destination_path))
            .map_err(|e| CatalogError::io(&destination_path, e))?;

        if !preserve_original_file {
            let removed = repo.delete_asset(&source_folder.path, &asset.file_name, true)?;
            if removed.is_none() {
                // Source was never catalogued; the file still has to go
                self.fs
                    .delete_file(Path::new(&source_path))
                    .map_err(|e| CatalogError::io(&source_path, e))?;
            }
            repo.save_catalog(Some(source_folder))?;
        }

        if destination_is_catalogued {
            if let Some(destination_folder) = repo.get_folder_by_path(&destination.path) {
                let (new_asset, thumbnail) =
                    self.factory.create_asset(&destination_folder, &asset.file_name)?;
                repo.add_asset(new_asset, Some(thumbnail))?;
                repo.save_catalog(Some(&destination_folder))?;
            }
        }

        info!(
            source = %source_path,
            destination = %destination_path,
            preserve_original_file,
            "Asset moved"
        );
        Ok(true)
    }

    /// Move several assets; every one is validated before anything moves.
    ///
    /// Returns `true` if every asset was moved.
    pub fn move_assets(
        &self,
        repo: &mut CatalogRepository,
        assets: &[Asset],
        destination: &Folder,
        preserve_original_file: bool,
    ) -> CatalogResult<bool> {
        if assets.is_empty() {
            return Err(CatalogError::invalid_argument("no assets to move"));
        }
        for asset in assets {
            self.validate(asset, destination)?;
        }

        let mut all_moved = true;
        for asset in assets {
            all_moved &= self.move_asset(repo, asset, destination, preserve_original_file)?;
        }
        Ok(all_moved)
    }

    fn validate<'a>(
        &self,
        asset: &'a Asset,
        destination: &Folder,
    ) -> CatalogResult<(&'a Folder, String, String)> {
        let source_folder = asset.folder.as_ref().ok_or_else(|| {
            CatalogError::invalid_argument(format!("asset {} has no folder", asset.file_name))
        })?;

        if destination.path.trim().is_empty() {
            return Err(CatalogError::invalid_argument("destination folder is missing"));
        }

        let source_path = join_path(&source_folder.path, &asset.file_name);
        if !self.fs.file_exists(Path::new(&source_path)) {
            return Err(CatalogError::invalid_argument(format!(
                "source file does not exist: {}",
                source_path
            )));
        }

        let destination_path = join_path(&normalize_path(&destination.path), &asset.file_name);
        Ok((source_folder, source_path, destination_path))
    }
}
