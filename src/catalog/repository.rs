//! In-memory catalog index backed by a [`TableStore`].
//!
//! The repository is the single owner of catalog state: the Folders and
//! Assets tables, the lazily loaded per-folder thumbnail blobs, and the
//! dirty flags that decide what [`CatalogRepository::save_catalog`] writes.
//! Construct one per catalog and pass it to the services explicitly. There
//! is no internal locking; one operation at a time.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{join_path, normalize_path, Asset, Folder, FolderId};
use crate::error::{CatalogError, CatalogResult};
use crate::platform::FileSystem;
use crate::storage::{TableStore, Thumbnails};

pub struct CatalogRepository {
    store: Box<dyn TableStore>,
    fs: Arc<dyn FileSystem>,

    /// Folders table, insertion ordered
    folders: Vec<Folder>,

    /// Assets table, insertion ordered
    assets: Vec<Asset>,

    /// Thumbnail blobs loaded so far, by blob key
    thumbnails: HashMap<String, Thumbnails>,

    /// Loaded blobs with unsaved changes
    dirty_blobs: HashSet<String>,

    /// Folders/Assets tables have unsaved changes
    tables_dirty: bool,
}

impl CatalogRepository {
    /// Load the Folders and Assets tables from `store`
    pub fn open(mut store: Box<dyn TableStore>, fs: Arc<dyn FileSystem>) -> CatalogResult<Self> {
        let folders = store.load_folders()?;
        let assets = store.load_assets()?;

        info!(
            store = store.name(),
            folders = folders.len(),
            assets = assets.len(),
            "Catalog loaded"
        );

        Ok(Self {
            store,
            fs,
            folders,
            assets,
            thumbnails: HashMap::new(),
            dirty_blobs: HashSet::new(),
            tables_dirty: false,
        })
    }

    /// Filesystem collaborator shared with the services
    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    // ------------------------------------------------------------------
    // Folders
    // ------------------------------------------------------------------

    /// Existing folder for `path`, or a newly catalogued one
    pub fn add_folder(&mut self, path: &str) -> Folder {
        let path = normalize_path(path);
        if let Some(folder) = self.folders.iter().find(|f| f.path == path) {
            return folder.clone();
        }

        let folder = Folder::new(&path);
        debug!(folder = %folder.path, "Folder added to catalog");
        self.folders.push(folder.clone());
        self.tables_dirty = true;
        folder
    }

    pub fn folder_exists(&self, path: &str) -> bool {
        self.get_folder_by_path(path).is_some()
    }

    pub fn get_folder_by_path(&self, path: &str) -> Option<Folder> {
        let path = normalize_path(path);
        self.folders.iter().find(|f| f.path == path).cloned()
    }

    pub fn get_folder_by_id(&self, folder_id: FolderId) -> Option<&Folder> {
        self.folders.iter().find(|f| f.folder_id == folder_id)
    }

    /// All catalogued folders, in catalog order
    pub fn get_folders(&self) -> &[Folder] {
        &self.folders
    }

    /// Immediate on-disk sub-directories of `folder`.
    ///
    /// Catalogued directories come back with their catalog identity; the
    /// others get a fresh, uncatalogued [`Folder`].
    pub fn get_sub_folders(&self, folder: &Folder, include_hidden: bool) -> CatalogResult<Vec<Folder>> {
        let dirs = self
            .fs
            .list_sub_directories(Path::new(&folder.path), false)
            .map_err(|e| CatalogError::io(&folder.path, e))?;

        Ok(dirs
            .iter()
            .filter_map(|dir| dir.to_str())
            .map(|dir| {
                self.get_folder_by_path(dir)
                    .unwrap_or_else(|| Folder::new(dir))
            })
            .filter(|sub| include_hidden || !sub.name().starts_with('.'))
            .collect())
    }

    // ------------------------------------------------------------------
    // Assets
    // ------------------------------------------------------------------

    /// Everything indexed for the folder, including entries whose file may
    /// since have vanished
    pub fn get_catalogued_assets(&self, path: &str) -> Vec<Asset> {
        let Some(folder) = self.get_folder_by_path(path) else {
            return Vec::new();
        };

        self.assets
            .iter()
            .filter(|a| a.folder_id == folder.folder_id)
            .map(|a| a.clone().with_folder(folder.clone()))
            .collect()
    }

    /// Every asset of every folder, in catalog order, with folders attached
    pub fn get_all_assets(&self) -> Vec<Asset> {
        self.assets
            .iter()
            .map(|asset| match self.get_folder_by_id(asset.folder_id) {
                Some(folder) => asset.clone().with_folder(folder.clone()),
                None => asset.clone(),
            })
            .collect()
    }

    /// Catalogued assets whose file still exists, with preview bytes
    /// attached from the folder's thumbnail blob
    pub fn get_assets(&mut self, path: &str) -> CatalogResult<Vec<Asset>> {
        if path.trim().is_empty() {
            return Err(CatalogError::invalid_argument("directory must not be empty"));
        }

        let Some(folder) = self.get_folder_by_path(path) else {
            return Ok(Vec::new());
        };

        let key = folder.thumbnails_key();
        self.ensure_thumbnails_loaded(&key)?;
        let thumbnails = self.thumbnails.get(&key);

        let mut assets = Vec::new();
        for asset in self.assets.iter().filter(|a| a.folder_id == folder.folder_id) {
            let full_path = join_path(&folder.path, &asset.file_name);
            if !self.fs.file_exists(Path::new(&full_path)) {
                continue;
            }

            let mut asset = asset.clone().with_folder(folder.clone());
            asset.image_data = thumbnails.and_then(|t| t.get(&asset.file_name)).cloned();
            assets.push(asset);
        }

        Ok(assets)
    }

    /// Insert or replace an asset and its optional thumbnail bytes.
    ///
    /// The owning folder is taken from `asset.folder` when attached (and
    /// catalogued first if needed), otherwise from `asset.folder_id`.
    pub fn add_asset(&mut self, asset: Asset, thumbnail: Option<Vec<u8>>) -> CatalogResult<()> {
        let folder = match &asset.folder {
            Some(folder) => self.add_folder(&folder.path),
            None => self
                .get_folder_by_id(asset.folder_id)
                .cloned()
                .ok_or_else(|| {
                    CatalogError::invalid_argument(format!(
                        "asset {} has no folder",
                        asset.file_name
                    ))
                })?,
        };

        let mut row = asset.detached();
        row.folder_id = folder.folder_id;

        if let Some(bytes) = thumbnail {
            let key = folder.thumbnails_key();
            self.ensure_thumbnails_loaded(&key)?;
            if let Some(blob) = self.thumbnails.get_mut(&key) {
                blob.insert(row.file_name.clone(), bytes);
                self.dirty_blobs.insert(key);
            }
        }

        match self.assets.iter_mut().find(|a| a.key() == row.key()) {
            Some(existing) => *existing = row,
            None => self.assets.push(row),
        }
        self.tables_dirty = true;

        Ok(())
    }

    /// Remove an asset and its thumbnail; optionally delete the file too.
    ///
    /// Deleting something that is not catalogued is a no-op. Returns the
    /// removed asset. With `delete_file`, a catalogued entry whose file is
    /// already gone is rejected as an argument error.
    pub fn delete_asset(
        &mut self,
        folder_path: &str,
        file_name: &str,
        delete_file: bool,
    ) -> CatalogResult<Option<Asset>> {
        let Some(folder) = self.get_folder_by_path(folder_path) else {
            return Ok(None);
        };
        let Some(position) = self
            .assets
            .iter()
            .position(|a| a.folder_id == folder.folder_id && a.file_name == file_name)
        else {
            return Ok(None);
        };

        if delete_file {
            let full_path = join_path(&folder.path, file_name);
            if !self.fs.file_exists(Path::new(&full_path)) {
                return Err(CatalogError::invalid_argument(format!(
                    "file to delete does not exist: {}",
                    full_path
                )));
            }
            self.fs
                .delete_file(Path::new(&full_path))
                .map_err(|e| CatalogError::io(&full_path, e))?;
        }

        let key = folder.thumbnails_key();
        self.ensure_thumbnails_loaded(&key)?;
        if let Some(blob) = self.thumbnails.get_mut(&key) {
            if blob.remove(file_name).is_some() {
                self.dirty_blobs.insert(key);
            }
        }

        let removed = self.assets.remove(position);
        self.tables_dirty = true;
        debug!(folder = %folder.path, file = file_name, delete_file, "Asset removed from catalog");

        Ok(Some(removed.with_folder(folder)))
    }

    // ------------------------------------------------------------------
    // Thumbnails
    // ------------------------------------------------------------------

    /// The thumbnail blob for `key`, loading or initializing it.
    ///
    /// The flag is `true` when the blob did not exist in the store and was
    /// freshly initialized; callers must then rebuild previews for every
    /// asset already catalogued in that folder.
    pub fn get_thumbnails(&mut self, key: &str) -> CatalogResult<(&Thumbnails, bool)> {
        let is_new_file = self.ensure_thumbnails_loaded(key)?;
        let blob = self.thumbnails.entry(key.to_string()).or_default();
        Ok((blob, is_new_file))
    }

    /// Stored preview bytes for one asset
    pub fn load_thumbnail(&mut self, folder: &Folder, file_name: &str) -> CatalogResult<Option<Vec<u8>>> {
        let (blob, _) = self.get_thumbnails(&folder.thumbnails_key())?;
        Ok(blob.get(file_name).cloned())
    }

    fn ensure_thumbnails_loaded(&mut self, key: &str) -> CatalogResult<bool> {
        if self.thumbnails.contains_key(key) {
            return Ok(false);
        }

        let (blob, is_new_file) = match self.store.load_blob(key)? {
            Some(blob) => (blob, false),
            None => (Thumbnails::new(), true),
        };
        self.thumbnails.insert(key.to_string(), blob);
        Ok(is_new_file)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Any unsaved table or thumbnail changes
    pub fn has_changes(&self) -> bool {
        self.tables_dirty || !self.dirty_blobs.is_empty()
    }

    /// Flush pending changes.
    ///
    /// With a folder: persists that folder's thumbnail blob plus the shared
    /// tables. Without one: persists the tables and every modified blob.
    pub fn save_catalog(&mut self, folder: Option<&Folder>) -> CatalogResult<()> {
        if self.tables_dirty {
            self.store.save_folders(&self.folders)?;
            self.store.save_assets(&self.assets)?;
            self.tables_dirty = false;
        }

        let keys: Vec<String> = match folder {
            Some(folder) => {
                let key = folder.thumbnails_key();
                if self.thumbnails.contains_key(&key) {
                    vec![key]
                } else {
                    Vec::new()
                }
            }
            None => self.dirty_blobs.iter().cloned().collect(),
        };

        for key in keys {
            if let Some(blob) = self.thumbnails.get(&key) {
                self.store.save_blob(&key, blob)?;
            }
            self.dirty_blobs.remove(&key);
        }

        debug!(
            folder = folder.map(|f| f.path.as_str()).unwrap_or("*"),
            pending_blobs = self.dirty_blobs.len(),
            "Catalog saved"
        );

        Ok(())
    }
}

impl std::fmt::Debug for CatalogRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogRepository")
            .field("store", &self.store.name())
            .field("folders", &self.folders.len())
            .field("assets", &self.assets.len())
            .field("has_changes", &self.has_changes())
            .finish()
    }
}
