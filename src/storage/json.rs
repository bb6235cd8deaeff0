//! JSON document adapter for the table store.
//!
//! Each table is one versioned JSON document. Writes go through a temp file
//! in the same directory and are renamed into place.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::{StorageError, TableStore, Thumbnails};
use crate::domain::{Asset, Folder};

const FORMAT_VERSION: u32 = 1;
const FOLDERS_TABLE: &str = "folders.json";
const ASSETS_TABLE: &str = "assets.json";
const THUMBNAILS_DIR: &str = "thumbnails";

#[derive(Serialize)]
struct TableOut<'a, T> {
    version: u32,
    rows: &'a [T],
}

#[derive(Deserialize)]
struct TableIn<T> {
    version: u32,
    rows: Vec<T>,
}

/// Blob document: file name -> hex-encoded bytes
#[derive(Serialize, Deserialize)]
struct BlobDocument {
    version: u32,
    entries: BTreeMap<String, String>,
}

/// File-based [`TableStore`] writing JSON documents under one directory
#[derive(Debug, Clone)]
pub struct JsonTableStore {
    dir: PathBuf,
}

impl JsonTableStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir.join(THUMBNAILS_DIR))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.dir.join(THUMBNAILS_DIR).join(name)
    }

    fn load_table<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>, StorageError> {
        let path = self.dir.join(table);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        let document: TableIn<T> = serde_json::from_str(&content)?;
        check_version(table, document.version)?;
        Ok(document.rows)
    }

    fn save_table<T: Serialize>(&self, table: &str, rows: &[T]) -> Result<(), StorageError> {
        let document = TableOut {
            version: FORMAT_VERSION,
            rows,
        };
        let content = serde_json::to_vec_pretty(&document)?;
        write_atomic(&self.dir.join(table), &content)
    }
}

impl TableStore for JsonTableStore {
    fn name(&self) -> &str {
        "json"
    }

    fn load_folders(&mut self) -> Result<Vec<Folder>, StorageError> {
        self.load_table(FOLDERS_TABLE)
    }

    fn save_folders(&mut self, folders: &[Folder]) -> Result<(), StorageError> {
        self.save_table(FOLDERS_TABLE, folders)
    }

    fn load_assets(&mut self) -> Result<Vec<Asset>, StorageError> {
        self.load_table(ASSETS_TABLE)
    }

    fn save_assets(&mut self, assets: &[Asset]) -> Result<(), StorageError> {
        self.save_table(ASSETS_TABLE, assets)
    }

    fn load_blob(&mut self, name: &str) -> Result<Option<Thumbnails>, StorageError> {
        let path = self.blob_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let document: BlobDocument = serde_json::from_str(&content)?;
        check_version(name, document.version)?;

        let mut thumbnails = Thumbnails::with_capacity(document.entries.len());
        for (file_name, encoded) in document.entries {
            let bytes = hex::decode(&encoded).map_err(|e| StorageError::Corrupt {
                table: name.to_string(),
                reason: format!("{}: {}", file_name, e),
            })?;
            thumbnails.insert(file_name, bytes);
        }

        Ok(Some(thumbnails))
    }

    fn save_blob(&mut self, name: &str, thumbnails: &Thumbnails) -> Result<(), StorageError> {
        let document = BlobDocument {
            version: FORMAT_VERSION,
            entries: thumbnails
                .iter()
                .map(|(file_name, bytes)| (file_name.clone(), hex::encode(bytes)))
                .collect(),
        };
        let content = serde_json::to_vec(&document)?;
        write_atomic(&self.blob_path(name), &content)
    }
}

fn check_version(table: &str, version: u32) -> Result<(), StorageError> {
    if version != FORMAT_VERSION {
        return Err(StorageError::UnsupportedVersion {
            table: table.to_string(),
            version,
        });
    }
    Ok(())
}

fn write_atomic(path: &Path, content: &[u8]) -> Result<(), StorageError> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(content)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::contract;
    use tempfile::TempDir;

    fn create_test_store() -> (JsonTableStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = JsonTableStore::open(temp.path()).unwrap();
        (store, temp)
    }

    #[test]
    fn test_missing_tables_load_empty() {
        let (mut store, _temp) = create_test_store();
        contract::missing_tables_load_empty(&mut store);
    }

    #[test]
    fn test_tables_round_trip() {
        let (mut store, _temp) = create_test_store();
        contract::tables_round_trip_in_order(&mut store);
    }

    #[test]
    fn test_blobs_round_trip() {
        let (mut store, _temp) = create_test_store();
        contract::blobs_round_trip(&mut store);
        assert!(store.blob_path("folder.bin").exists());
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let (mut store, temp) = create_test_store();
        fs::write(
            temp.path().join(FOLDERS_TABLE),
            r#"{"version": 99, "rows": []}"#,
        )
        .unwrap();

        assert!(matches!(
            store.load_folders(),
            Err(StorageError::UnsupportedVersion { version: 99, .. })
        ));
    }

    #[test]
    fn test_corrupt_blob_is_reported() {
        let (mut store, temp) = create_test_store();
        fs::write(
            temp.path().join(THUMBNAILS_DIR).join("bad.bin"),
            r#"{"version": 1, "entries": {"a.jpg": "zz"}}"#,
        )
        .unwrap();

        assert!(matches!(
            store.load_blob("bad.bin"),
            Err(StorageError::Corrupt { .. })
        ));
    }
}
