//! Catalogued image assets.
//!
//! An asset is identified by its owning folder and file name ([`AssetKey`]).
//! The content hash is a separate grouping key used by duplicate detection;
//! two assets with equal hashes are still distinct assets.

use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::folder::{Folder, FolderId};
use super::path::join_path;

/// Identity of an asset: owning folder plus file name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetKey {
    pub folder_id: FolderId,
    pub file_name: String,
}

/// A single image file in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Owning folder
    pub folder_id: FolderId,

    /// File name, unique within the folder
    pub file_name: String,

    /// File size in bytes
    pub file_size: u64,

    pub pixel_width: u32,
    pub pixel_height: u32,

    /// Content fingerprint (grouping key, not identity)
    pub hash: String,

    /// When the preview was rendered
    pub thumbnail_creation_date_time: DateTime<Utc>,

    pub file_creation_date_time: DateTime<Utc>,
    pub file_modification_date_time: DateTime<Utc>,

    /// Owning folder, attached at query time
    #[serde(skip)]
    pub folder: Option<Folder>,

    /// Encoded preview bytes, attached at query time from the thumbnail blob
    #[serde(skip)]
    pub image_data: Option<Vec<u8>>,
}

impl Asset {
    pub fn key(&self) -> AssetKey {
        AssetKey {
            folder_id: self.folder_id,
            file_name: self.file_name.clone(),
        }
    }

    /// Full path of the backing file, if the folder is attached
    pub fn full_path(&self) -> Option<String> {
        self.folder
            .as_ref()
            .map(|folder| join_path(&folder.path, &self.file_name))
    }

    /// Attach the owning folder
    pub fn with_folder(mut self, folder: Folder) -> Self {
        self.folder = Some(folder);
        self
    }

    /// Copy of this asset without the query-time attachments
    pub fn detached(&self) -> Self {
        Self {
            folder: None,
            image_data: None,
            ..self.clone()
        }
    }
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        self.folder_id == other.folder_id && self.file_name == other.file_name
    }
}

impl Eq for Asset {}

impl Hash for Asset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folder_id.hash(state);
        self.file_name.hash(state);
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn asset(folder: &Folder, file_name: &str, hash: &str) -> Asset {
        let now = Utc::now();
        Asset {
            folder_id: folder.folder_id,
            file_name: file_name.to_string(),
            file_size: 1024,
            pixel_width: 640,
            pixel_height: 480,
            hash: hash.to_string(),
            thumbnail_creation_date_time: now,
            file_creation_date_time: now,
            file_modification_date_time: now,
            folder: None,
            image_data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::fixtures::asset;
    use super::*;

    #[test]
    fn test_identity_ignores_hash() {
        let folder = Folder::new("/pictures");
        let a = asset(&folder, "a.jpg", "aaaa");
        let b = asset(&folder, "a.jpg", "bbbb");
        assert_eq!(a, b);

        let set: HashSet<Asset> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_equal_hash_is_not_identity() {
        let folder = Folder::new("/pictures");
        let a = asset(&folder, "a.jpg", "same");
        let b = asset(&folder, "b.jpg", "same");
        assert_ne!(a, b);
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn test_full_path_requires_folder() {
        let folder = Folder::new("/pictures");
        let a = asset(&folder, "a.jpg", "h");
        assert!(a.full_path().is_none());

        let a = a.with_folder(folder);
        assert_eq!(a.full_path().as_deref(), Some("/pictures/a.jpg"));
    }

    #[test]
    fn test_query_time_fields_are_not_serialized() {
        let folder = Folder::new("/pictures");
        let mut a = asset(&folder, "a.jpg", "h").with_folder(folder);
        a.image_data = Some(vec![1, 2, 3]);

        let json = serde_json::to_string(&a).unwrap();
        assert!(!json.contains("image_data"));

        let parsed: Asset = serde_json::from_str(&json).unwrap();
        assert!(parsed.folder.is_none());
        assert!(parsed.image_data.is_none());
        assert_eq!(parsed, a);
    }
}
