//! Catalogued folders.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::path::normalize_path;

/// Opaque folder identifier, assigned once when the folder is catalogued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(Uuid);

impl FolderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FolderId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for FolderId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for FolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for FolderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A directory known to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Immutable identifier
    pub folder_id: FolderId,

    /// Absolute, normalized directory path (unique across the catalog)
    pub path: String,
}

impl Folder {
    /// Create a folder with a fresh identifier
    pub fn new(path: &str) -> Self {
        Self {
            folder_id: FolderId::new(),
            path: normalize_path(path),
        }
    }

    /// Name of the thumbnail blob for this folder
    pub fn thumbnails_key(&self) -> String {
        format!("{}.bin", self.folder_id)
    }

    /// Last path component, for display
    pub fn name(&self) -> &str {
        self.path
            .rsplit(['/', '\\'])
            .find(|part| !part.is_empty())
            .unwrap_or(&self.path)
    }
}
