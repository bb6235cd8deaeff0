//! Source/destination directory definitions for import and sync.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::path::{is_valid_directory_path, normalize_path};

/// One source → destination directory pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryMapping {
    pub source_directory: String,
    pub destination_directory: String,

    /// Recurse into sub-directories of the source
    #[serde(default)]
    pub include_sub_folders: bool,

    /// Sync only: delete destination files that are gone from the source
    #[serde(default)]
    pub delete_assets_not_in_source: bool,
}

impl DirectoryMapping {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source_directory: source.into(),
            destination_directory: destination.into(),
            include_sub_folders: false,
            delete_assets_not_in_source: false,
        }
    }

    pub fn with_sub_folders(mut self) -> Self {
        self.include_sub_folders = true;
        self
    }

    pub fn deleting_assets_not_in_source(mut self) -> Self {
        self.delete_assets_not_in_source = true;
        self
    }

    /// Both directories are local absolute or UNC paths
    pub fn is_valid(&self) -> bool {
        is_valid_directory_path(&self.source_directory)
            && is_valid_directory_path(&self.destination_directory)
    }

    pub fn normalized(&self) -> Self {
        Self {
            source_directory: normalize_path(&self.source_directory),
            destination_directory: normalize_path(&self.destination_directory),
            ..self.clone()
        }
    }
}

/// Drop invalid definitions and normalize the rest
pub fn prepare_definitions(definitions: &[DirectoryMapping]) -> Vec<DirectoryMapping> {
    definitions
        .iter()
        .filter(|definition| {
            let valid = definition.is_valid();
            if !valid {
                warn!(
                    source = %definition.source_directory,
                    destination = %definition.destination_directory,
                    "Skipping invalid directory definition"
                );
            }
            valid
        })
        .map(DirectoryMapping::normalized)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_definitions_are_dropped() {
        let definitions = vec![
            DirectoryMapping::new("/camera//dcim/", "/pictures/camera"),
            DirectoryMapping::new("relative", "/pictures"),
            DirectoryMapping::new("/camera", ""),
            DirectoryMapping::new("\\\\nas\\photos\\", "C:\\Pictures\\\\Nas").with_sub_folders(),
        ];

        let prepared = prepare_definitions(&definitions);
        assert_eq!(prepared.len(), 2);
        assert_eq!(prepared[0].source_directory, "/camera/dcim");
        assert_eq!(prepared[1].source_directory, "\\\\nas\\photos");
        assert_eq!(prepared[1].destination_directory, "C:\\Pictures\\Nas");
        assert!(prepared[1].include_sub_folders);
    }

    #[test]
    fn test_yaml_defaults() {
        let yaml = "source_directory: /a\ndestination_directory: /b\n";
        let mapping: DirectoryMapping = serde_yaml::from_str(yaml).unwrap();
        assert!(!mapping.include_sub_folders);
        assert!(!mapping.delete_assets_not_in_source);
    }
}
