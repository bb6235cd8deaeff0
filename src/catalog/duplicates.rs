//! Byte-identical duplicate detection over the whole catalog.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::repository::CatalogRepository;
use crate::domain::Asset;
use crate::platform::FileSystem;

pub struct FindDuplicatedAssetsService {
    fs: Arc<dyn FileSystem>,
}

impl FindDuplicatedAssetsService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Groups of two or more still-existing assets sharing a content hash.
    ///
    /// Groups and their members keep catalog order. Assets whose file is
    /// gone are dropped before grouping so stale entries never pair up.
    pub fn get_duplicated_assets(&self, repo: &CatalogRepository) -> Vec<Vec<Asset>> {
        let mut groups: Vec<Vec<Asset>> = Vec::new();
        let mut group_by_hash: HashMap<String, usize> = HashMap::new();

        for asset in repo.get_all_assets() {
            let exists = asset
                .full_path()
                .map(|path| self.fs.file_exists(Path::new(&path)))
                .unwrap_or(false);
            if !exists {
                continue;
            }

            match group_by_hash.get(&asset.hash) {
                Some(&index) => groups[index].push(asset),
                None => {
                    group_by_hash.insert(asset.hash.clone(), groups.len());
                    groups.push(vec![asset]);
                }
            }
        }

        groups.retain(|group| group.len() > 1);
        debug!(groups = groups.len(), "Duplicate search finished");
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::asset::fixtures::asset;
    use crate::platform::LocalFileSystem;
    use crate::storage::JsonTableStore;
    use tempfile::TempDir;

    #[test]
    fn test_groups_by_hash_in_catalog_order() {
        let catalog_dir = TempDir::new().unwrap();
        let pictures = TempDir::new().unwrap();
        let fs: Arc<dyn FileSystem> = Arc::new(LocalFileSystem);
        let store = JsonTableStore::open(catalog_dir.path()).unwrap();
        let mut repo = CatalogRepository::open(Box::new(store), fs.clone()).unwrap();

        let folder = repo.add_folder(&pictures.path().to_string_lossy());
        for (name, hash) in [
            ("a.jpg", "x"),
            ("b.jpg", "y"),
            ("c.jpg", "x"),
            ("d.jpg", "z"),
            ("e.jpg", "y"),
            ("f.jpg", "y"),
        ] {
            std::fs::write(pictures.path().join(name), name).unwrap();
            repo.add_asset(asset(&folder, name, hash), None).unwrap();
        }
        std::fs::remove_file(pictures.path().join("f.jpg")).unwrap();

        let service = FindDuplicatedAssetsService::new(fs);
        let groups = service.get_duplicated_assets(&repo);

        let names: Vec<Vec<&str>> = groups
            .iter()
            .map(|g| g.iter().map(|a| a.file_name.as_str()).collect())
            .collect();
        assert_eq!(names, vec![vec!["a.jpg", "c.jpg"], vec!["b.jpg", "e.jpg"]]);
    }
}
