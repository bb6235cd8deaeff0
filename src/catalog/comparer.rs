//! Set differences between directory listings and catalog contents.
//!
//! Every function here is pure: callers do the filesystem enumeration and
//! pass in file name lists. Output order follows the first argument's order.

use std::collections::HashSet;

use crate::domain::Asset;

/// Image extensions the catalog picks up (compared case-insensitively)
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "bmp", "gif", "ico", "jfif", "jpeg", "jpg", "png", "tif", "tiff", "webp",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryComparer;

impl DirectoryComparer {
    pub fn new() -> Self {
        Self
    }

    /// Whether a file name carries a supported image extension
    pub fn is_image_file(&self, file_name: &str) -> bool {
        file_name
            .rsplit_once('.')
            .map(|(stem, ext)| {
                !stem.is_empty()
                    && SUPPORTED_EXTENSIONS
                        .iter()
                        .any(|supported| supported.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// On-disk image files not yet catalogued
    pub fn new_file_names(&self, on_disk: &[String], catalogued: &[Asset]) -> Vec<String> {
        let catalogued: HashSet<&str> = catalogued.iter().map(|a| a.file_name.as_str()).collect();

        on_disk
            .iter()
            .filter(|name| self.is_image_file(name) && !catalogued.contains(name.as_str()))
            .cloned()
            .collect()
    }

    /// Catalogued file names no longer present on disk
    pub fn deleted_file_names(&self, on_disk: &[String], catalogued: &[Asset]) -> Vec<String> {
        let on_disk: HashSet<&str> = on_disk.iter().map(String::as_str).collect();

        catalogued
            .iter()
            .filter(|asset| !on_disk.contains(asset.file_name.as_str()))
            .map(|asset| asset.file_name.clone())
            .collect()
    }

    /// Source image files absent from the destination listing (exact mirror)
    pub fn files_missing_from(&self, source: &[String], destination: &[String]) -> Vec<String> {
        let destination: HashSet<&str> = destination.iter().map(String::as_str).collect();

        source
            .iter()
            .filter(|name| self.is_image_file(name) && !destination.contains(name.as_str()))
            .cloned()
            .collect()
    }

    /// Source image files not present at the destination root nor anywhere
    /// in its subtree.
    ///
    /// `destination_subtree` holds every file name found under the
    /// destination root, recursively.
    pub fn files_to_import(
        &self,
        source: &[String],
        destination_subtree: &HashSet<String>,
    ) -> Vec<String> {
        source
            .iter()
            .filter(|name| self.is_image_file(name) && !destination_subtree.contains(name.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::asset::fixtures::asset;
    use crate::domain::Folder;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_supported_extensions() {
        let comparer = DirectoryComparer::new();
        assert!(comparer.is_image_file("a.jpg"));
        assert!(comparer.is_image_file("B.JPEG"));
        assert!(comparer.is_image_file("scan.Tiff"));
        assert!(comparer.is_image_file("image.webp"));

        assert!(!comparer.is_image_file("notes.txt"));
        assert!(!comparer.is_image_file("jpg"));
        assert!(!comparer.is_image_file(".png"));
        assert!(!comparer.is_image_file("movie.mp4"));
    }

    #[test]
    fn test_new_file_names() {
        let folder = Folder::new("/pictures");
        let catalogued = vec![asset(&folder, "a.jpg", "h1"), asset(&folder, "b.png", "h2")];
        let on_disk = names(&["a.jpg", "c.gif", "readme.txt", "d.JPG"]);

        let new = DirectoryComparer.new_file_names(&on_disk, &catalogued);
        assert_eq!(new, names(&["c.gif", "d.JPG"]));
    }

    #[test]
    fn test_deleted_file_names() {
        let folder = Folder::new("/pictures");
        let catalogued = vec![asset(&folder, "a.jpg", "h1"), asset(&folder, "b.png", "h2")];
        let on_disk = names(&["a.jpg", "c.gif"]);

        let deleted = DirectoryComparer.deleted_file_names(&on_disk, &catalogued);
        assert_eq!(deleted, names(&["b.png"]));
    }

    #[test]
    fn test_no_changes_when_in_sync() {
        let folder = Folder::new("/pictures");
        let catalogued = vec![asset(&folder, "a.jpg", "h1")];
        let on_disk = names(&["a.jpg"]);

        assert!(DirectoryComparer.new_file_names(&on_disk, &catalogued).is_empty());
        assert!(DirectoryComparer.deleted_file_names(&on_disk, &catalogued).is_empty());
    }

    #[test]
    fn test_files_missing_from_destination() {
        let source = names(&["a.jpg", "b.jpg", "c.txt"]);
        let destination = names(&["a.jpg"]);

        assert_eq!(
            DirectoryComparer.files_missing_from(&source, &destination),
            names(&["b.jpg"])
        );
        assert_eq!(
            DirectoryComparer.files_missing_from(&destination, &source),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_files_to_import_checks_whole_subtree() {
        let source = names(&["a.jpg", "b.jpg", "c.jpg"]);
        // b.jpg was moved by the user into a sub-folder of the destination
        let subtree: HashSet<String> = names(&["a.jpg", "b.jpg"]).into_iter().collect();

        assert_eq!(
            DirectoryComparer.files_to_import(&source, &subtree),
            names(&["c.jpg"])
        );
    }
}
