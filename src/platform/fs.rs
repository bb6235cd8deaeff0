//! Local filesystem adapter.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use super::{FileInfo, FileSystem};

/// [`FileSystem`] backed by `std::fs` and `walkdir`
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn list_file_names(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    fn list_sub_directories(&self, dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Directory not found: {}", dir.display()),
            ));
        }

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(if recursive { usize::MAX } else { 1 })
            .sort_by_file_name();

        let mut dirs = Vec::new();
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_dir() {
                dirs.push(entry.into_path());
            }
        }

        Ok(dirs)
    }

    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn copy_file(&self, source: &Path, destination: &Path) -> io::Result<()> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, destination).map(|_| ())
    }

    fn delete_file(&self, path: &Path) -> io::Result<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_directory(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn file_info(&self, path: &Path) -> io::Result<FileInfo> {
        let metadata = fs::metadata(path)?;
        let modified: DateTime<Utc> = metadata.modified()?.into();
        // Not every filesystem records a birth time
        let created: DateTime<Utc> = metadata
            .created()
            .map(DateTime::<Utc>::from)
            .unwrap_or(modified);

        Ok(FileInfo {
            size: metadata.len(),
            created,
            modified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_file_names_skips_directories() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.jpg"), b"b").unwrap();
        fs::write(temp.path().join("a.png"), b"a").unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();

        let names = LocalFileSystem.list_file_names(temp.path()).unwrap();
        assert_eq!(names, vec!["a.png".to_string(), "b.jpg".to_string()]);
    }

    #[test]
    fn test_list_sub_directories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("2020/summer")).unwrap();
        fs::create_dir_all(temp.path().join("2021")).unwrap();

        let direct = LocalFileSystem
            .list_sub_directories(temp.path(), false)
            .unwrap();
        assert_eq!(direct.len(), 2);

        let all = LocalFileSystem
            .list_sub_directories(temp.path(), true)
            .unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.contains(&temp.path().join("2020/summer")));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        assert!(LocalFileSystem.list_file_names(&missing).is_err());
        assert!(LocalFileSystem.list_sub_directories(&missing, false).is_err());
    }

    #[test]
    fn test_copy_creates_destination_directory() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("a.jpg");
        fs::write(&source, b"content").unwrap();

        let destination = temp.path().join("new/dir/a.jpg");
        LocalFileSystem.copy_file(&source, &destination).unwrap();
        assert_eq!(fs::read(&destination).unwrap(), b"content");

        let info = LocalFileSystem.file_info(&destination).unwrap();
        assert_eq!(info.size, 7);
    }

    #[test]
    fn test_delete_missing_file_is_ok() {
        let temp = TempDir::new().unwrap();
        assert!(LocalFileSystem.delete_file(&temp.path().join("nope.jpg")).is_ok());
    }
}
