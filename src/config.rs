//! Configuration for photocat.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (PHOTOCAT_HOME, PHOTOCAT_PICTURES)
//! 2. Config file (.photocat/config.yaml)
//! 3. Defaults (~/.photocat, the user's picture directory)
//!
//! Config file discovery:
//! - Searches current directory and parents for .photocat/config.yaml
//! - Paths in config file are relative to the project root (the parent of .photocat/)
//!
//! The resolved configuration is a plain value. Callers load it once and
//! hand it to the services that need it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::DirectoryMapping;

pub const DEFAULT_BATCH_SIZE: usize = 5000;
pub const DEFAULT_THUMBNAIL_MAX_WIDTH: u32 = 200;
pub const DEFAULT_THUMBNAIL_MAX_HEIGHT: u32 = 150;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
    #[serde(default)]
    pub imports: Vec<DirectoryMapping>,
    #[serde(default)]
    pub syncs: Vec<DirectoryMapping>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Catalog storage directory
    pub home: Option<String>,
    /// Primary picture root
    pub pictures: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub batch_size: Option<usize>,
    pub thumbnail_max_width: Option<u32>,
    pub thumbnail_max_height: Option<u32>,
    pub storage: Option<StorageBackend>,
}

/// Which table store adapter holds the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Json => write!(f, "json"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Scan tuning knobs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Maximum create/delete operations per scan invocation
    pub batch_size: usize,
    pub thumbnail_max_width: u32,
    pub thumbnail_max_height: u32,
    pub storage: StorageBackend,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            thumbnail_max_width: DEFAULT_THUMBNAIL_MAX_WIDTH,
            thumbnail_max_height: DEFAULT_THUMBNAIL_MAX_HEIGHT,
            storage: StorageBackend::default(),
        }
    }
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Catalog storage directory
    pub home: PathBuf,
    /// Primary picture root, always scanned
    pub pictures_directory: PathBuf,
    pub catalog: CatalogSettings,
    pub imports: Vec<DirectoryMapping>,
    pub syncs: Vec<DirectoryMapping>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Configuration rooted at explicit directories, with default settings
    pub fn with_paths(home: impl Into<PathBuf>, pictures_directory: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            pictures_directory: pictures_directory.into(),
            catalog: CatalogSettings::default(),
            imports: Vec::new(),
            syncs: Vec::new(),
            config_file: None,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.catalog.batch_size = batch_size;
        self
    }

    pub fn with_storage(mut self, storage: StorageBackend) -> Self {
        self.catalog.storage = storage;
        self
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".photocat").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

fn default_pictures_dir() -> Result<PathBuf> {
    if let Some(dir) = dirs::picture_dir() {
        return Ok(dir);
    }
    Ok(dirs::home_dir()
        .context("Failed to determine home directory")?
        .join("Pictures"))
}

fn resolve_settings(catalog: Option<&CatalogConfig>) -> CatalogSettings {
    let defaults = CatalogSettings::default();
    let Some(catalog) = catalog else {
        return defaults;
    };

    CatalogSettings {
        batch_size: catalog.batch_size.unwrap_or(defaults.batch_size).max(1),
        thumbnail_max_width: catalog
            .thumbnail_max_width
            .unwrap_or(defaults.thumbnail_max_width)
            .max(1),
        thumbnail_max_height: catalog
            .thumbnail_max_height
            .unwrap_or(defaults.thumbnail_max_height)
            .max(1),
        storage: catalog.storage.unwrap_or(defaults.storage),
    }
}

/// Build a resolved configuration from an optional parsed file
fn resolve(config_file: Option<(PathBuf, ConfigFile)>) -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".photocat");

    let env_home = std::env::var("PHOTOCAT_HOME").ok().map(PathBuf::from);
    let env_pictures = std::env::var("PHOTOCAT_PICTURES").ok().map(PathBuf::from);

    let Some((config_path, config)) = config_file else {
        return Ok(ResolvedConfig {
            home: env_home.unwrap_or(default_home),
            pictures_directory: match env_pictures {
                Some(dir) => dir,
                None => default_pictures_dir()?,
            },
            catalog: CatalogSettings::default(),
            imports: Vec::new(),
            syncs: Vec::new(),
            config_file: None,
        });
    };

    // Base directory is the parent of .photocat/ (i.e., grandparent of config.yaml)
    let base_dir = config_path
        .parent()
        .and_then(|p| p.parent())
        .unwrap_or(Path::new("."))
        .to_path_buf();

    let home = match (env_home, &config.paths.home) {
        (Some(dir), _) => dir,
        (None, Some(home)) => resolve_path(&base_dir, home),
        (None, None) => default_home,
    };

    let pictures_directory = match (env_pictures, &config.paths.pictures) {
        (Some(dir), _) => dir,
        (None, Some(pictures)) => resolve_path(&base_dir, pictures),
        (None, None) => default_pictures_dir()?,
    };

    Ok(ResolvedConfig {
        home,
        pictures_directory,
        catalog: resolve_settings(config.catalog.as_ref()),
        imports: config.imports,
        syncs: config.syncs,
        config_file: Some(config_path),
    })
}

/// Load configuration from all sources
pub fn load_config() -> Result<ResolvedConfig> {
    let config_file = match find_config_file() {
        Some(path) => {
            let config = load_config_file(&path)?;
            Some((path, config))
        }
        None => None,
    };
    resolve(config_file)
}

/// Load configuration from an explicit config file
pub fn load_config_from(path: &Path) -> Result<ResolvedConfig> {
    let config = load_config_file(path)?;
    resolve(Some((path.to_path_buf(), config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let photocat_dir = temp.path().join(".photocat");
        std::fs::create_dir_all(&photocat_dir).unwrap();

        let config_path = photocat_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
paths:
  home: ./catalog
  pictures: /data/pictures
catalog:
  batch_size: 250
  storage: sqlite
imports:
  - source_directory: /camera
    destination_directory: /data/pictures/camera
    include_sub_folders: true
"#
        )
        .unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.paths.home, Some("./catalog".to_string()));
        assert_eq!(config.paths.pictures, Some("/data/pictures".to_string()));
        let catalog = config.catalog.as_ref().unwrap();
        assert_eq!(catalog.batch_size, Some(250));
        assert_eq!(catalog.storage, Some(StorageBackend::Sqlite));
        assert_eq!(config.imports.len(), 1);
        assert!(config.imports[0].include_sub_folders);
        assert!(config.syncs.is_empty());
    }

    #[test]
    fn test_settings_fall_back_to_defaults() {
        let settings = resolve_settings(Some(&CatalogConfig {
            batch_size: Some(0),
            thumbnail_max_width: None,
            thumbnail_max_height: Some(90),
            storage: None,
        }));

        assert_eq!(settings.batch_size, 1);
        assert_eq!(settings.thumbnail_max_width, DEFAULT_THUMBNAIL_MAX_WIDTH);
        assert_eq!(settings.thumbnail_max_height, 90);
        assert_eq!(settings.storage, StorageBackend::Json);

        assert_eq!(resolve_settings(None), CatalogSettings::default());
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./subdir"),
            PathBuf::from("/home/user/project/subdir")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/path"),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_with_paths_builder() {
        let config = ResolvedConfig::with_paths("/tmp/home", "/tmp/pictures")
            .with_batch_size(10)
            .with_storage(StorageBackend::Sqlite);

        assert_eq!(config.catalog.batch_size, 10);
        assert_eq!(config.catalog.storage, StorageBackend::Sqlite);
        assert_eq!(config.pictures_directory, PathBuf::from("/tmp/pictures"));
    }
}
