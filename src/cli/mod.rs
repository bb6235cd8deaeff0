//! Command-line interface for photocat.
//!
//! Provides commands for scanning the picture tree, listing a folder,
//! finding duplicates, moving files, and running import/sync definitions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::catalog::{
    AssetFactory, CancellationToken, CatalogAssetsService, CatalogRepository,
    FindDuplicatedAssetsService, ImportNewAssetsService, MoveAssetsService, ScanSummary,
    SyncAssetsService,
};
use crate::config::{self, ResolvedConfig};
use crate::domain::{normalize_path, CatalogChange, CatalogChangeReason, Folder};
use crate::error::CatalogError;
use crate::platform::{FileSystem, ImageCodec, ImageCrateCodec, LocalFileSystem};
use crate::storage::open_store;

/// photocat - Incremental image catalog and sync engine
#[derive(Parser, Debug)]
#[command(name = "photocat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (searched upward from the current directory if omitted)
    #[arg(short, long, global = true, env = "PHOTOCAT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Catalog new images and drop entries for deleted ones
    Scan,

    /// List the catalogued images of a directory
    List {
        /// Directory to list
        directory: String,
    },

    /// Show groups of byte-identical images
    Duplicates {
        /// Keep the first image of each group and delete the others
        #[arg(long)]
        delete_extra: bool,
    },

    /// Move an image to another directory
    Move {
        /// Image file to move
        file: PathBuf,

        /// Destination directory
        destination: String,

        /// Keep the original file
        #[arg(long)]
        copy: bool,
    },

    /// Import new images using the configured import definitions
    Import,

    /// Mirror directories using the configured sync definitions
    Sync,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => config::load_config_from(path)?,
            None => config::load_config()?,
        };

        match self.command {
            Commands::Scan => scan(config).await,
            Commands::List { directory } => list_directory(&config, &directory),
            Commands::Duplicates { delete_extra } => find_duplicates(&config, delete_extra),
            Commands::Move {
                file,
                destination,
                copy,
            } => move_file(&config, &file, &destination, copy),
            Commands::Import => import(&config),
            Commands::Sync => sync(&config),
            Commands::Config => show_config(&config),
        }
    }
}

fn file_system() -> Arc<dyn FileSystem> {
    Arc::new(LocalFileSystem)
}

fn codec() -> Arc<dyn ImageCodec> {
    Arc::new(ImageCrateCodec::default())
}

fn open_repository(config: &ResolvedConfig, fs: Arc<dyn FileSystem>) -> Result<CatalogRepository> {
    let store = open_store(config)
        .with_context(|| format!("Failed to open catalog at {}", config.home.display()))?;
    Ok(CatalogRepository::open(store, fs)?)
}

/// Run a scan on a blocking thread; Ctrl-C cancels it between directories
async fn scan(config: ResolvedConfig) -> Result<()> {
    let cancel = CancellationToken::new();

    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling scan...");
            on_interrupt.cancel();
        }
    });

    let task = tokio::task::spawn_blocking(move || -> Result<ScanSummary> {
        let fs = file_system();
        let mut repo = open_repository(&config, fs.clone())?;
        let service = CatalogAssetsService::new(&config, fs, codec());
        let mut print = |change: CatalogChange| print_change(&change);
        Ok(service.catalog_assets(&mut repo, &mut print, &cancel)?)
    });

    match task.await.context("Scan task failed")? {
        Ok(summary) => {
            eprintln!(
                "\n[Scan finished: {} added, {} removed, {} failures{}]",
                summary.created,
                summary.deleted,
                summary.failures,
                if summary.batch_exhausted {
                    "; batch limit reached, run again to continue"
                } else {
                    ""
                }
            );
            Ok(())
        }
        Err(e)
            if e.downcast_ref::<CatalogError>()
                .map(CatalogError::is_cancellation)
                .unwrap_or(false) =>
        {
            eprintln!("\n[Scan cancelled, completed work was saved]");
            std::process::exit(130);
        }
        Err(e) => Err(e),
    }
}

fn print_change(change: &CatalogChange) {
    if change.is_completion() {
        return;
    }

    match (&change.reason, &change.error) {
        (Some(CatalogChangeReason::Created), _) => println!("+ {}", change.message),
        (Some(CatalogChangeReason::Deleted), _) => println!("- {}", change.message),
        (None, Some(error)) => eprintln!("! {}: {}", change.message, error),
        (None, None) => println!("  {}", change.message),
    }
}

/// List the catalogued images of a directory
fn list_directory(config: &ResolvedConfig, directory: &str) -> Result<()> {
    let mut repo = open_repository(config, file_system())?;
    let assets = repo.get_assets(&normalize_path(directory))?;

    if assets.is_empty() {
        println!("No catalogued images in {}", directory);
        return Ok(());
    }

    println!("{:<40} {:>11} {:>12} {:<16}", "FILE", "PIXELS", "BYTES", "HASH");
    println!("{}", "-".repeat(82));

    for asset in assets {
        let short_hash: String = asset.hash.chars().take(16).collect();
        println!(
            "{:<40} {:>11} {:>12} {:<16}",
            asset.file_name,
            format!("{}x{}", asset.pixel_width, asset.pixel_height),
            asset.file_size,
            short_hash
        );
    }

    Ok(())
}

/// Print duplicate groups, optionally deleting all but the first of each
fn find_duplicates(config: &ResolvedConfig, delete_extra: bool) -> Result<()> {
    let fs = file_system();
    let mut repo = open_repository(config, fs.clone())?;
    let groups = FindDuplicatedAssetsService::new(fs).get_duplicated_assets(&repo);

    if groups.is_empty() {
        println!("No duplicates found");
        return Ok(());
    }

    let mut deleted = 0;
    for (index, group) in groups.iter().enumerate() {
        println!("Group {} ({})", index + 1, group[0].hash);
        for (position, asset) in group.iter().enumerate() {
            let path = asset.full_path().unwrap_or_else(|| asset.file_name.clone());
            if delete_extra && position > 0 {
                if let Some(folder) = &asset.folder {
                    repo.delete_asset(&folder.path, &asset.file_name, true)?;
                    deleted += 1;
                    println!("  - {} (deleted)", path);
                    continue;
                }
            }
            println!("  {}", path);
        }
    }

    if deleted > 0 {
        repo.save_catalog(None)?;
        eprintln!("\n[{} duplicate files deleted]", deleted);
    }

    Ok(())
}

/// Move (or copy) one image into a destination directory
fn move_file(config: &ResolvedConfig, file: &Path, destination: &str, copy: bool) -> Result<()> {
    let fs = file_system();
    let mut repo = open_repository(config, fs.clone())?;

    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Not a file path: {}", file.display()))?;
    let source_directory = normalize_path(
        &file
            .parent()
            .map(|parent| parent.to_string_lossy().to_string())
            .unwrap_or_default(),
    );

    let asset = match repo
        .get_catalogued_assets(&source_directory)
        .into_iter()
        .find(|asset| asset.file_name == file_name)
    {
        Some(asset) => asset,
        None => {
            // Uncatalogued source: describe it from disk so it can still be moved
            let factory = AssetFactory::new(fs.clone(), codec(), &config.catalog);
            factory.create_asset(&Folder::new(&source_directory), file_name)?.0
        }
    };

    let destination_folder = repo
        .get_folder_by_path(destination)
        .unwrap_or_else(|| Folder::new(destination));

    let service = MoveAssetsService::new(&config.catalog, fs, codec());
    if service.move_asset(&mut repo, &asset, &destination_folder, copy)? {
        println!(
            "{} {} to {}",
            if copy { "Copied" } else { "Moved" },
            file.display(),
            destination_folder.path
        );
    } else {
        println!("Source and destination are the same, nothing to do");
    }

    Ok(())
}

fn import(config: &ResolvedConfig) -> Result<()> {
    if config.imports.is_empty() {
        println!("No import definitions configured");
        return Ok(());
    }

    for result in ImportNewAssetsService::new(file_system()).import(&config.imports) {
        println!("{}", result.message);
    }
    Ok(())
}

fn sync(config: &ResolvedConfig) -> Result<()> {
    if config.syncs.is_empty() {
        println!("No sync definitions configured");
        return Ok(());
    }

    for result in SyncAssetsService::new(file_system()).execute(&config.syncs) {
        println!("{}", result.message);
    }
    Ok(())
}

/// Show resolved configuration
fn show_config(cfg: &ResolvedConfig) -> Result<()> {
    println!("photocat configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home (catalog):  {}", cfg.home.display());
    println!("  Pictures:        {}", cfg.pictures_directory.display());
    println!();
    println!("Catalog:");
    println!("  Storage:         {}", cfg.catalog.storage);
    println!("  Batch size:      {}", cfg.catalog.batch_size);
    println!(
        "  Thumbnail box:   {}x{}",
        cfg.catalog.thumbnail_max_width, cfg.catalog.thumbnail_max_height
    );
    println!();
    println!("Imports: {}", cfg.imports.len());
    for definition in &cfg.imports {
        println!(
            "  {} -> {}{}",
            definition.source_directory,
            definition.destination_directory,
            if definition.include_sub_folders { " (recursive)" } else { "" }
        );
    }
    println!("Syncs: {}", cfg.syncs.len());
    for definition in &cfg.syncs {
        println!(
            "  {} -> {}{}{}",
            definition.source_directory,
            definition.destination_directory,
            if definition.include_sub_folders { " (recursive)" } else { "" },
            if definition.delete_assets_not_in_source { " (delete extra)" } else { "" }
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move_command() {
        let cli = Cli::try_parse_from(["photocat", "move", "/p/a.jpg", "/q", "--copy"]).unwrap();
        match cli.command {
            Commands::Move {
                file,
                destination,
                copy,
            } => {
                assert_eq!(file, PathBuf::from("/p/a.jpg"));
                assert_eq!(destination, "/q");
                assert!(copy);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_config_flag() {
        let cli =
            Cli::try_parse_from(["photocat", "duplicates", "--delete-extra", "-c", "/x.yaml"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/x.yaml")));
        assert!(matches!(
            cli.command,
            Commands::Duplicates { delete_extra: true }
        ));
    }
}
