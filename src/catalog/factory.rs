//! Builds asset rows and previews from files on disk.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use super::hash::HashCalculator;
use crate::config::CatalogSettings;
use crate::domain::{join_path, Asset, Folder};
use crate::error::{CatalogError, CatalogResult};
use crate::platform::{FileSystem, ImageCodec};

/// Preview dimensions preserving the source aspect ratio.
///
/// Landscape sources get `max_width` and a proportional height; portrait
/// and square sources get `max_height` and a proportional width. The
/// proportional side is truncated.
pub fn thumbnail_size(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (max_width, max_height);
    }

    if width > height {
        let scaled = (max_width as u64 * height as u64 / width as u64) as u32;
        (max_width, scaled.max(1))
    } else {
        let scaled = (max_height as u64 * width as u64 / height as u64) as u32;
        (scaled.max(1), max_height)
    }
}

/// Hashes, measures and thumbnails image files
#[derive(Clone)]
pub struct AssetFactory {
    fs: Arc<dyn FileSystem>,
    codec: Arc<dyn ImageCodec>,
    hasher: HashCalculator,
    max_width: u32,
    max_height: u32,
}

impl AssetFactory {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        codec: Arc<dyn ImageCodec>,
        settings: &CatalogSettings,
    ) -> Self {
        Self {
            fs,
            codec,
            hasher: HashCalculator::new(),
            max_width: settings.thumbnail_max_width,
            max_height: settings.thumbnail_max_height,
        }
    }

    /// Build the asset row and preview bytes for `folder/file_name`
    pub fn create_asset(&self, folder: &Folder, file_name: &str) -> CatalogResult<(Asset, Vec<u8>)> {
        let full_path = join_path(&folder.path, file_name);
        let path = Path::new(&full_path);

        let bytes = self
            .fs
            .read_bytes(path)
            .map_err(|e| CatalogError::io(path, e))?;
        let info = self.fs.file_info(path).map_err(|e| CatalogError::io(path, e))?;

        let (pixel_width, pixel_height) = self.codec.dimensions(&bytes)?;
        let thumbnail = self.render(&bytes, pixel_width, pixel_height)?;

        let asset = Asset {
            folder_id: folder.folder_id,
            file_name: file_name.to_string(),
            file_size: info.size,
            pixel_width,
            pixel_height,
            hash: self.hasher.calculate_hash(&bytes),
            thumbnail_creation_date_time: Utc::now(),
            file_creation_date_time: info.created,
            file_modification_date_time: info.modified,
            folder: Some(folder.clone()),
            image_data: Some(thumbnail.clone()),
        };

        Ok((asset, thumbnail))
    }

    /// Re-render the preview of an already catalogued asset
    pub fn create_thumbnail(&self, asset: &Asset, folder: &Folder) -> CatalogResult<Vec<u8>> {
        let full_path = join_path(&folder.path, &asset.file_name);
        let path = Path::new(&full_path);
        let bytes = self
            .fs
            .read_bytes(path)
            .map_err(|e| CatalogError::io(path, e))?;
        self.render(&bytes, asset.pixel_width, asset.pixel_height)
    }

    fn render(&self, bytes: &[u8], width: u32, height: u32) -> CatalogResult<Vec<u8>> {
        let (thumb_width, thumb_height) =
            thumbnail_size(width, height, self.max_width, self.max_height);
        Ok(self.codec.thumbnail(bytes, thumb_width, thumb_height)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ImageCrateCodec, LocalFileSystem};
    use image::{ImageFormat, Rgb, RgbImage};
    use tempfile::TempDir;

    #[test]
    fn test_landscape_fixes_width() {
        assert_eq!(thumbnail_size(1600, 1200, 200, 150), (200, 150));
        assert_eq!(thumbnail_size(1000, 500, 200, 150), (200, 100));
        // 200 * 720 / 1280 = 112.5, truncated
        assert_eq!(thumbnail_size(1280, 720, 200, 150), (200, 112));
    }

    #[test]
    fn test_portrait_fixes_height() {
        assert_eq!(thumbnail_size(600, 1200, 200, 150), (75, 150));
        assert_eq!(thumbnail_size(1200, 1600, 200, 150), (112, 150));
        // Square takes the portrait branch
        assert_eq!(thumbnail_size(500, 500, 200, 150), (150, 150));
    }

    #[test]
    fn test_extreme_ratio_keeps_one_pixel() {
        assert_eq!(thumbnail_size(10_000, 1, 200, 150), (200, 1));
    }

    #[test]
    fn test_create_asset() {
        let temp = TempDir::new().unwrap();
        RgbImage::from_pixel(400, 200, Rgb([10, 20, 30]))
            .save_with_format(temp.path().join("wide.png"), ImageFormat::Png)
            .unwrap();

        let factory = AssetFactory::new(
            Arc::new(LocalFileSystem),
            Arc::new(ImageCrateCodec::new()),
            &CatalogSettings::default(),
        );
        let folder = Folder::new(&temp.path().to_string_lossy());
        let (asset, thumbnail) = factory.create_asset(&folder, "wide.png").unwrap();

        assert_eq!((asset.pixel_width, asset.pixel_height), (400, 200));
        assert_eq!(asset.hash.len(), 128);
        assert!(asset.file_size > 0);
        assert_eq!(
            ImageCrateCodec::new().dimensions(&thumbnail).unwrap(),
            (200, 100)
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let factory = AssetFactory::new(
            Arc::new(LocalFileSystem),
            Arc::new(ImageCrateCodec::new()),
            &CatalogSettings::default(),
        );
        let folder = Folder::new(&temp.path().to_string_lossy());
        assert!(matches!(
            factory.create_asset(&folder, "nope.png"),
            Err(CatalogError::Io { .. })
        ));
    }
}
