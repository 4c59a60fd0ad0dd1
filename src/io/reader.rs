use std::path::Path;

use image::ImageReader;
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::SourceImage;

/// Extensions the directory scan treats as source images.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "tif", "tiff", "gif"];

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Decode a raster file into a `SourceImage` whose id is the file stem.
pub fn open_source(path: &Path) -> Result<SourceImage> {
    let decode_err = |reason: String| Error::Decode {
        path: path.to_path_buf(),
        reason,
    };
    let image = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| decode_err(e.to_string()))?;

    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let source = SourceImage::new(id, image);
    if source.size().is_empty() {
        return Err(Error::EmptySource {
            source_id: source.id().to_string(),
        });
    }
    debug!(
        "Loaded {} ({}, {} channels) from {:?}",
        source.id(),
        source.size(),
        source.channels(),
        path
    );
    Ok(source)
}
