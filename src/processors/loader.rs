// orientpress/src/processors/loader.rs
use crate::core::{ConvertError, Result};
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Reads pixel dimensions of an image file.
pub trait DimensionReader: Sync {
    fn read_dimensions(&self, path: &Path) -> Result<(u32, u32)>;
}

/// Header-only dimension reader; pixel data is never decoded.
#[derive(Debug, Clone, Default)]
pub struct HeaderReader;

impl HeaderReader {
    pub fn new() -> Self {
        Self
    }
}

impl DimensionReader for HeaderReader {
    fn read_dimensions(&self, path: &Path) -> Result<(u32, u32)> {
        let reader = open_guessed(path)?;
        let dimensions = reader.into_dimensions().map_err(|source| ConvertError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!(
            "Read dimensions {}x{} from {}",
            dimensions.0,
            dimensions.1,
            path.display()
        );
        Ok(dimensions)
    }
}

/// Fully decodes an image for re-encoding.
pub fn load(path: &Path) -> Result<DynamicImage> {
    log::debug!("Loading image from: {}", path.display());

    open_guessed(path)?.decode().map_err(|source| ConvertError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn open_guessed(path: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>> {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| ConvertError::Decode {
            path: path.to_path_buf(),
            source: image::ImageError::IoError(e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_dimensions_from_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        image::RgbImage::new(40, 20).save(&path).unwrap();

        assert_eq!(HeaderReader::new().read_dimensions(&path).unwrap(), (40, 20));
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"\xFF\xD8\xFF not really a jpeg").unwrap();

        let err = HeaderReader::new().read_dimensions(&path).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { .. }));
        assert!(!err.is_fatal());
    }
}
