// orientpress/src/processors/classifier.rs
use super::loader::DimensionReader;
use crate::core::{ConversionResult, FailureStage, Orientation, Result};
use std::path::{Path, PathBuf};

pub struct OrientationClassifier<'a> {
    reader: &'a dyn DimensionReader,
}

/// Disjoint orientation buckets plus the candidates that could not be read.
#[derive(Debug, Default)]
pub struct OrientationGroups {
    pub landscape: Vec<PathBuf>,
    pub portrait: Vec<PathBuf>,
    pub failures: Vec<ConversionResult>,
}

impl<'a> OrientationClassifier<'a> {
    pub fn new(reader: &'a dyn DimensionReader) -> Self {
        Self { reader }
    }

    pub fn classify(&self, path: &Path) -> Result<Orientation> {
        let (width, height) = self.reader.read_dimensions(path)?;
        Ok(Orientation::from_dimensions(width, height))
    }

    /// Preserves input order within each group.
    pub fn partition(&self, paths: Vec<PathBuf>) -> OrientationGroups {
        let mut groups = OrientationGroups::default();

        for path in paths {
            match self.classify(&path) {
                Ok(Orientation::Landscape) => groups.landscape.push(path),
                Ok(Orientation::Portrait) => groups.portrait.push(path),
                Err(e) => {
                    log::warn!("Skipping {}: {}", path.display(), e);
                    groups.failures.push(ConversionResult::failed(&path, FailureStage::Decode, &e));
                }
            }
        }

        groups
    }
}
