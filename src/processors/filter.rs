// orientpress/src/processors/filter.rs
use crate::core::{ConvertError, Result};
use crate::utils::is_supported_format;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists the immediate entries of `directory` whose file name ends in an
/// allow-listed extension, as absolute paths sorted by file name.
pub fn list_image_paths(directory: &Path) -> Result<Vec<PathBuf>> {
    let root = std::fs::canonicalize(directory).map_err(|e| ConvertError::io(directory, e))?;

    if !root.is_dir() {
        return Err(ConvertError::io(
            directory,
            std::io::Error::other("not a directory"),
        ));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(&root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file() && is_supported_format(entry.path()) {
            paths.push(entry.into_path());
        }
    }

    log::debug!("Found {} candidate images in {}", paths.len(), root.display());
    Ok(paths)
}
