// orientpress/src/utils/mod.rs
use crate::core::OutputFormat;
use std::path::{Path, PathBuf};

/// Input extensions eligible for conversion, lowercase.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "tif", "tiff"];

/// Matches on the whole file name, so a bare `.JPG` counts even though
/// `Path::extension` sees no extension there.
pub fn is_supported_format(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let name = name.to_lowercase();
    SUPPORTED_EXTENSIONS.iter().any(|ext| {
        name.strip_suffix(ext)
            .is_some_and(|rest| rest.ends_with('.'))
    })
}

/// Same stem as the source, extension of the output format.
pub fn destination_file_name(source: &Path, format: OutputFormat) -> Option<String> {
    let stem = source.file_stem()?.to_str()?;
    Some(format!("{}.{}", stem, format.extension()))
}

pub fn destination_path(source: &Path, output_dir: &Path, format: OutputFormat) -> Option<PathBuf> {
    destination_file_name(source, format).map(|name| output_dir.join(name))
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.log10() / base.log10()).floor() as usize).min(UNITS.len() - 1);
    let size = bytes_f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

pub fn calculate_savings(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }

    let savings = (original_size as f64 - compressed_size as f64) / original_size as f64 * 100.0;
    savings.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(is_supported_format(Path::new("/a/photo.JPG")));
        assert!(is_supported_format(Path::new("scan.TiF")));
        assert!(is_supported_format(Path::new("b.png")));
        assert!(!is_supported_format(Path::new("c.txt")));
        assert!(!is_supported_format(Path::new("anim.gif")));
        assert!(!is_supported_format(Path::new("noext")));
        assert!(!is_supported_format(Path::new("jpg")));
        assert!(!is_supported_format(Path::new("notajpg")));
    }

    #[test]
    fn dot_only_names_still_match() {
        assert!(is_supported_format(Path::new("/in/.JPG")));
        assert!(is_supported_format(Path::new(".tiff")));
        assert!(!is_supported_format(Path::new("/in/.hidden")));
    }

    #[test]
    fn destination_keeps_stem_and_swaps_extension() {
        let dest = destination_path(Path::new("/in/a.png"), Path::new("/out"), OutputFormat::Jpeg);
        assert_eq!(dest, Some(PathBuf::from("/out/a.jpg")));

        let name = destination_file_name(Path::new("/in/holiday.photo.tiff"), OutputFormat::WebP);
        assert_eq!(name.as_deref(), Some("holiday.photo.webp"));
    }

    #[test]
    fn file_sizes_are_human_readable() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512.00 B");
        assert_eq!(format_file_size(150_000), "146.48 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn savings_are_bounded() {
        assert_eq!(calculate_savings(0, 10), 0.0);
        assert_eq!(calculate_savings(100, 25), 75.0);
        assert_eq!(calculate_savings(100, 200), 0.0);
    }
}
