// orientpress/src/core/mod.rs
pub mod pipeline;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use pipeline::Pipeline;

pub const DEFAULT_TARGET_SIZE: u64 = 150_000;
pub const DEFAULT_MAX_LENGTH: u32 = 1600;

/// Characters rejected in the output path.
pub const FORBIDDEN_PATH_CHARS: [char; 7] = ['<', '>', ':', '"', '|', '?', '*'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeAlgorithm {
    Nearest,
    Bilinear,
    Bicubic,
    #[default]
    Lanczos3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Jpeg,
    #[default]
    WebP,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::WebP => "webp",
        }
    }
}

/// Immutable settings for one conversion run.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Encoder hint in bytes, 0 disables size targeting.
    pub target_size: u64,
    /// Bound for the long side in pixels, 0 disables resizing.
    pub max_length: u32,
    pub format: OutputFormat,
    pub algorithm: ResizeAlgorithm,
    pub show_progress: bool,
    /// Carry the source EXIF tags into each output file.
    pub preserve_metadata: bool,
}

impl ConvertConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            target_size: DEFAULT_TARGET_SIZE,
            max_length: DEFAULT_MAX_LENGTH,
            format: OutputFormat::default(),
            algorithm: ResizeAlgorithm::default(),
            show_progress: false,
            preserve_metadata: true,
        }
    }

    pub fn with_target_size(mut self, target_size: u64) -> Self {
        self.target_size = target_size;
        self
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_algorithm(mut self, algorithm: ResizeAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_metadata(mut self, preserve_metadata: bool) -> Self {
        self.preserve_metadata = preserve_metadata;
        self
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.input.exists() {
            return Err(ConfigError::MissingInput(self.input.clone()));
        }

        if !self.input.is_dir() {
            return Err(ConfigError::InputNotDirectory(self.input.clone()));
        }

        if !is_valid_path(&self.output) {
            return Err(ConfigError::InvalidPath(self.output.clone()));
        }

        if self.output.exists() && !self.output.is_dir() {
            return Err(ConfigError::OutputNotDirectory(self.output.clone()));
        }

        if self.input == self.output {
            return Err(ConfigError::SameDirectory);
        }

        Ok(())
    }
}

pub fn is_valid_path(path: &Path) -> bool {
    !path.to_string_lossy().contains(&FORBIDDEN_PATH_CHARS[..])
}

/// Clamps a signed integer argument into the unsigned range; negatives become 0.
pub fn clamp_non_negative(value: i64) -> u64 {
    value.max(0) as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Strictly wider images are landscape; square images are portrait.
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Exactly one bounded axis; the other scales with the aspect ratio.
/// A bound of 0 leaves the image at its original size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeTarget {
    Width(u32),
    Height(u32),
}

impl ResizeTarget {
    /// `(width, height)` with 0 standing for the unconstrained axis.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            ResizeTarget::Width(w) => (w, 0),
            ResizeTarget::Height(h) => (0, h),
        }
    }

    pub fn bound(self) -> u32 {
        match self {
            ResizeTarget::Width(v) | ResizeTarget::Height(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressionJob {
    pub source: PathBuf,
    pub destination_dir: PathBuf,
    pub resize: ResizeTarget,
    pub target_size: u64,
    pub preserve_metadata: bool,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Decode,
    Encode,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureStage::Decode => f.write_str("decode"),
            FailureStage::Encode => f.write_str("encode"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionResult {
    Converted {
        source: PathBuf,
        destination: PathBuf,
        orientation: Orientation,
    },
    Failed {
        source: PathBuf,
        stage: FailureStage,
        reason: String,
    },
}

impl ConversionResult {
    /// Failure record for `source`; `stage` is where in the run it failed,
    /// whatever kind of error the collaborator returned.
    pub fn failed(source: &Path, stage: FailureStage, err: &ConvertError) -> Self {
        ConversionResult::Failed {
            source: source.to_path_buf(),
            stage,
            reason: err.to_string(),
        }
    }

    pub fn source(&self) -> &Path {
        match self {
            ConversionResult::Converted { source, .. } | ConversionResult::Failed { source, .. } => {
                source
            }
        }
    }

    pub fn destination(&self) -> Option<&Path> {
        match self {
            ConversionResult::Converted { destination, .. } => Some(destination),
            ConversionResult::Failed { .. } => None,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionResult::Converted { .. })
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProcessingStats {
    pub converted_count: usize,
    pub failed_count: usize,
    pub total_size_before: u64,
    pub total_size_after: u64,
}

impl ProcessingStats {
    pub fn savings_percent(&self) -> f64 {
        crate::utils::calculate_savings(self.total_size_before, self.total_size_after)
    }
}

/// Merged outcome of a run. Order across orientation groups is unspecified.
#[derive(Debug, Default, Clone)]
pub struct ConversionReport {
    pub results: Vec<ConversionResult>,
}

impl ConversionReport {
    pub fn converted(&self) -> impl Iterator<Item = &ConversionResult> {
        self.results.iter().filter(|r| r.is_converted())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ConversionResult> {
        self.results.iter().filter(|r| !r.is_converted())
    }

    pub fn is_success(&self) -> bool {
        self.results.iter().all(ConversionResult::is_converted)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn stats(&self) -> ProcessingStats {
        let mut stats = ProcessingStats::default();
        for result in &self.results {
            match result {
                ConversionResult::Converted {
                    source,
                    destination,
                    ..
                } => {
                    stats.converted_count += 1;
                    stats.total_size_before += file_len(source);
                    stats.total_size_after += file_len(destination);
                }
                ConversionResult::Failed { .. } => stats.failed_count += 1,
            }
        }
        stats
    }
}

fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Not an existing path: {0}")]
    MissingInput(PathBuf),

    #[error("Input path is not a directory: {0}")]
    InputNotDirectory(PathBuf),

    #[error("Not a valid path: {0}")]
    InvalidPath(PathBuf),

    #[error("Output path exists but is not a directory: {0}")]
    OutputNotDirectory(PathBuf),

    #[error("Input and output directories cannot be the same")]
    SameDirectory,

    #[error("Not a number: {0}")]
    NotANumber(String),
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory scan failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode {path}: {reason}")]
    Encode { path: PathBuf, reason: String },
}

impl ConvertError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn encode(path: &Path, reason: impl Into<String>) -> Self {
        ConvertError::Encode {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Errors that stop the whole run rather than a single image.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ConvertError::Config(_) | ConvertError::Io { .. } | ConvertError::Walk(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_tie_break_is_portrait() {
        assert_eq!(Orientation::from_dimensions(2000, 1000), Orientation::Landscape);
        assert_eq!(Orientation::from_dimensions(500, 900), Orientation::Portrait);
        assert_eq!(Orientation::from_dimensions(800, 800), Orientation::Portrait);
        assert_eq!(Orientation::from_dimensions(801, 800), Orientation::Landscape);
    }

    #[test]
    fn resize_target_has_one_bounded_axis() {
        assert_eq!(ResizeTarget::Width(1600).dimensions(), (1600, 0));
        assert_eq!(ResizeTarget::Height(1600).dimensions(), (0, 1600));
        assert_eq!(ResizeTarget::Height(1200).bound(), 1200);
    }

    #[test]
    fn path_validation_rejects_reserved_characters() {
        assert!(is_valid_path(Path::new("out/dir")));
        for bad in ["a<b", "a>b", "c:d", "q\"", "p|q", "what?", "star*"] {
            assert!(!is_valid_path(Path::new(bad)), "{bad} should be rejected");
        }
    }

    #[test]
    fn negative_numbers_clamp_to_zero() {
        assert_eq!(clamp_non_negative(-5), 0);
        assert_eq!(clamp_non_negative(0), 0);
        assert_eq!(clamp_non_negative(1600), 1600);
    }

    #[test]
    fn validate_rejects_missing_input() {
        let config = ConvertConfig::new("/definitely/not/here", "out");
        assert!(matches!(config.validate(), Err(ConfigError::MissingInput(_))));
    }

    #[test]
    fn validate_rejects_file_as_input() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = ConvertConfig::new(file.path(), "out");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InputNotDirectory(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_output_and_same_dir() {
        let dir = tempfile::tempdir().unwrap();
        let bad = ConvertConfig::new(dir.path(), "out?");
        assert!(matches!(bad.validate(), Err(ConfigError::InvalidPath(_))));

        let same = ConvertConfig::new(dir.path(), dir.path());
        assert!(matches!(same.validate(), Err(ConfigError::SameDirectory)));

        let ok = ConvertConfig::new(dir.path(), dir.path().join("out"));
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn report_partitions_successes_and_failures() {
        let report = ConversionReport {
            results: vec![
                ConversionResult::Converted {
                    source: PathBuf::from("/in/a.jpg"),
                    destination: PathBuf::from("/out/a.jpg"),
                    orientation: Orientation::Landscape,
                },
                ConversionResult::Failed {
                    source: PathBuf::from("/in/b.jpg"),
                    stage: FailureStage::Decode,
                    reason: "truncated".to_string(),
                },
            ],
        };
        assert_eq!(report.converted().count(), 1);
        assert_eq!(report.failed().count(), 1);
        assert!(!report.is_success());

        let stats = report.stats();
        assert_eq!(stats.converted_count, 1);
        assert_eq!(stats.failed_count, 1);
    }

    #[test]
    fn fatal_errors_are_run_level_only() {
        let io = ConvertError::io(Path::new("/x"), std::io::Error::other("denied"));
        assert!(io.is_fatal());
        assert!(!ConvertError::encode(Path::new("/x.jpg"), "codec").is_fatal());
    }
}
