mod cli;
mod core;
mod processors;
mod utils;

pub use crate::cli::{Algorithm, Cli, Format};
pub use crate::core::{
    clamp_non_negative, is_valid_path, CompressionJob, ConfigError, ConversionReport,
    ConversionResult, ConvertConfig, ConvertError, FailureStage, Orientation, OutputFormat,
    Pipeline, ProcessingStats, ResizeAlgorithm, ResizeTarget, Result, DEFAULT_MAX_LENGTH,
    DEFAULT_TARGET_SIZE,
};
pub use crate::processors::{
    calculate_dimensions, compute_target, list_image_paths, BatchCompressor, DimensionReader,
    Encoder, HeaderReader, MetadataProcessor, OrientationClassifier, OrientationGroups, Resizer,
    TargetSizeEncoder, DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY,
};
pub use crate::utils::{
    calculate_savings, destination_file_name, destination_path, format_file_size,
    is_supported_format, SUPPORTED_EXTENSIONS,
};

pub mod prelude {
    pub use crate::{
        ConversionReport, ConversionResult, ConvertConfig, DimensionReader, Encoder,
        Orientation, OutputFormat, Pipeline, ResizeTarget,
    };
}
