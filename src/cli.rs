// orientpress/src/cli.rs
use crate::core::{clamp_non_negative, is_valid_path, ConfigError, ConvertConfig, OutputFormat, ResizeAlgorithm};
use crate::core::{DEFAULT_MAX_LENGTH, DEFAULT_TARGET_SIZE};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "orientpress")]
#[command(about = "Resize and compress a directory of images, bounding the long side by orientation")]
#[command(version, allow_negative_numbers = true)]
pub struct Cli {
    /// Input directory path
    #[arg(short, long, value_parser = parse_existing_path)]
    pub input: PathBuf,

    /// Output directory path
    #[arg(short, long, value_parser = parse_path)]
    pub output: PathBuf,

    /// Target file size [Byte]
    #[arg(short, long = "target-size", alias = "targetSize", default_value_t = DEFAULT_TARGET_SIZE, value_parser = parse_clamped_int)]
    pub target_size: u64,

    /// Max length [px] of the long side
    #[arg(short, long = "max-length", alias = "maxLength", default_value_t = DEFAULT_MAX_LENGTH, value_parser = parse_clamped_length)]
    pub max_length: u32,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Webp)]
    pub format: Format,

    /// Resize algorithm
    #[arg(short, long, value_enum, default_value_t = Algorithm::Lanczos3)]
    pub algorithm: Algorithm,

    /// Drop EXIF tags instead of copying them into the output
    #[arg(short, long = "strip-metadata")]
    pub strip_metadata: bool,

    /// Hide progress bars
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Jpeg,
    Webp,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Jpeg => OutputFormat::Jpeg,
            Format::Webp => OutputFormat::WebP,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl From<Algorithm> for ResizeAlgorithm {
    fn from(algo: Algorithm) -> Self {
        match algo {
            Algorithm::Nearest => ResizeAlgorithm::Nearest,
            Algorithm::Bilinear => ResizeAlgorithm::Bilinear,
            Algorithm::Bicubic => ResizeAlgorithm::Bicubic,
            Algorithm::Lanczos3 => ResizeAlgorithm::Lanczos3,
        }
    }
}

impl Cli {
    pub fn to_config(&self) -> ConvertConfig {
        ConvertConfig::new(&self.input, &self.output)
            .with_target_size(self.target_size)
            .with_max_length(self.max_length)
            .with_format(self.format.into())
            .with_algorithm(self.algorithm.into())
            .with_progress(!self.quiet)
            .with_metadata(!self.strip_metadata)
    }
}

fn parse_existing_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.exists() {
        return Err(ConfigError::MissingInput(path).to_string());
    }
    Ok(path)
}

fn parse_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !is_valid_path(&path) {
        return Err(ConfigError::InvalidPath(path).to_string());
    }
    Ok(path)
}

fn parse_clamped_int(value: &str) -> Result<u64, String> {
    value
        .trim()
        .parse::<i64>()
        .map(clamp_non_negative)
        .map_err(|_| ConfigError::NotANumber(value.to_string()).to_string())
}

fn parse_clamped_length(value: &str) -> Result<u32, String> {
    parse_clamped_int(value).map(|v| v.min(u32::MAX as u64) as u32)
}
