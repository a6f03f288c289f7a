// orientpress/src/processors/compressor.rs
use super::loader;
use super::metadata::MetadataProcessor;
use super::resizer::Resizer;
use crate::core::{CompressionJob, ConvertError, OutputFormat, ResizeAlgorithm, Result};
use crate::utils::destination_path;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use std::path::{Path, PathBuf};

pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 95;

/// Resizes and encodes one source image into its destination directory.
pub trait Encoder: Sync {
    fn encode(&self, job: &CompressionJob) -> Result<PathBuf>;
}

/// Production encoder: lossy quality is searched so the finished file,
/// EXIF included, fits the byte-size hint.
pub struct TargetSizeEncoder {
    resizer: Resizer,
    metadata: MetadataProcessor,
}

impl TargetSizeEncoder {
    pub fn new(algorithm: ResizeAlgorithm) -> Self {
        Self {
            resizer: Resizer::new(algorithm),
            metadata: MetadataProcessor::new(),
        }
    }

    /// Encodes without metadata; `target_size` is the budget for the pixel stream.
    pub fn compress_to_bytes(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        target_size: u64,
        path: &Path,
    ) -> Result<Vec<u8>> {
        let rgb = image.to_rgb8();
        let (bytes, quality) = match format {
            OutputFormat::Jpeg => fit_quality(target_size, path, |q| encode_jpeg(&rgb, q, path))?,
            OutputFormat::WebP => fit_quality(target_size, path, |q| encode_webp(&rgb, q, path))?,
        };

        log::debug!(
            "Encoded {} as {:?} at quality {} ({} bytes, budget {})",
            path.display(),
            format,
            quality,
            bytes.len(),
            target_size
        );
        Ok(bytes)
    }
}

impl Default for TargetSizeEncoder {
    fn default() -> Self {
        Self::new(ResizeAlgorithm::default())
    }
}

impl Encoder for TargetSizeEncoder {
    fn encode(&self, job: &CompressionJob) -> Result<PathBuf> {
        let source = job.source.as_path();
        let destination = destination_path(source, &job.destination_dir, job.format)
            .ok_or_else(|| ConvertError::encode(source, "source has no usable file name"))?;

        let image = loader::load(source)?;
        let image = self.resizer.resize(&image, job.resize);

        let exif = if job.preserve_metadata {
            self.metadata.read_exif_block(source)?
        } else {
            None
        };
        let overhead = exif.as_ref().map_or(0, |block| match job.format {
            OutputFormat::Jpeg => MetadataProcessor::jpeg_overhead(block.len()),
            OutputFormat::WebP => MetadataProcessor::webp_overhead(block.len()),
        });
        let budget = pixel_budget(job.target_size, overhead as u64);

        let mut bytes = self.compress_to_bytes(&image, job.format, budget, source)?;
        if let Some(exif) = &exif {
            bytes = match job.format {
                OutputFormat::Jpeg => self.metadata.embed_exif_jpeg(&bytes, exif, source)?,
                OutputFormat::WebP => {
                    let size = (image.width(), image.height());
                    self.metadata.embed_exif_webp(&bytes, exif, size, source)?
                }
            };
        }

        std::fs::create_dir_all(&job.destination_dir)
            .map_err(|e| ConvertError::encode(source, format!("cannot create output directory: {}", e)))?;
        std::fs::write(&destination, &bytes)
            .map_err(|e| ConvertError::encode(source, format!("cannot write {}: {}", destination.display(), e)))?;

        log::info!("Saved image: {} ({} bytes)", destination.display(), bytes.len());
        Ok(destination)
    }
}

/// Target left for the pixel stream once metadata is accounted for.
/// Stays non-zero so a tiny target still means "as small as possible".
fn pixel_budget(target_size: u64, overhead: u64) -> u64 {
    if target_size == 0 {
        return 0;
    }
    target_size.saturating_sub(overhead).max(1)
}

fn encode_jpeg(image: &RgbImage, quality: u8, path: &Path) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    image
        .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
        .map_err(|e| ConvertError::encode(path, e.to_string()))?;
    Ok(buf)
}

fn encode_webp(image: &RgbImage, quality: u8, path: &Path) -> Result<Vec<u8>> {
    webp::Encoder::from_rgb(image.as_raw(), image.width(), image.height())
        .encode_simple(false, f32::from(quality))
        .map(|memory| memory.to_vec())
        .map_err(|e| ConvertError::encode(path, format!("WebP encoding failed: {:?}", e)))
}

/// Highest quality whose output fits `target_size`, or the lowest quality
/// when nothing fits. A zero target skips the search.
fn fit_quality<F>(target_size: u64, path: &Path, encode: F) -> Result<(Vec<u8>, u8)>
where
    F: Fn(u8) -> Result<Vec<u8>>,
{
    if target_size == 0 {
        return encode(DEFAULT_QUALITY).map(|b| (b, DEFAULT_QUALITY));
    }

    let mut best: Option<(Vec<u8>, u8)> = None;
    let (mut low, mut high) = (MIN_QUALITY, MAX_QUALITY);

    while low <= high {
        let quality = low + (high - low) / 2;
        let bytes = encode(quality)?;

        if bytes.len() as u64 <= target_size {
            best = Some((bytes, quality));
            low = quality + 1;
        } else if quality == MIN_QUALITY {
            break;
        } else {
            high = quality - 1;
        }
    }

    match best {
        Some(found) => Ok(found),
        None => {
            log::debug!("{} cannot reach {} bytes, using minimum quality", path.display(), target_size);
            encode(MIN_QUALITY).map(|b| (b, MIN_QUALITY))
        }
    }
}
