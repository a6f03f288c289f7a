// orientpress/src/processors/batch.rs
use super::compressor::Encoder;
use crate::core::{
    CompressionJob, ConversionResult, FailureStage, Orientation, OutputFormat, ResizeTarget,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Encodes one orientation group. Holds no state between calls; a failed
/// job becomes a `Failed` record and its siblings carry on.
pub struct BatchCompressor<'a> {
    encoder: &'a dyn Encoder,
    format: OutputFormat,
    preserve_metadata: bool,
}

impl<'a> BatchCompressor<'a> {
    pub fn new(encoder: &'a dyn Encoder, format: OutputFormat) -> Self {
        Self {
            encoder,
            format,
            preserve_metadata: true,
        }
    }

    pub fn with_metadata(mut self, preserve: bool) -> Self {
        self.preserve_metadata = preserve;
        self
    }

    pub fn compress(
        &self,
        orientation: Orientation,
        paths: &[PathBuf],
        destination_dir: &Path,
        resize: ResizeTarget,
        target_size: u64,
        progress: &ProgressBar,
    ) -> Vec<ConversionResult> {
        if paths.is_empty() {
            progress.finish_and_clear();
            return Vec::new();
        }

        log::info!(
            "Compressing {} {} images (bound {} px)",
            paths.len(),
            orientation,
            resize.bound()
        );
        progress.set_length(paths.len() as u64);

        let results = paths
            .iter()
            .map(|source| {
                let job = CompressionJob {
                    source: source.clone(),
                    destination_dir: destination_dir.to_path_buf(),
                    resize,
                    target_size,
                    preserve_metadata: self.preserve_metadata,
                    format: self.format,
                };
                let result = match self.encoder.encode(&job) {
                    Ok(destination) => ConversionResult::Converted {
                        source: job.source,
                        destination,
                        orientation,
                    },
                    Err(e) => {
                        log::warn!("Failed to convert {}: {}", source.display(), e);
                        ConversionResult::failed(source, FailureStage::Encode, &e)
                    }
                };
                progress.inc(1);
                result
            })
            .collect();

        progress.finish_with_message("done");
        results
    }
}

pub fn create_progress_bar(orientation: Orientation) -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{prefix:>10} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_prefix(orientation.label());
    pb
}
