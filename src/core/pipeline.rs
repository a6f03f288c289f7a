// orientpress/src/core/pipeline.rs
use super::{ConversionReport, ConversionResult, ConvertConfig, Orientation, Result};
use crate::processors::{
    compute_target, create_progress_bar, list_image_paths, BatchCompressor, DimensionReader,
    Encoder, HeaderReader, OrientationClassifier, TargetSizeEncoder,
};
use crate::utils::destination_file_name;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use std::collections::HashMap;
use std::path::PathBuf;

/// Scan, classify, compress both orientation groups concurrently, merge.
///
/// A pipeline runs once; `run` consumes it.
pub struct Pipeline {
    config: ConvertConfig,
    reader: Box<dyn DimensionReader>,
    encoder: Box<dyn Encoder>,
}

impl Pipeline {
    /// Pipeline backed by the real header reader and target-size encoder.
    pub fn new(config: ConvertConfig) -> Self {
        let encoder = TargetSizeEncoder::new(config.algorithm);
        Self::with_backends(config, Box::new(HeaderReader::new()), Box::new(encoder))
    }

    pub fn with_backends(
        config: ConvertConfig,
        reader: Box<dyn DimensionReader>,
        encoder: Box<dyn Encoder>,
    ) -> Self {
        Self {
            config,
            reader,
            encoder,
        }
    }

    pub fn run(self) -> Result<ConversionReport> {
        self.config.validate()?;

        let paths = list_image_paths(&self.config.input)?;
        if paths.is_empty() {
            log::warn!("No image files found in {}", self.config.input.display());
            return Ok(ConversionReport::default());
        }

        log::info!(
            "Processing {} images from {}",
            paths.len(),
            self.config.input.display()
        );

        let groups = OrientationClassifier::new(self.reader.as_ref()).partition(paths);
        log::info!(
            "Classified {} landscape, {} portrait, {} unreadable",
            groups.landscape.len(),
            groups.portrait.len(),
            groups.failures.len()
        );
        self.warn_on_name_collisions(&groups.landscape, &groups.portrait);

        let progress = self.multi_progress();
        let landscape_bar = progress.add(create_progress_bar(Orientation::Landscape));
        let portrait_bar = progress.add(create_progress_bar(Orientation::Portrait));

        let (landscape, portrait) = rayon::join(
            || self.compress_group(Orientation::Landscape, &groups.landscape, &landscape_bar),
            || self.compress_group(Orientation::Portrait, &groups.portrait, &portrait_bar),
        );

        let mut results = groups.failures;
        results.extend(landscape);
        results.extend(portrait);

        for result in &results {
            match result.destination() {
                Some(destination) => log::debug!("done: {}", destination.display()),
                None => log::debug!("failed: {}", result.source().display()),
            }
        }

        Ok(ConversionReport { results })
    }

    fn compress_group(
        &self,
        orientation: Orientation,
        paths: &[PathBuf],
        progress: &ProgressBar,
    ) -> Vec<ConversionResult> {
        let target = compute_target(orientation, self.config.max_length);
        BatchCompressor::new(self.encoder.as_ref(), self.config.format)
            .with_metadata(self.config.preserve_metadata)
            .compress(
                orientation,
                paths,
                &self.config.output,
                target,
                self.config.target_size,
                progress,
            )
    }

    fn multi_progress(&self) -> MultiProgress {
        if self.config.show_progress {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        }
    }

    fn warn_on_name_collisions(&self, landscape: &[PathBuf], portrait: &[PathBuf]) {
        let mut seen: HashMap<String, &PathBuf> = HashMap::new();
        for path in landscape.iter().chain(portrait) {
            let Some(name) = destination_file_name(path, self.config.format) else {
                continue;
            };
            if let Some(previous) = seen.insert(name.clone(), path) {
                log::warn!(
                    "{} and {} both write {}; only one result will remain",
                    previous.display(),
                    path.display(),
                    name
                );
            }
        }
    }
}
