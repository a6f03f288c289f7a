// orientpress/src/processors/resizer.rs
use crate::core::{Orientation, ResizeAlgorithm, ResizeTarget};
use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Bounds the long side: width for landscape, height for portrait.
pub fn compute_target(orientation: Orientation, max_long_side: u32) -> ResizeTarget {
    match orientation {
        Orientation::Landscape => ResizeTarget::Width(max_long_side),
        Orientation::Portrait => ResizeTarget::Height(max_long_side),
    }
}

pub struct Resizer {
    algorithm: ResizeAlgorithm,
}

impl Resizer {
    pub fn new(algorithm: ResizeAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn resize(&self, image: &DynamicImage, target: ResizeTarget) -> DynamicImage {
        let (width, height) = calculate_dimensions(image.dimensions(), target);

        if (width, height) == image.dimensions() {
            log::debug!("Image dimensions unchanged, skipping resize");
            return image.clone();
        }

        log::debug!(
            "Resizing image from {}x{} to {}x{}",
            image.width(),
            image.height(),
            width,
            height
        );

        image.resize_exact(width, height, self.get_filter_type())
    }

    fn get_filter_type(&self) -> FilterType {
        match self.algorithm {
            ResizeAlgorithm::Nearest => FilterType::Nearest,
            ResizeAlgorithm::Bilinear => FilterType::Triangle,
            ResizeAlgorithm::Bicubic => FilterType::CatmullRom,
            ResizeAlgorithm::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Scales the bounded axis to the target and the other proportionally.
/// A zero bound or a zero-sized source leaves the dimensions untouched.
pub fn calculate_dimensions((orig_width, orig_height): (u32, u32), target: ResizeTarget) -> (u32, u32) {
    if orig_width == 0 || orig_height == 0 {
        return (orig_width, orig_height);
    }

    match target {
        ResizeTarget::Width(width) => {
            if width == 0 || width == orig_width {
                return (orig_width, orig_height);
            }
            let ratio = width as f64 / orig_width as f64;
            let height = (orig_height as f64 * ratio).round() as u32;
            (width, height.max(1))
        }
        ResizeTarget::Height(height) => {
            if height == 0 || height == orig_height {
                return (orig_width, orig_height);
            }
            let ratio = height as f64 / orig_height as f64;
            let width = (orig_width as f64 * ratio).round() as u32;
            (width.max(1), height)
        }
    }
}
