// orientpress/src/processors/mod.rs
mod batch;
mod classifier;
mod compressor;
mod filter;
mod loader;
mod metadata;
mod resizer;

pub use batch::{create_progress_bar, BatchCompressor};
pub use classifier::{OrientationClassifier, OrientationGroups};
pub use compressor::{Encoder, TargetSizeEncoder, DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY};
pub use filter::list_image_paths;
pub use loader::{DimensionReader, HeaderReader};
pub use metadata::MetadataProcessor;
pub use resizer::{calculate_dimensions, compute_target, Resizer};

