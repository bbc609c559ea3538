mod labels;
mod patches;
mod resample;

pub use labels::{labellize_mask, Thresholds};
pub use patches::{extract_patches, tile_origins, Patch, PatchExtractor};
pub use resample::{rescale, rescaled_dimensions, round_to_gray, FloatImage};
