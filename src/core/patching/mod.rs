mod acquisition;
mod builder;

pub use acquisition::{read_pixel_size, Acquisition, PIXEL_SIZE_FILE};
pub use builder::{
    build_acquisition_patches, raw_img_to_patches, AcquisitionReport, PatchBuildParams,
    PatchBuildSummary,
};
