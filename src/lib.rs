//! Build patch-based segmentation datasets from raw microscopy acquisitions.
//!
//! Two stages:
//! - [`crate::core::raw_img_to_patches`] resamples every acquisition to a common
//!   pixel size, labels its mask and tiles both into numbered patch files.
//! - [`crate::core::patched_to_dataset`] flattens the patch folders into one
//!   contiguously numbered dataset, optionally balancing SEM and TEM data by
//!   seeded oversampling.

pub mod config;
pub mod core;
pub mod logging;
