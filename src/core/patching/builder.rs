use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, info_span};

use crate::core::dataset::{PatchKind, PatchName};
use crate::core::error::{BuildError, BuildResult};
use crate::core::imaging::{extract_patches, labellize_mask, rescale, round_to_gray, Thresholds};
use crate::core::operations::{ensure_dir, list_subdirs, read_gray, save_gray};

use super::acquisition::Acquisition;

/// Parameters shared by every acquisition of one raw → patches run
#[derive(Debug, Clone)]
pub struct PatchBuildParams {
    pub thresholds: Thresholds,
    pub patch_size: u32,
    /// Target pixel size, same unit as the declared pixel sizes (µm/pixel)
    pub resampling_resolution: f64,
    /// Continue with the next acquisition after a failure instead of stopping
    pub keep_going: bool,
}

impl Default for PatchBuildParams {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            patch_size: 512,
            resampling_resolution: 0.1,
            keep_going: false,
        }
    }
}

impl PatchBuildParams {
    pub fn validate(&self) -> BuildResult<()> {
        if self.patch_size == 0 {
            return Err(BuildError::InvalidParameter(
                "patch size must be greater than zero".to_string(),
            ));
        }
        if !self.resampling_resolution.is_finite() || self.resampling_resolution <= 0.0 {
            return Err(BuildError::InvalidParameter(format!(
                "resampling resolution must be positive, got {}",
                self.resampling_resolution
            )));
        }
        Ok(())
    }
}

/// Patches written for one acquisition
#[derive(Debug, Clone, Serialize)]
pub struct AcquisitionReport {
    pub name: String,
    pub pixel_size: f64,
    pub resample_coeff: f64,
    pub patches: usize,
}

/// Outcome of a raw → patches run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchBuildSummary {
    pub acquisitions: Vec<AcquisitionReport>,
    pub failed: Vec<String>,
    pub total_patches: usize,
}

/// Turn every acquisition folder under `raw_root` into a patch folder of the
/// same name under `patched_root`.
///
/// Acquisitions are processed in name order. Non-directory entries are
/// skipped. The first failing acquisition aborts the run unless
/// `params.keep_going` is set, in which case failures are collected and the
/// run ends with [`BuildError::AcquisitionsFailed`] carrying them; the
/// patches already written stay on disk either way.
pub fn raw_img_to_patches(
    raw_root: &Path,
    patched_root: &Path,
    params: &PatchBuildParams,
) -> BuildResult<PatchBuildSummary> {
    params.validate()?;
    info!(
        "Building patches from {:?} into {:?} (patch size {}, resolution {})",
        raw_root, patched_root, params.patch_size, params.resampling_resolution
    );
    ensure_dir(patched_root)?;

    let mut summary = PatchBuildSummary::default();
    for acquisition_dir in list_subdirs(raw_root)? {
        let name = folder_name(&acquisition_dir);
        let out_dir = patched_root.join(&name);

        match build_acquisition_patches(&acquisition_dir, &out_dir, params) {
            Ok(report) => {
                summary.total_patches += report.patches;
                summary.acquisitions.push(report);
            }
            Err(e) if params.keep_going => {
                error!("Acquisition {} failed: {}", name, e);
                summary.failed.push(name);
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "Wrote {} patches for {} acquisitions",
        summary.total_patches,
        summary.acquisitions.len()
    );
    if !summary.failed.is_empty() {
        return Err(BuildError::AcquisitionsFailed {
            failed: summary.failed,
        });
    }
    Ok(summary)
}

/// Resample, label and tile one acquisition, writing `image_<j>.png` and
/// `mask_<j>.png` into `out_dir`.
pub fn build_acquisition_patches(
    acquisition_dir: &Path,
    out_dir: &Path,
    params: &PatchBuildParams,
) -> BuildResult<AcquisitionReport> {
    let acquisition = Acquisition::locate(acquisition_dir)?;
    let span = info_span!("acquisition", name = %acquisition.name);
    let _enter = span.enter();

    let coeff = acquisition.resample_coeff(params.resampling_resolution);
    debug!(
        "Pixel size {} -> resample coefficient {}",
        acquisition.pixel_size, coeff
    );

    let raw_image = read_gray(&acquisition.image_path)?;
    let raw_mask = read_gray(&acquisition.mask_path)?;

    let image = round_to_gray(&rescale(&raw_image, coeff)?);
    let mask = labellize_mask(&rescale(&raw_mask, coeff)?, &params.thresholds);
    debug!(
        "Resampled {:?} -> {:?}",
        raw_image.dimensions(),
        image.dimensions()
    );

    ensure_dir(out_dir)?;
    let mut written = 0;
    for (j, patch) in extract_patches(&image, &mask, params.patch_size)?.enumerate() {
        let j = j as u64;
        save_gray(&patch.image, &patch_path(out_dir, PatchKind::Image, j))?;
        save_gray(&patch.mask, &patch_path(out_dir, PatchKind::Mask, j))?;
        written += 1;
    }

    info!("Wrote {} patches to {:?}", written, out_dir);
    Ok(AcquisitionReport {
        name: acquisition.name,
        pixel_size: acquisition.pixel_size,
        resample_coeff: coeff,
        patches: written,
    })
}

fn patch_path(dir: &Path, kind: PatchKind, index: u64) -> PathBuf {
    dir.join(PatchName::new(kind, index).file_name())
}

fn folder_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
