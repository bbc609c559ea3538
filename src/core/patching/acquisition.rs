use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::{BuildError, BuildResult};
use crate::core::operations::list_files;

/// File declaring the acquisition's pixel size in micrometers
pub const PIXEL_SIZE_FILE: &str = "pixel_size_in_micrometer.txt";

/// The inputs found in one raw acquisition folder
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub name: String,
    pub pixel_size: f64,
    pub image_path: PathBuf,
    pub mask_path: PathBuf,
}

impl Acquisition {
    /// Inspect `dir` and locate its pixel size, image and mask.
    ///
    /// The image is the file whose name contains `image`; the mask is the
    /// file whose name contains `mask.png`. Exactly one of each is required.
    pub fn locate(dir: &Path) -> BuildResult<Self> {
        let pixel_size = read_pixel_size(dir)?;

        let mut image_path: Option<PathBuf> = None;
        let mut mask_path: Option<PathBuf> = None;

        for path in list_files(dir)? {
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };

            let slot = if name.contains("image") {
                &mut image_path
            } else if name.contains("mask.png") {
                &mut mask_path
            } else {
                continue;
            };

            if let Some(first) = slot.as_ref() {
                return Err(BuildError::AmbiguousInput {
                    acquisition: dir.to_path_buf(),
                    first: first.clone(),
                    second: path,
                });
            }
            debug!("Found input {:?}", path);
            *slot = Some(path);
        }

        let image_path = image_path.ok_or_else(|| BuildError::MissingImage {
            acquisition: dir.to_path_buf(),
        })?;
        let mask_path = mask_path.ok_or_else(|| BuildError::MissingMask {
            acquisition: dir.to_path_buf(),
        })?;

        Ok(Self {
            name: dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            pixel_size,
            image_path,
            mask_path,
        })
    }

    /// Uniform scale factor bringing this acquisition to `target_resolution`
    pub fn resample_coeff(&self, target_resolution: f64) -> f64 {
        self.pixel_size / target_resolution
    }
}

/// Read the single floating-point value of the pixel size file.
pub fn read_pixel_size(dir: &Path) -> BuildResult<f64> {
    let path = dir.join(PIXEL_SIZE_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(BuildError::MissingPixelSize {
                acquisition: dir.to_path_buf(),
            });
        }
        Err(e) => return Err(BuildError::io(&path, e)),
    };

    let value = content.trim();
    match value.parse::<f64>() {
        Ok(size) if size.is_finite() && size > 0.0 => Ok(size),
        _ => Err(BuildError::InvalidPixelSize {
            path,
            value: value.to_string(),
        }),
    }
}
