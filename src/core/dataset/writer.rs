use std::path::{Path, PathBuf};

use image::GrayImage;

use crate::core::error::{BuildError, BuildResult};
use crate::core::operations::{ensure_dir, list_files, save_gray};

use super::naming::{PatchKind, PatchName};

/// Writes image/mask pairs into a flat dataset folder under consecutive
/// indices starting at 0.
///
/// The writer owns the running output index, so every pass that adds to a
/// dataset continues exactly where the previous one stopped.
#[derive(Debug)]
pub struct DatasetWriter {
    root: PathBuf,
    next_index: u64,
}

impl DatasetWriter {
    /// Open `root` for writing, creating it if needed.
    ///
    /// A folder that already holds `image_<n>`/`mask_<n>` tiles is refused:
    /// stale tiles past the new run's last index would otherwise stay behind.
    /// Other files are left alone.
    pub fn create(root: &Path) -> BuildResult<Self> {
        ensure_dir(root)?;
        if let Some(existing) = list_files(root)?
            .into_iter()
            .find(|path| PatchName::parse(path).is_ok())
        {
            return Err(BuildError::DatasetNotEmpty {
                path: root.to_path_buf(),
                existing,
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
            next_index: 0,
        })
    }

    /// Write one pair and return the index it was stored under.
    pub fn write_pair(&mut self, image: &GrayImage, mask: &GrayImage) -> BuildResult<u64> {
        let index = self.next_index;
        save_gray(image, &self.path_for(PatchKind::Image, index))?;
        save_gray(mask, &self.path_for(PatchKind::Mask, index))?;
        self.next_index += 1;
        Ok(index)
    }

    /// Number of pairs written so far, which is also the next index
    pub fn written(&self) -> u64 {
        self.next_index
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, kind: PatchKind, index: u64) -> PathBuf {
        self.root.join(PatchName::new(kind, index).file_name())
    }
}
