use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::core::error::{BuildError, BuildResult};
use crate::core::operations::count_files_recursive;

/// Sub-folder holding SEM (type A) patch folders in a mixed patch tree
pub const SEM_FOLDER: &str = "SEM";
/// Sub-folder holding TEM (type B) patch folders in a mixed patch tree
pub const TEM_FOLDER: &str = "TEM";

/// Outcome of comparing two modality subtrees by file count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModalitySplit {
    pub minority: PathBuf,
    pub minority_count: usize,
    pub majority: PathBuf,
    pub majority_count: usize,
}

impl ModalitySplit {
    /// Designate minority and majority from known counts.
    ///
    /// `a < b` makes A the minority. Otherwise B is the minority, so equal
    /// counts keep A as the majority.
    pub fn from_counts(a: &Path, a_count: usize, b: &Path, b_count: usize) -> Self {
        if a_count < b_count {
            Self {
                minority: a.to_path_buf(),
                minority_count: a_count,
                majority: b.to_path_buf(),
                majority_count: b_count,
            }
        } else {
            Self {
                minority: b.to_path_buf(),
                minority_count: b_count,
                majority: a.to_path_buf(),
                majority_count: a_count,
            }
        }
    }

    /// Majority files per minority file. Both counts are files (images and
    /// masks together), which leaves the ratio itself unchanged.
    pub fn oversampling_ratio(&self) -> BuildResult<f64> {
        if self.minority_count == 0 {
            return Err(BuildError::ZeroMinority {
                path: self.minority.clone(),
            });
        }
        Ok(self.majority_count as f64 / self.minority_count as f64)
    }
}

/// Count files recursively under both roots and classify them.
///
/// Both roots must exist. An empty root is reported as an error, since a
/// mixed dataset needs countable files on both sides.
pub fn find_minority_type(a: &Path, b: &Path) -> BuildResult<ModalitySplit> {
    let a_count = count_modality(a)?;
    let b_count = count_modality(b)?;

    let split = ModalitySplit::from_counts(a, a_count, b, b_count);
    info!(
        "Minority: {:?} ({} files), majority: {:?} ({} files)",
        split.minority, split.minority_count, split.majority, split.majority_count
    );

    if split.minority_count == 0 {
        return Err(BuildError::EmptyModality {
            path: split.minority,
        });
    }
    Ok(split)
}

fn count_modality(root: &Path) -> BuildResult<usize> {
    if !root.is_dir() {
        return Err(BuildError::MissingModality {
            path: root.to_path_buf(),
        });
    }
    count_files_recursive(root)
}
