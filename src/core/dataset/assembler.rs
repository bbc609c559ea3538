//! Aggregation of per-acquisition patch folders into one flat dataset.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::GrayImage;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::core::analysis::{
    draw_with_replacement, find_minority_type, oversample_count, ModalitySplit, SEM_FOLDER,
    TEM_FOLDER,
};
use crate::core::error::{BuildError, BuildResult};
use crate::core::operations::{list_files, list_subdirs, read_gray};

use super::naming::{PatchKind, PatchName};
use super::ordering::{pair_sorted, sort_by_index, TilePair};
use super::writer::DatasetWriter;

/// Which kind of dataset to assemble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetType {
    /// One acquisition type, every patch copied once
    #[default]
    Unique,
    /// SEM and TEM subtrees, minority type oversampled
    Mixed,
}

impl DatasetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetType::Unique => "unique",
            DatasetType::Mixed => "mixed",
        }
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetType {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unique" => Ok(DatasetType::Unique),
            "mixed" => Ok(DatasetType::Mixed),
            other => Err(BuildError::InvalidParameter(format!(
                "unknown dataset type {:?} (expected unique or mixed)",
                other
            ))),
        }
    }
}

/// Assembly mode with everything the mode needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyMode {
    Unique,
    Mixed { seed: u64 },
}

impl AssemblyMode {
    pub fn dataset_type(&self) -> DatasetType {
        match self {
            AssemblyMode::Unique => DatasetType::Unique,
            AssemblyMode::Mixed { .. } => DatasetType::Mixed,
        }
    }
}

/// What one patch folder contributed to the dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderReport {
    pub name: String,
    pub source_patches: usize,
    pub written: usize,
    /// Output index of the first pair written from this folder
    pub first_index: Option<u64>,
}

/// Outcome of an assembly run
#[derive(Debug, Clone, Serialize)]
pub struct AssemblySummary {
    pub dataset_type: DatasetType,
    pub seed: Option<u64>,
    pub modalities: Option<ModalitySplit>,
    pub oversampling_ratio: Option<f64>,
    pub majority_folders: Vec<FolderReport>,
    pub minority_folders: Vec<FolderReport>,
    pub total_pairs: u64,
}

/// Build a flat dataset at `dataset_root` from the patch folders under
/// `patched_root`.
///
/// In unique mode every sub-folder of `patched_root` is a patch folder. In
/// mixed mode `patched_root` must hold `SEM` and `TEM` sub-trees; the one
/// with more files is copied as is, then each folder of the other one is
/// oversampled with a generator seeded from the mode's seed.
///
/// `dataset_root` must not already hold tiles from an earlier run. Files
/// already written are left in place if the run fails.
pub fn patched_to_dataset(
    patched_root: &Path,
    dataset_root: &Path,
    mode: AssemblyMode,
) -> BuildResult<AssemblySummary> {
    info!(
        "Assembling {} dataset from {:?} into {:?}",
        mode.dataset_type(),
        patched_root,
        dataset_root
    );
    let mut writer = DatasetWriter::create(dataset_root)?;

    let summary = match mode {
        AssemblyMode::Unique => {
            let folders = copy_patch_tree(patched_root, &mut writer)?;
            AssemblySummary {
                dataset_type: DatasetType::Unique,
                seed: None,
                modalities: None,
                oversampling_ratio: None,
                majority_folders: folders,
                minority_folders: Vec::new(),
                total_pairs: writer.written(),
            }
        }
        AssemblyMode::Mixed { seed } => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let split = find_minority_type(
                &patched_root.join(SEM_FOLDER),
                &patched_root.join(TEM_FOLDER),
            )?;
            let ratio = split.oversampling_ratio()?;

            let majority_folders = copy_patch_tree(&split.majority, &mut writer)?;
            info!(
                "Majority pass wrote {} pairs, oversampling minority with ratio {:.3}",
                writer.written(),
                ratio
            );
            let minority_folders =
                oversample_patch_tree(&split.minority, ratio, &mut rng, &mut writer)?;

            AssemblySummary {
                dataset_type: DatasetType::Mixed,
                seed: Some(seed),
                modalities: Some(split),
                oversampling_ratio: Some(ratio),
                majority_folders,
                minority_folders,
                total_pairs: writer.written(),
            }
        }
    };

    info!(
        "Dataset at {:?} holds {} pairs",
        writer.root(),
        summary.total_pairs
    );
    Ok(summary)
}

/// Load every tile of one patch folder, matched into pairs by index and
/// sorted ascending.
pub fn load_patch_folder(dir: &Path) -> BuildResult<Vec<TilePair<GrayImage>>> {
    let mut images = Vec::new();
    let mut masks = Vec::new();

    for path in list_files(dir)? {
        let name = PatchName::parse(&path)?;
        let tile = read_gray(&path)?;
        match name.kind {
            PatchKind::Image => images.push((tile, name.index)),
            PatchKind::Mask => masks.push((tile, name.index)),
        }
    }
    debug!(
        "Loaded {} image and {} mask tiles from {:?}",
        images.len(),
        masks.len(),
        dir
    );

    let (images, masks) = sort_by_index(images, masks);
    pair_sorted(dir, images, masks)
}

/// Copy every pair of every patch folder under `root`, in folder name order
/// then tile index order.
fn copy_patch_tree(root: &Path, writer: &mut DatasetWriter) -> BuildResult<Vec<FolderReport>> {
    let mut reports = Vec::new();
    for dir in list_subdirs(root)? {
        let name = folder_name(&dir);
        let span = info_span!("patch_folder", name = %name);
        let _enter = span.enter();

        let pairs = load_patch_folder(&dir)?;
        let mut first_index = None;
        for pair in &pairs {
            let index = writer.write_pair(&pair.image, &pair.mask)?;
            first_index.get_or_insert(index);
        }

        info!("Copied {} pairs", pairs.len());
        reports.push(FolderReport {
            name,
            source_patches: pairs.len(),
            written: pairs.len(),
            first_index,
        });
    }
    Ok(reports)
}

/// Oversample every patch folder under `root` from its own pairs, with
/// replacement, `ceil(ratio * floor(file_count / 2))` draws per folder.
fn oversample_patch_tree(
    root: &Path,
    ratio: f64,
    rng: &mut ChaCha8Rng,
    writer: &mut DatasetWriter,
) -> BuildResult<Vec<FolderReport>> {
    let mut reports = Vec::new();
    for dir in list_subdirs(root)? {
        let name = folder_name(&dir);
        let span = info_span!("patch_folder", name = %name);
        let _enter = span.enter();

        let file_count = list_files(&dir)?.len();
        let pairs = load_patch_folder(&dir)?;
        let draws = draw_with_replacement(rng, pairs.len(), oversample_count(ratio, file_count));

        let mut first_index = None;
        for &position in &draws {
            let pair = &pairs[position];
            let index = writer.write_pair(&pair.image, &pair.mask)?;
            first_index.get_or_insert(index);
        }

        info!(
            "Oversampled {} pairs into {} records",
            pairs.len(),
            draws.len()
        );
        reports.push(FolderReport {
            name,
            source_patches: pairs.len(),
            written: draws.len(),
            first_index,
        });
    }
    Ok(reports)
}

fn folder_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use std::fs;
    use std::path::PathBuf;

    /// Patch folder whose tiles encode (seed, index) in their pixels
    fn write_patch_folder(dir: &Path, seed: u8, indices: &[u64]) {
        fs::create_dir_all(dir).unwrap();
        for &k in indices {
            GrayImage::from_pixel(2, 2, Luma([seed.wrapping_mul(16).wrapping_add(k as u8)]))
                .save(dir.join(format!("image_{}.png", k)))
                .unwrap();
            GrayImage::from_pixel(2, 2, Luma([255 - k as u8]))
                .save(dir.join(format!("mask_{}.png", k)))
                .unwrap();
        }
    }

    fn pixel(path: PathBuf) -> u8 {
        read_gray(&path).unwrap().get_pixel(0, 0)[0]
    }

    #[test]
    fn test_dataset_type_parse() {
        assert_eq!("unique".parse::<DatasetType>().unwrap(), DatasetType::Unique);
        assert_eq!("MIXED".parse::<DatasetType>().unwrap(), DatasetType::Mixed);
        assert!("both".parse::<DatasetType>().is_err());
        assert_eq!(AssemblyMode::Mixed { seed: 1 }.dataset_type(), DatasetType::Mixed);
    }

    #[test]
    fn test_load_patch_folder_sorts_numerically() {
        let dir = tempfile::tempdir().unwrap();
        write_patch_folder(dir.path(), 0, &[10, 2, 1]);

        let pairs = load_patch_folder(dir.path()).unwrap();
        let indices: Vec<u64> = pairs.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 2, 10]);
        assert_eq!(pairs[2].image.get_pixel(0, 0)[0], 10);
        assert_eq!(pairs[2].mask.get_pixel(0, 0)[0], 245);
    }

    #[test]
    fn test_load_patch_folder_rejects_stray_file() {
        let dir = tempfile::tempdir().unwrap();
        write_patch_folder(dir.path(), 0, &[0]);
        fs::write(dir.path().join("thumbs.db"), "x").unwrap();

        assert!(matches!(
            load_patch_folder(dir.path()),
            Err(BuildError::MalformedPatchName { .. })
        ));
    }

    #[test]
    fn test_load_patch_folder_rejects_missing_mask() {
        let dir = tempfile::tempdir().unwrap();
        write_patch_folder(dir.path(), 0, &[0, 1]);
        fs::remove_file(dir.path().join("mask_1.png")).unwrap();

        assert!(matches!(
            load_patch_folder(dir.path()),
            Err(BuildError::UnpairedPatch { index: 1, .. })
        ));
    }

    #[test]
    fn test_unique_two_folders() {
        let patched = tempfile::tempdir().unwrap();
        let dataset = tempfile::tempdir().unwrap();
        write_patch_folder(&patched.path().join("acq_a"), 1, &[1, 0]);
        write_patch_folder(&patched.path().join("acq_b"), 2, &[0, 1]);

        let summary =
            patched_to_dataset(patched.path(), dataset.path(), AssemblyMode::Unique).unwrap();

        assert_eq!(summary.total_pairs, 4);
        assert_eq!(summary.majority_folders[1].first_index, Some(2));
        let expected = [16, 17, 32, 33];
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(pixel(dataset.path().join(format!("image_{}.png", i))), *want);
        }
        assert_eq!(pixel(dataset.path().join("mask_1.png")), 254);
        assert!(!dataset.path().join("image_4.png").exists());
    }

    #[test]
    fn test_mixed_counts() {
        let patched = tempfile::tempdir().unwrap();
        let dataset = tempfile::tempdir().unwrap();
        let sem = patched.path().join(SEM_FOLDER);
        let tem = patched.path().join(TEM_FOLDER);
        write_patch_folder(&sem.join("s1"), 1, &[0, 1, 2, 3, 4, 5]);
        write_patch_folder(&sem.join("s2"), 2, &[0, 1, 2, 3]);
        write_patch_folder(&tem.join("t1"), 3, &[0, 1]);

        let summary = patched_to_dataset(
            patched.path(),
            dataset.path(),
            AssemblyMode::Mixed { seed: 42 },
        )
        .unwrap();

        let split = summary.modalities.clone().unwrap();
        assert_eq!(split.majority, sem);
        assert_eq!(split.majority_count, 20);
        assert_eq!(split.minority_count, 4);
        assert_eq!(summary.oversampling_ratio, Some(5.0));
        // 10 majority pairs copied, then ceil(5 * 2) = 10 draws from t1
        assert_eq!(summary.minority_folders[0].written, 10);
        assert_eq!(summary.minority_folders[0].first_index, Some(10));
        assert_eq!(summary.total_pairs, 20);

        for i in 10..20 {
            let img = pixel(dataset.path().join(format!("image_{}.png", i)));
            let mask = pixel(dataset.path().join(format!("mask_{}.png", i)));
            let k = img - 48;
            assert!(k < 2, "image {} came from outside t1", i);
            assert_eq!(mask, 255 - k, "pair {} mixes two patches", i);
        }
    }

    #[test]
    fn test_mixed_zero_minority_is_error() {
        let patched = tempfile::tempdir().unwrap();
        let dataset = tempfile::tempdir().unwrap();
        write_patch_folder(&patched.path().join(SEM_FOLDER).join("s1"), 1, &[0]);
        fs::create_dir_all(patched.path().join(TEM_FOLDER).join("t1")).unwrap();

        let err = patched_to_dataset(
            patched.path(),
            dataset.path(),
            AssemblyMode::Mixed { seed: 1 },
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::EmptyModality { .. }));
    }
}
