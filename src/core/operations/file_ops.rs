use std::fs;
use std::path::{Path, PathBuf};

use image::GrayImage;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::error::{BuildError, BuildResult};

/// Create `dir` and its parents if missing.
pub fn ensure_dir(dir: &Path) -> BuildResult<()> {
    if !dir.exists() {
        debug!("Creating directory {:?}", dir);
    }
    fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))
}

/// List the sub-directories of `root`, sorted by file name.
///
/// Non-directory entries are skipped with a warning. Sorting makes traversal
/// independent of the order the file system hands entries back in.
pub fn list_subdirs(root: &Path) -> BuildResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root).map_err(|e| BuildError::io(root, e))? {
        let entry = entry.map_err(|e| BuildError::io(root, e))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        } else {
            warn!("Skipping non-directory entry {:?}", path);
        }
    }
    dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(dirs)
}

/// List the regular files directly inside `dir`, sorted by file name.
pub fn list_files(dir: &Path) -> BuildResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| BuildError::io(dir, e))? {
        let entry = entry.map_err(|e| BuildError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Number of regular files anywhere below `root`.
pub fn count_files_recursive(root: &Path) -> BuildResult<usize> {
    let mut count = 0;
    for entry in WalkDir::new(root) {
        if entry?.file_type().is_file() {
            count += 1;
        }
    }
    Ok(count)
}

/// Decode any supported image file as 8-bit grayscale.
pub fn read_gray(path: &Path) -> BuildResult<GrayImage> {
    let img = image::open(path).map_err(|e| BuildError::image(path, e))?;
    Ok(img.to_luma8())
}

/// Encode `img` at `path`; the format follows the extension.
pub fn save_gray(img: &GrayImage, path: &Path) -> BuildResult<()> {
    img.save(path).map_err(|e| BuildError::image(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_subdirs_sorted_and_skips_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let dirs = list_subdirs(dir.path()).unwrap();
        let names: Vec<_> = dirs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_count_files_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("x/y")).unwrap();
        fs::write(dir.path().join("top.txt"), "1").unwrap();
        fs::write(dir.path().join("x/a.txt"), "1").unwrap();
        fs::write(dir.path().join("x/y/b.txt"), "1").unwrap();

        assert_eq!(count_files_recursive(dir.path()).unwrap(), 3);
        assert_eq!(list_files(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_gray_roundtrip_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_0.png");
        let img = GrayImage::from_fn(4, 3, |x, y| image::Luma([(x * 10 + y) as u8]));

        save_gray(&img, &path).unwrap();
        assert_eq!(read_gray(&path).unwrap(), img);
    }

    #[test]
    fn test_read_gray_missing_file_names_path() {
        let err = read_gray(Path::new("does/not/exist.png")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.png"));
    }
}
