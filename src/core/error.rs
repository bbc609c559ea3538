use std::fmt;
use std::path::{Path, PathBuf};

use super::dataset::PatchKind;

/// Result type for every pipeline operation
pub type BuildResult<T> = Result<T, BuildError>;

/// Error types for the raw → patches → dataset pipeline
#[derive(Debug)]
pub enum BuildError {
    /// The acquisition folder has no pixel size declaration
    MissingPixelSize { acquisition: PathBuf },
    /// The pixel size file exists but does not hold a positive number
    InvalidPixelSize { path: PathBuf, value: String },
    /// No file whose name contains "image"
    MissingImage { acquisition: PathBuf },
    /// No file whose name contains "mask.png"
    MissingMask { acquisition: PathBuf },
    /// More than one candidate image or mask file
    AmbiguousInput {
        acquisition: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },
    /// A patch file name that is not `image_<n>` / `mask_<n>`
    MalformedPatchName { path: PathBuf },
    /// Two tiles of the same kind share an index
    DuplicatePatch {
        folder: PathBuf,
        kind: PatchKind,
        index: u64,
    },
    /// A tile index with no partner of the other kind
    UnpairedPatch {
        folder: PathBuf,
        index: u64,
        missing: PatchKind,
    },
    /// A modality subtree (SEM/TEM) does not exist
    MissingModality { path: PathBuf },
    /// A modality subtree holds no files at all
    EmptyModality { path: PathBuf },
    /// Oversampling ratio cannot be computed from a zero minority count
    ZeroMinority { path: PathBuf },
    /// Threshold list rejected
    InvalidThresholds(String),
    /// Any other parameter rejected before touching the file system
    InvalidParameter(String),
    /// The dataset folder already holds tiles from an earlier run
    DatasetNotEmpty { path: PathBuf, existing: PathBuf },
    /// Several acquisitions failed while running with keep-going
    AcquisitionsFailed { failed: Vec<String> },
    /// Image decode/encode failure
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
    /// Recursive directory walk failure
    Walk(walkdir::Error),
    /// I/O failure on a known path
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// I/O failure without path context
    IoError(std::io::Error),
}

impl BuildError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn image(path: impl AsRef<Path>, source: image::ImageError) -> Self {
        BuildError::Image {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::MissingPixelSize { acquisition } => {
                write!(f, "Missing pixel size declaration in {:?}", acquisition)
            }
            BuildError::InvalidPixelSize { path, value } => {
                write!(f, "Invalid pixel size {:?} in {:?}", value, path)
            }
            BuildError::MissingImage { acquisition } => {
                write!(f, "No image file found in {:?}", acquisition)
            }
            BuildError::MissingMask { acquisition } => {
                write!(f, "No mask file found in {:?}", acquisition)
            }
            BuildError::AmbiguousInput {
                acquisition,
                first,
                second,
            } => write!(
                f,
                "Ambiguous input in {:?}: both {:?} and {:?} match",
                acquisition, first, second
            ),
            BuildError::MalformedPatchName { path } => write!(
                f,
                "Malformed patch file name {:?} (expected image_<n> or mask_<n>)",
                path
            ),
            BuildError::DuplicatePatch {
                folder,
                kind,
                index,
            } => write!(
                f,
                "Duplicate {} tile with index {} in {:?}",
                kind.as_str(),
                index,
                folder
            ),
            BuildError::UnpairedPatch {
                folder,
                index,
                missing,
            } => write!(
                f,
                "Tile {} in {:?} has no {} counterpart",
                index,
                folder,
                missing.as_str()
            ),
            BuildError::MissingModality { path } => {
                write!(f, "Modality folder {:?} does not exist", path)
            }
            BuildError::EmptyModality { path } => {
                write!(f, "Modality folder {:?} contains no files", path)
            }
            BuildError::ZeroMinority { path } => write!(
                f,
                "Cannot oversample: minority folder {:?} has zero files",
                path
            ),
            BuildError::InvalidThresholds(msg) => write!(f, "Invalid thresholds: {}", msg),
            BuildError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            BuildError::DatasetNotEmpty { path, existing } => write!(
                f,
                "Dataset folder {:?} already holds tiles (found {:?}); remove them or pick another folder",
                path, existing
            ),
            BuildError::AcquisitionsFailed { failed } => write!(
                f,
                "{} acquisition(s) failed: {}",
                failed.len(),
                failed.join(", ")
            ),
            BuildError::Image { path, source } => {
                write!(f, "Image error on {:?}: {}", path, source)
            }
            BuildError::Walk(e) => write!(f, "Directory walk error: {}", e),
            BuildError::Io { path, source } => write!(f, "I/O error on {:?}: {}", path, source),
            BuildError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Image { source, .. } => Some(source),
            BuildError::Walk(e) => Some(e),
            BuildError::Io { source, .. } => Some(source),
            BuildError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BuildError {
    fn from(error: std::io::Error) -> Self {
        BuildError::IoError(error)
    }
}

impl From<walkdir::Error> for BuildError {
    fn from(error: walkdir::Error) -> Self {
        BuildError::Walk(error)
    }
}
