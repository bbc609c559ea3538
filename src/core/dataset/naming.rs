use std::path::Path;

use crate::core::error::{BuildError, BuildResult};

/// Extension used for every tile this crate writes
pub const PATCH_EXTENSION: &str = "png";

/// Which half of a tile pair a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchKind {
    Image,
    Mask,
}

impl PatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchKind::Image => "image",
            PatchKind::Mask => "mask",
        }
    }
}

/// A tile file name decoded into its type tag and numeric suffix.
///
/// Format: `image_<n>.<ext>` or `mask_<n>.<ext>`, where `n` is a non-negative
/// integer (leading zeros accepted, gaps allowed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchName {
    pub kind: PatchKind,
    pub index: u64,
}

impl PatchName {
    pub fn new(kind: PatchKind, index: u64) -> Self {
        Self { kind, index }
    }

    /// Parse the file name of `path`. Anything that is not exactly a known
    /// prefix followed by `_` and digits is rejected.
    pub fn parse(path: &Path) -> BuildResult<Self> {
        let malformed = || BuildError::MalformedPatchName {
            path: path.to_path_buf(),
        };

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(malformed)?;
        let (prefix, suffix) = stem.rsplit_once('_').ok_or_else(malformed)?;

        let kind = match prefix {
            "image" => PatchKind::Image,
            "mask" => PatchKind::Mask,
            _ => return Err(malformed()),
        };

        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let index = suffix.parse::<u64>().map_err(|_| malformed())?;

        Ok(Self { kind, index })
    }

    /// File name used when writing this tile, e.g. `mask_12.png`
    pub fn file_name(&self) -> String {
        format!("{}_{}.{}", self.kind.as_str(), self.index, PATCH_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_image_and_mask() {
        let img = PatchName::parse(Path::new("patches/acq1/image_7.png")).unwrap();
        assert_eq!(img, PatchName::new(PatchKind::Image, 7));

        let mask = PatchName::parse(Path::new("mask_0.tif")).unwrap();
        assert_eq!(mask, PatchName::new(PatchKind::Mask, 0));

        let padded = PatchName::parse(Path::new("image_0042.png")).unwrap();
        assert_eq!(padded.index, 42);
    }

    #[test]
    fn test_parse_rejects_malformed_names() {
        for name in [
            "image.png",
            "image_.png",
            "image_x1.png",
            "image_-1.png",
            "masks_3.png",
            "raw_image_3.png",
            ".DS_Store",
            "pixel_size_in_micrometer.txt",
        ] {
            let err = PatchName::parse(&PathBuf::from(name)).unwrap_err();
            assert!(
                matches!(err, BuildError::MalformedPatchName { .. }),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(PatchName::new(PatchKind::Image, 3).file_name(), "image_3.png");
        assert_eq!(PatchName::new(PatchKind::Mask, 10).file_name(), "mask_10.png");
    }
}
