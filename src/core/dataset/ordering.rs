//! Re-association of image and mask tiles by their numeric suffix.
//!
//! A directory listing has no guaranteed order, so tiles are always matched
//! through the index parsed from their file name, never by listing position.

use std::path::Path;

use crate::core::error::{BuildError, BuildResult};

use super::naming::PatchKind;

/// Sort both collections ascending by index, independently of each other.
///
/// The sort is stable, so entries sharing an index keep their relative order.
pub fn sort_by_index<I, M>(
    mut images: Vec<(I, u64)>,
    mut masks: Vec<(M, u64)>,
) -> (Vec<(I, u64)>, Vec<(M, u64)>) {
    images.sort_by_key(|(_, index)| *index);
    masks.sort_by_key(|(_, index)| *index);
    (images, masks)
}

/// One image tile and its mask, matched by index
#[derive(Debug, Clone, PartialEq)]
pub struct TilePair<T> {
    pub index: u64,
    pub image: T,
    pub mask: T,
}

/// Zip two index-sorted collections into pairs sharing the same index.
///
/// Both inputs must come out of [`sort_by_index`]. A repeated index within
/// one kind, or an index present for only one kind, is an error naming
/// `folder`.
pub fn pair_sorted<T>(
    folder: &Path,
    images: Vec<(T, u64)>,
    masks: Vec<(T, u64)>,
) -> BuildResult<Vec<TilePair<T>>> {
    check_unique(folder, PatchKind::Image, &images)?;
    check_unique(folder, PatchKind::Mask, &masks)?;

    let mut pairs = Vec::with_capacity(images.len().min(masks.len()));
    let mut images = images.into_iter().peekable();
    let mut masks = masks.into_iter().peekable();

    loop {
        let (img_index, mask_index) = match (images.peek(), masks.peek()) {
            (None, None) => break,
            (Some((_, i)), Some((_, m))) => (*i, *m),
            (Some((_, i)), None) => {
                return Err(unpaired(folder, *i, PatchKind::Mask));
            }
            (None, Some((_, m))) => {
                return Err(unpaired(folder, *m, PatchKind::Image));
            }
        };

        if img_index < mask_index {
            return Err(unpaired(folder, img_index, PatchKind::Mask));
        }
        if mask_index < img_index {
            return Err(unpaired(folder, mask_index, PatchKind::Image));
        }

        if let (Some((image, index)), Some((mask, _))) = (images.next(), masks.next()) {
            pairs.push(TilePair { index, image, mask });
        }
    }

    Ok(pairs)
}

fn check_unique<T>(folder: &Path, kind: PatchKind, sorted: &[(T, u64)]) -> BuildResult<()> {
    match sorted.windows(2).find(|w| w[0].1 == w[1].1) {
        Some(w) => Err(BuildError::DuplicatePatch {
            folder: folder.to_path_buf(),
            kind,
            index: w[0].1,
        }),
        None => Ok(()),
    }
}

fn unpaired(folder: &Path, index: u64, missing: PatchKind) -> BuildError {
    BuildError::UnpairedPatch {
        folder: folder.to_path_buf(),
        index,
        missing,
    }
}
