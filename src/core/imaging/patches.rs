//! Tiling of an image/mask pair into fixed-size square patches.
//!
//! Tiles are produced lazily in row-major order. Along each axis the origins
//! are `0, size, 2*size, ...` while a tile fits; a leftover border gets one
//! extra tile anchored at `extent - size`, overlapping its neighbour. An axis
//! shorter than `size` gets a single tile at 0, zero-padded.

use image::imageops;
use image::GrayImage;

use crate::core::error::{BuildError, BuildResult};

/// One extracted tile pair
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub image: GrayImage,
    pub mask: GrayImage,
}

/// Tile origins covering `extent` with tiles of `size`
pub fn tile_origins(extent: u32, size: u32) -> Vec<u32> {
    if extent <= size {
        return vec![0];
    }
    let mut origins: Vec<u32> = (0..=extent - size).step_by(size as usize).collect();
    if let Some(&last) = origins.last() {
        if last + size < extent {
            origins.push(extent - size);
        }
    }
    origins
}

/// Lazy, single-pass sequence of tile pairs
pub struct PatchExtractor<'a> {
    image: &'a GrayImage,
    mask: &'a GrayImage,
    size: u32,
    xs: Vec<u32>,
    ys: Vec<u32>,
    cursor: usize,
}

impl<'a> PatchExtractor<'a> {
    pub fn new(image: &'a GrayImage, mask: &'a GrayImage, size: u32) -> BuildResult<Self> {
        if size == 0 {
            return Err(BuildError::InvalidParameter(
                "patch size must be greater than zero".to_string(),
            ));
        }
        if image.dimensions() != mask.dimensions() {
            return Err(BuildError::InvalidParameter(format!(
                "image is {:?} but mask is {:?}",
                image.dimensions(),
                mask.dimensions()
            )));
        }

        Ok(Self {
            image,
            mask,
            size,
            xs: tile_origins(image.width(), size),
            ys: tile_origins(image.height(), size),
            cursor: 0,
        })
    }

    fn total(&self) -> usize {
        self.xs.len() * self.ys.len()
    }

    fn crop(&self, source: &GrayImage, x: u32, y: u32) -> GrayImage {
        let w = self.size.min(source.width() - x);
        let h = self.size.min(source.height() - y);
        let tile = imageops::crop_imm(source, x, y, w, h).to_image();
        if w == self.size && h == self.size {
            return tile;
        }
        let mut padded = GrayImage::new(self.size, self.size);
        imageops::replace(&mut padded, &tile, 0, 0);
        padded
    }
}

impl Iterator for PatchExtractor<'_> {
    type Item = Patch;

    fn next(&mut self) -> Option<Patch> {
        if self.cursor >= self.total() {
            return None;
        }
        let y = self.ys[self.cursor / self.xs.len()];
        let x = self.xs[self.cursor % self.xs.len()];
        self.cursor += 1;

        Some(Patch {
            image: self.crop(self.image, x, y),
            mask: self.crop(self.mask, x, y),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total() - self.cursor;
        (left, Some(left))
    }
}

impl ExactSizeIterator for PatchExtractor<'_> {}

/// Convenience entry point mirroring [`PatchExtractor::new`]
pub fn extract_patches<'a>(
    image: &'a GrayImage,
    mask: &'a GrayImage,
    size: u32,
) -> BuildResult<PatchExtractor<'a>> {
    PatchExtractor::new(image, mask, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn ramp(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| Luma([(y * w + x) as u8]))
    }

    #[test]
    fn test_tile_origins() {
        assert_eq!(tile_origins(8, 4), vec![0, 4]);
        assert_eq!(tile_origins(10, 4), vec![0, 4, 6]);
        assert_eq!(tile_origins(4, 4), vec![0]);
        assert_eq!(tile_origins(3, 4), vec![0]);
    }

    #[test]
    fn test_exact_tiling_row_major() {
        let img = ramp(4, 4);
        let mask = ramp(4, 4);
        let patches: Vec<Patch> = extract_patches(&img, &mask, 2).unwrap().collect();

        assert_eq!(patches.len(), 4);
        assert_eq!(patches[0].image.clone().into_raw(), vec![0, 1, 4, 5]);
        assert_eq!(patches[1].image.clone().into_raw(), vec![2, 3, 6, 7]);
        assert_eq!(patches[2].image.clone().into_raw(), vec![8, 9, 12, 13]);
        assert_eq!(patches[3].mask.clone().into_raw(), vec![10, 11, 14, 15]);
    }

    #[test]
    fn test_border_tile_overlaps() {
        let img = ramp(5, 2);
        let mask = ramp(5, 2);
        let patches: Vec<Patch> = extract_patches(&img, &mask, 2).unwrap().collect();

        // x origins 0, 2, 3
        assert_eq!(patches.len(), 3);
        assert_eq!(patches[2].image.clone().into_raw(), vec![3, 4, 8, 9]);
    }

    #[test]
    fn test_small_image_is_padded() {
        let img = GrayImage::from_pixel(2, 3, Luma([9]));
        let mask = GrayImage::from_pixel(2, 3, Luma([255]));
        let patches: Vec<Patch> = extract_patches(&img, &mask, 4).unwrap().collect();

        assert_eq!(patches.len(), 1);
        let tile = &patches[0].image;
        assert_eq!(tile.dimensions(), (4, 4));
        assert_eq!(tile.get_pixel(1, 2)[0], 9);
        assert_eq!(tile.get_pixel(3, 3)[0], 0);
        assert_eq!(patches[0].mask.get_pixel(2, 0)[0], 0);
    }

    #[test]
    fn test_size_hint_and_single_pass() {
        let img = ramp(6, 6);
        let mut it = extract_patches(&img, &img, 4).unwrap();
        assert_eq!(it.len(), 4);
        it.next();
        assert_eq!(it.len(), 3);
        assert_eq!(it.by_ref().count(), 3);
        assert!(it.next().is_none());
    }

    #[test]
    fn test_rejects_bad_input() {
        let img = ramp(4, 4);
        let mask = ramp(4, 3);
        assert!(extract_patches(&img, &mask, 2).is_err());
        assert!(extract_patches(&img, &img, 0).is_err());
    }
}
