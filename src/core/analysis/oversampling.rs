//! Per-folder oversampling plan for the minority modality.

use rand::Rng;

/// Records to draw from one minority folder holding `file_count` files.
///
/// `ceil(ratio * floor(file_count / 2))`: half the files are images, so
/// `floor(file_count / 2)` is the folder's patch count.
pub fn oversample_count(ratio: f64, file_count: usize) -> usize {
    let n_img = (file_count / 2) as f64;
    (ratio * n_img).ceil() as usize
}

/// Draw `count` positions uniformly from `0..population`, with replacement.
///
/// An empty population yields no draws.
pub fn draw_with_replacement<R: Rng + ?Sized>(
    rng: &mut R,
    population: usize,
    count: usize,
) -> Vec<usize> {
    if population == 0 {
        return Vec::new();
    }
    (0..count).map(|_| rng.gen_range(0..population)).collect()
}
