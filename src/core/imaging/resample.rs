use image::imageops::{self, FilterType};
use image::{GrayImage, ImageBuffer, Luma};

use crate::core::error::{BuildError, BuildResult};

/// Single-channel image with continuous values on the 0–255 scale
pub type FloatImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Target dimensions after scaling `(width, height)` by `coeff`.
pub fn rescaled_dimensions(width: u32, height: u32, coeff: f64) -> BuildResult<(u32, u32)> {
    if !coeff.is_finite() || coeff <= 0.0 {
        return Err(BuildError::InvalidParameter(format!(
            "resample coefficient must be a positive number, got {}",
            coeff
        )));
    }

    let new_w = (width as f64 * coeff).round();
    let new_h = (height as f64 * coeff).round();
    if new_w < 1.0 || new_h < 1.0 || new_w > u32::MAX as f64 || new_h > u32::MAX as f64 {
        return Err(BuildError::InvalidParameter(format!(
            "rescaling {}x{} by {} gives an unusable size",
            width, height, coeff
        )));
    }
    Ok((new_w as u32, new_h as u32))
}

/// Rescale `img` by `coeff` with bilinear filtering, keeping the 0–255 range.
///
/// Values are normalized to `[0, 1]` for the filter (float pixels are clamped
/// to that range by `imageops`) and scaled back afterwards.
pub fn rescale(img: &GrayImage, coeff: f64) -> BuildResult<FloatImage> {
    let (new_w, new_h) = rescaled_dimensions(img.width(), img.height(), coeff)?;

    let normalized: FloatImage = ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        Luma([img.get_pixel(x, y)[0] as f32 / 255.0])
    });
    let mut resized = imageops::resize(&normalized, new_w, new_h, FilterType::Triangle);
    for pixel in resized.pixels_mut() {
        pixel[0] *= 255.0;
    }
    Ok(resized)
}

/// Round continuous intensities to the nearest integer gray level.
pub fn round_to_gray(img: &FloatImage) -> GrayImage {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        Luma([img.get_pixel(x, y)[0].round().clamp(0.0, 255.0) as u8])
    })
}
