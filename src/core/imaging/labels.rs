use image::{GrayImage, ImageBuffer, Luma};
use serde::{Deserialize, Serialize};

use crate::core::error::{BuildError, BuildResult};

use super::resample::FloatImage;

/// Class boundaries as fractions of full scale (255).
///
/// Values below `255 * t[1]` are class 0, values from `255 * t[k]` up to the
/// next boundary are class `k`, and everything at or above `255 * t[2]` is
/// class 2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct Thresholds([f64; 3]);

impl Thresholds {
    pub fn new(values: [f64; 3]) -> BuildResult<Self> {
        if values.iter().any(|t| !t.is_finite() || *t < 0.0 || *t > 1.0) {
            return Err(BuildError::InvalidThresholds(format!(
                "{:?}: every threshold must lie in [0, 1]",
                values
            )));
        }
        if values.windows(2).any(|w| w[0] >= w[1]) {
            return Err(BuildError::InvalidThresholds(format!(
                "{:?}: thresholds must be strictly increasing",
                values
            )));
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> [f64; 3] {
        self.0
    }

    pub fn class_count(&self) -> u8 {
        self.0.len() as u8
    }

    /// Class of one continuous mask value on the 0–255 scale
    pub fn classify(&self, value: f32) -> u8 {
        let value = value as f64;
        self.0[1..]
            .iter()
            .filter(|t| value >= 255.0 * **t)
            .count() as u8
    }

    /// Gray level a class is stored as, spread evenly over 0..=255
    pub fn encode_class(&self, class: u8) -> u8 {
        let top = (self.class_count() - 1) as f64;
        ((class.min(self.class_count() - 1) as f64) * 255.0 / top).round() as u8
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self([0.0, 0.2, 0.8])
    }
}

impl TryFrom<[f64; 3]> for Thresholds {
    type Error = BuildError;

    fn try_from(values: [f64; 3]) -> Result<Self, Self::Error> {
        Thresholds::new(values)
    }
}

impl TryFrom<&[f64]> for Thresholds {
    type Error = BuildError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        let values: [f64; 3] = values.try_into().map_err(|_| {
            BuildError::InvalidThresholds(format!(
                "expected 3 values, got {}",
                values.len()
            ))
        })?;
        Thresholds::new(values)
    }
}

impl From<Thresholds> for [f64; 3] {
    fn from(thresholds: Thresholds) -> Self {
        thresholds.0
    }
}

/// Turn a continuous mask into a mask of stored class gray levels.
pub fn labellize_mask(mask: &FloatImage, thresholds: &Thresholds) -> GrayImage {
    ImageBuffer::from_fn(mask.width(), mask.height(), |x, y| {
        let class = thresholds.classify(mask.get_pixel(x, y)[0]);
        Luma([thresholds.encode_class(class)])
    })
}
