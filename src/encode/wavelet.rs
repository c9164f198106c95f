// src/encode/wavelet.rs

//! The transform capability used by the pipeline, with its two implementations.

use super::rle::{HAAR_BIAS, LIFTING_BIAS};
use super::{haar, lifting};
use crate::image::grid::SampleGrid;
use crate::utils::error::Result;

/// A reversible multiresolution transform over a sample grid.
///
/// `normalized` selects the scaled variant of the transform: √2 per level for
/// Haar, the low-low gain for lifting. The same flag must be passed to the
/// inverse.
pub trait WaveletTransform {
    fn forward(&self, grid: &mut SampleGrid, normalized: bool) -> Result<()>;

    fn inverse(&self, grid: &mut SampleGrid, normalized: bool) -> Result<()>;

    /// Byte bias applied when unnormalized coefficients are mapped to bytes.
    fn byte_bias(&self) -> u8;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HaarTransform;

impl WaveletTransform for HaarTransform {
    fn forward(&self, grid: &mut SampleGrid, normalized: bool) -> Result<()> {
        haar::forward_transform(grid, normalized);
        Ok(())
    }

    fn inverse(&self, grid: &mut SampleGrid, normalized: bool) -> Result<()> {
        haar::inverse_transform(grid, normalized);
        Ok(())
    }

    fn byte_bias(&self) -> u8 {
        HAAR_BIAS
    }

    fn name(&self) -> &'static str {
        "haar"
    }
}

/// Lifting transform; requires power-of-two dimensions.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiftingTransform;

impl WaveletTransform for LiftingTransform {
    fn forward(&self, grid: &mut SampleGrid, normalized: bool) -> Result<()> {
        lifting::lazy_transform(grid, normalized)
    }

    fn inverse(&self, grid: &mut SampleGrid, normalized: bool) -> Result<()> {
        lifting::lazy_inverse(grid, normalized)
    }

    fn byte_bias(&self) -> u8 {
        LIFTING_BIAS
    }

    fn name(&self) -> &'static str {
        "lifting"
    }
}

/// Selects a `WaveletTransform` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformKind {
    #[default]
    Haar,
    Lifting,
}

impl TransformKind {
    pub fn transform(self) -> &'static dyn WaveletTransform {
        match self {
            TransformKind::Haar => &HaarTransform,
            TransformKind::Lifting => &LiftingTransform,
        }
    }
}
