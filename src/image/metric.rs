// src/image/metric.rs

//! Reconstruction quality between a source grid and its decoded copy.
//!
//! Samples are compared on the 8-bit scale (`sample * 255`), so the peak
//! signal used by PSNR is 255.

use super::grid::SampleGrid;
use std::fmt;

const PEAK: f64 = 255.0;

/// Mean squared error and peak signal-to-noise ratio of a reconstruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quality {
    pub mse: f64,
    /// PSNR in decibels; `f64::INFINITY` when the grids are identical.
    pub psnr: f64,
}

impl Quality {
    /// Compares `reconstructed` against `original`. Returns `None` when the
    /// shapes differ or the grids are empty.
    pub fn measure(original: &SampleGrid, reconstructed: &SampleGrid) -> Option<Self> {
        let mse = mse(original, reconstructed)?;
        Some(Quality {
            mse,
            psnr: psnr_from_mse(mse),
        })
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mse {:.4}, psnr {:.2} dB", self.mse, self.psnr)
    }
}

/// Mean squared error on the 8-bit scale.
pub fn mse(original: &SampleGrid, reconstructed: &SampleGrid) -> Option<f64> {
    if original.dimensions() != reconstructed.dimensions() || original.is_empty() {
        return None;
    }
    let sum: f64 = original
        .samples()
        .iter()
        .zip(reconstructed.samples())
        .map(|(&a, &b)| {
            let d = (a as f64 - b as f64) * PEAK;
            d * d
        })
        .sum();
    Some(sum / original.len() as f64)
}

/// Peak signal-to-noise ratio in decibels on the 8-bit scale.
pub fn psnr(original: &SampleGrid, reconstructed: &SampleGrid) -> Option<f64> {
    mse(original, reconstructed).map(psnr_from_mse)
}

fn psnr_from_mse(mse: f64) -> f64 {
    if mse == 0.0 {
        f64::INFINITY
    } else {
        10.0 * (PEAK * PEAK / mse).log10()
    }
}
