// src/encode/threshold.rs

//! Coefficient thresholding.
//!
//! The cutoff is given as a percentage of a fixed coefficient range of 1.0,
//! so `Cutoff::from_percent(5.0)` discards magnitudes below 0.05. It does not
//! adapt to the coefficients of a particular image.

use crate::image::grid::SampleGrid;
use crate::utils::error::{CodecError, Result};
use std::fmt;

/// How coefficients below the cutoff are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMode {
    /// Zero every coefficient whose magnitude is below the cutoff.
    #[default]
    Hard,
    /// Shrink every coefficient towards zero by the cutoff.
    Soft,
}

/// A validated cutoff percentage in [-100, 100].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutoff(f32);

impl Cutoff {
    pub const MAX_PERCENT: f32 = 100.0;

    pub fn from_percent(percent: f32) -> Result<Self> {
        if !percent.is_finite() || percent.abs() > Self::MAX_PERCENT {
            return Err(CodecError::InvalidCutoff(percent));
        }
        Ok(Cutoff(percent))
    }

    pub fn percent(self) -> f32 {
        self.0
    }

    /// The cutoff as an absolute coefficient magnitude. The sign of the
    /// percentage is ignored.
    pub fn absolute(self) -> f32 {
        self.0.abs() / 100.0
    }
}

impl TryFrom<f32> for Cutoff {
    type Error = CodecError;

    fn try_from(percent: f32) -> Result<Self> {
        Cutoff::from_percent(percent)
    }
}

impl TryFrom<i32> for Cutoff {
    type Error = CodecError;

    fn try_from(percent: i32) -> Result<Self> {
        if percent.unsigned_abs() > 100 {
            return Err(CodecError::InvalidCutoff(percent as f32));
        }
        Cutoff::from_percent(percent as f32)
    }
}

/// Applies `mode` with `cutoff` to every coefficient of `grid`.
pub fn threshold(grid: &mut SampleGrid, cutoff: Cutoff, mode: ThresholdMode) {
    threshold_absolute(grid.samples_mut(), cutoff.absolute(), mode);
}

/// Applies `mode` with an absolute cutoff `k` to a slice of coefficients.
pub fn threshold_absolute(coeffs: &mut [f32], k: f32, mode: ThresholdMode) {
    match mode {
        ThresholdMode::Hard => {
            for v in coeffs.iter_mut() {
                if v.abs() < k {
                    *v = 0.0;
                }
            }
        }
        ThresholdMode::Soft => {
            for v in coeffs.iter_mut() {
                if *v > k {
                    *v -= k;
                } else if *v < -k {
                    *v += k;
                }
            }
        }
    }
}

/// Summary of a coefficient grid, reported between pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoefficientStats {
    pub min: f32,
    pub max: f32,
    pub zeros: usize,
    pub total: usize,
}

impl CoefficientStats {
    pub fn from_grid(grid: &SampleGrid) -> Self {
        let samples = grid.samples();
        if samples.is_empty() {
            return Self::default();
        }
        let mut stats = CoefficientStats {
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
            zeros: 0,
            total: samples.len(),
        };
        for &v in samples {
            stats.min = stats.min.min(v);
            stats.max = stats.max.max(v);
            if v == 0.0 {
                stats.zeros += 1;
            }
        }
        stats
    }

    /// Fraction of coefficients that are exactly zero.
    pub fn sparsity(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.zeros as f32 / self.total as f32
        }
    }
}

impl fmt::Display for CoefficientStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "range [{:.4}, {:.4}], zeros {}/{} ({:.1}%)",
            self.min,
            self.max,
            self.zeros,
            self.total,
            self.sparsity() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coeffs() -> SampleGrid {
        SampleGrid::from_rows(&[[0.9, -0.3, 0.05], [-0.99, 0.0, 0.5]])
    }

    #[test]
    fn test_cutoff_validation() {
        assert!(Cutoff::from_percent(100.0).is_ok());
        assert!(Cutoff::from_percent(-100.0).is_ok());
        assert!(matches!(
            Cutoff::from_percent(100.5),
            Err(CodecError::InvalidCutoff(_))
        ));
        assert!(Cutoff::from_percent(f32::NAN).is_err());
        assert!(Cutoff::try_from(-101i32).is_err());
        assert!(matches!(
            Cutoff::try_from(f32::INFINITY),
            Err(CodecError::InvalidCutoff(_))
        ));
        assert_eq!(Cutoff::try_from(12.5f32).unwrap().percent(), 12.5);
        assert_eq!(Cutoff::try_from(25i32).unwrap().absolute(), 0.25);
        assert_eq!(Cutoff::try_from(-25i32).unwrap().absolute(), 0.25);
    }

    #[test]
    fn test_hard_threshold() {
        let mut grid = coeffs();
        threshold(&mut grid, Cutoff::from_percent(40.0).unwrap(), ThresholdMode::Hard);
        let expected = SampleGrid::from_rows(&[[0.9, 0.0, 0.0], [-0.99, 0.0, 0.5]]);
        assert_eq!(grid, expected);
    }

    #[test]
    fn test_soft_threshold() {
        let mut grid = coeffs();
        threshold(&mut grid, Cutoff::from_percent(40.0).unwrap(), ThresholdMode::Soft);
        let expected = [0.5, -0.3, 0.05, -0.59, 0.0, 0.1];
        for (v, e) in grid.samples().iter().zip(expected) {
            assert!((v - e).abs() < 1e-6, "{} vs {}", v, e);
        }
    }

    #[test]
    fn test_full_cutoff_zeroes_unit_range() {
        let mut grid = coeffs();
        threshold(&mut grid, Cutoff::from_percent(100.0).unwrap(), ThresholdMode::Hard);
        assert!(grid.samples().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_zero_cutoff_is_noop() {
        for mode in [ThresholdMode::Hard, ThresholdMode::Soft] {
            let mut grid = coeffs();
            threshold(&mut grid, Cutoff::from_percent(0.0).unwrap(), mode);
            assert_eq!(grid, coeffs());
        }
    }

    #[test]
    fn test_stats() {
        let stats = CoefficientStats::from_grid(&coeffs());
        assert_eq!(stats.min, -0.99);
        assert_eq!(stats.max, 0.9);
        assert_eq!(stats.zeros, 1);
        assert_eq!(stats.total, 6);
        assert_eq!(CoefficientStats::from_grid(&SampleGrid::new(0, 0)).total, 0);
    }
}
