// src/image/grid.rs

//! Row-major two-dimensional sample buffers.
//!
//! `Grid<T>` stores `height` rows of `width` samples contiguously. Every
//! transform stage mutates the grid in place through `&mut`; sub-regions are
//! addressed as a top-left extent over the full row stride.

use crate::utils::error::{CodecError, Result};

/// A 2D buffer of samples, stored in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

/// Floating-point intensities or transform coefficients.
pub type SampleGrid = Grid<f32>;

/// Byte-mapped coefficients, the input of the run-length codec.
pub type ByteGrid = Grid<u8>;

impl<T: Copy + Default> Grid<T> {
    /// Creates a grid of the given dimensions filled with `T::default()`.
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }

    /// Creates a grid from a raw row-major vector.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != width * height {
            return Err(CodecError::DimensionMismatch {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Grid {
            width,
            height,
            data,
        })
    }

    /// Creates a grid from a slice of rows.
    pub fn from_rows<const W: usize>(rows: &[[T; W]]) -> Self {
        Grid {
            width: W,
            height: rows.len(),
            data: rows.concat(),
        }
    }

    /// Creates a grid by calling `f(row, col)` for each cell.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Grid {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(height, width)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        debug_assert!(row < self.height && col < self.width);
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        debug_assert!(row < self.height && col < self.width);
        self.data[row * self.width + col] = value;
    }

    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.width;
        &self.data[start..start + self.width]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        let start = row * self.width;
        &mut self.data[start..start + self.width]
    }

    /// Mutable access to rows `upper` and `upper + 1` at once.
    pub(crate) fn row_pair_mut(&mut self, upper: usize) -> (&mut [T], &mut [T]) {
        let w = self.width;
        let start = upper * w;
        let (a, b) = self.data[start..start + 2 * w].split_at_mut(w);
        (a, b)
    }

    pub fn samples(&self) -> &[T] {
        &self.data
    }

    pub fn samples_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Copies the top-left `rows x cols` region into a dense row-major vector.
    pub(crate) fn snapshot_region(&self, rows: usize, cols: usize) -> Vec<T> {
        debug_assert!(rows <= self.height && cols <= self.width);
        let mut snap = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            snap.extend_from_slice(&self.row(r)[..cols]);
        }
        snap
    }

    /// Returns a grid with `f` applied to every sample.
    pub fn map<U, F>(&self, f: F) -> Grid<U>
    where
        U: Copy + Default,
        F: FnMut(&T) -> U,
    {
        Grid {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl SampleGrid {
    /// Largest absolute difference between two grids of equal shape.
    pub fn max_abs_diff(&self, other: &SampleGrid) -> Option<f32> {
        if self.dimensions() != other.dimensions() {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f32::max),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_layout() {
        let grid = SampleGrid::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(grid.dimensions(), (2, 3));
        assert_eq!(grid.get(1, 0), 4.0);
        assert_eq!(grid.row(0), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let err = ByteGrid::from_vec(3, 3, vec![0; 8]).unwrap_err();
        assert!(matches!(
            err,
            CodecError::DimensionMismatch {
                expected: 9,
                actual: 8
            }
        ));
    }

    #[test]
    fn test_snapshot_region() {
        let grid = ByteGrid::from_fn(4, 3, |r, c| (r * 10 + c) as u8);
        assert_eq!(grid.snapshot_region(2, 2), vec![0, 1, 10, 11]);
    }

    #[test]
    fn test_max_abs_diff() {
        let a = SampleGrid::from_rows(&[[0.0, 1.0]]);
        let b = SampleGrid::from_rows(&[[0.5, 1.0]]);
        assert_eq!(a.max_abs_diff(&b), Some(0.5));
        assert_eq!(a.max_abs_diff(&SampleGrid::new(1, 2)), None);
    }
}
