// src/encode/haar.rs

//! Recursive two-dimensional Haar transform.
//!
//! One level pairs adjacent rows, then adjacent columns, replacing each pair
//! `(a, b)` with its average and half-difference, then packs the result into
//! quadrants and recurses on the low-low quadrant. With `normalized` set both
//! outputs are scaled by √2, which makes each level orthonormal.
//!
//! An odd trailing row or column is zeroed and left out of the level. This
//! loses that line of samples and cannot be undone by the inverse. The same
//! applies at deeper levels: a 6x6 grid halves to a 3x3 low-low quadrant, so
//! only shapes whose halvings stay even are reconstructed exactly.

use super::quadrant;
use crate::image::grid::SampleGrid;
use std::f32::consts::SQRT_2;

/// Forward transform of the whole grid, in place.
pub fn forward_transform(grid: &mut SampleGrid, normalized: bool) {
    let (rows, cols) = grid.dimensions();
    log::trace!("haar forward {}x{} normalized={}", cols, rows, normalized);
    forward_region(grid, rows, cols, normalized);
}

/// Inverse of [`forward_transform`], in place.
pub fn inverse_transform(grid: &mut SampleGrid, normalized: bool) {
    let (rows, cols) = grid.dimensions();
    log::trace!("haar inverse {}x{} normalized={}", cols, rows, normalized);
    inverse_region(grid, rows, cols, normalized);
}

/// One decomposition level over the top-left `rows x cols` region, then
/// recursion on its low-low quadrant.
pub(crate) fn forward_region(grid: &mut SampleGrid, rows: usize, cols: usize, normalized: bool) {
    if rows <= 1 || cols <= 1 {
        return;
    }
    let c = if normalized { SQRT_2 } else { 1.0 };

    // Rows
    if rows % 2 == 1 {
        grid.row_mut(rows - 1)[..cols].fill(0.0);
    }
    let rows = rows - rows % 2;
    for i in (0..rows).step_by(2) {
        let (upper, lower) = grid.row_pair_mut(i);
        for (a, b) in upper[..cols].iter_mut().zip(&mut lower[..cols]) {
            let avg = (*a + *b) / 2.0;
            *b = c * (*a - avg);
            *a = c * avg;
        }
    }

    // Columns
    if cols % 2 == 1 {
        for i in 0..rows {
            grid.set(i, cols - 1, 0.0);
        }
    }
    let cols = cols - cols % 2;
    for i in 0..rows {
        let row = &mut grid.row_mut(i)[..cols];
        for pair in row.chunks_exact_mut(2) {
            let avg = (pair[0] + pair[1]) / 2.0;
            pair[1] = c * (pair[0] - avg);
            pair[0] = c * avg;
        }
    }

    quadrant::pack(grid, rows, cols, 1.0);
    forward_region(grid, rows / 2, cols / 2, normalized);
}

pub(crate) fn inverse_region(grid: &mut SampleGrid, rows: usize, cols: usize, normalized: bool) {
    if rows <= 1 || cols <= 1 {
        return;
    }
    inverse_region(grid, rows / 2, cols / 2, normalized);

    let rows = rows - rows % 2;
    let cols = cols - cols % 2;
    quadrant::unpack(grid, rows, cols, 1.0);

    // Columns, then rows: `b` is rebuilt from the already restored `a`.
    for i in 0..rows {
        let row = &mut grid.row_mut(i)[..cols];
        for pair in row.chunks_exact_mut(2) {
            let (a, b) = unmix(pair[0], pair[1], normalized);
            pair[0] = a;
            pair[1] = b;
        }
    }
    for i in (0..rows).step_by(2) {
        let (upper, lower) = grid.row_pair_mut(i);
        for (a, b) in upper[..cols].iter_mut().zip(&mut lower[..cols]) {
            let (na, nb) = unmix(*a, *b, normalized);
            *a = na;
            *b = nb;
        }
    }
}

#[inline]
fn unmix(avg: f32, diff: f32, normalized: bool) -> (f32, f32) {
    if normalized {
        let a = (avg + diff) / SQRT_2;
        (a, a - SQRT_2 * diff)
    } else {
        let a = avg + diff;
        (a, a - 2.0 * diff)
    }
}
