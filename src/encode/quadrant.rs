// src/encode/quadrant.rs

//! Quadrant reorganisation shared by both transform engines.
//!
//! After one decomposition level the low-pass and detail samples sit
//! interleaved on even/odd rows and columns. `pack` moves them into four
//! contiguous blocks of the region:
//!
//! ```text
//! (even, even) -> top-left      (low-low)
//! (odd,  even) -> bottom-left
//! (even, odd)  -> top-right
//! (odd,  odd)  -> bottom-right
//! ```
//!
//! `unpack` is the exact inverse. Both read from a snapshot of the region so
//! that no sample is overwritten before it has been moved.

use crate::image::grid::SampleGrid;

/// Interleaved -> quadrants over the top-left `rows x cols` region.
/// The low-low quadrant is multiplied by `ll_scale`.
pub(crate) fn pack(grid: &mut SampleGrid, rows: usize, cols: usize, ll_scale: f32) {
    debug_assert!(rows % 2 == 0 && cols % 2 == 0);
    let snap = grid.snapshot_region(rows, cols);
    let (half_r, half_c) = (rows / 2, cols / 2);

    for i in 0..rows {
        for j in 0..cols {
            let v = snap[i * cols + j];
            match (i % 2, j % 2) {
                (0, 0) => grid.set(i / 2, j / 2, ll_scale * v),
                (1, 0) => grid.set(half_r + i / 2, j / 2, v),
                (0, 1) => grid.set(i / 2, half_c + j / 2, v),
                _ => grid.set(half_r + i / 2, half_c + j / 2, v),
            }
        }
    }
}

/// Quadrants -> interleaved over the top-left `rows x cols` region.
/// The low-low quadrant is divided by `ll_scale`.
pub(crate) fn unpack(grid: &mut SampleGrid, rows: usize, cols: usize, ll_scale: f32) {
    debug_assert!(rows % 2 == 0 && cols % 2 == 0);
    let snap = grid.snapshot_region(rows, cols);
    let (half_r, half_c) = (rows / 2, cols / 2);

    for i in 0..rows {
        for j in 0..cols {
            let v = snap[i * cols + j];
            match (i < half_r, j < half_c) {
                (true, true) => grid.set(2 * i, 2 * j, v / ll_scale),
                (false, true) => grid.set(2 * (i - half_r) + 1, 2 * j, v),
                (true, false) => grid.set(2 * i, 2 * (j - half_c) + 1, v),
                (false, false) => grid.set(2 * (i - half_r) + 1, 2 * (j - half_c) + 1, v),
            }
        }
    }
}
