// src/encode/lifting.rs

//! Lazy-wavelet transform computed with the lifting scheme.
//!
//! Each line is transformed in place by a predict step on the odd samples
//! followed by an update step on the even samples, with circular boundary
//! handling. Rows are reduced first, then columns; the result is packed into
//! quadrants and the low-low quadrant is decomposed recursively.
//!
//! Both grid dimensions must be powers of two.

use super::quadrant;
use crate::image::grid::SampleGrid;
use crate::utils::error::{CodecError, Result};

/// Extra gain applied to the low-low quadrant of the outermost level when
/// scaling is requested.
pub const LL_SCALE: f32 = 1.4;

/// Predict and update one line in place. Lines of length 2 or less are left
/// as they are.
pub fn reduce_line(line: &mut [f32]) {
    let len = line.len();
    if len <= 2 {
        return;
    }
    debug_assert!(len.is_power_of_two(), "line length {} is not a power of two", len);

    // Predict: odd samples become the residual against their even neighbours.
    for i in (1..len - 1).step_by(2) {
        line[i] -= 0.5 * (line[i - 1] + line[i + 1]);
    }
    line[len - 1] -= 0.5 * (line[len - 2] + line[0]);

    // Update: even samples absorb a quarter of the neighbouring residuals.
    for i in (2..len).step_by(2) {
        line[i] += 0.25 * (line[i - 1] + line[i + 1]);
    }
    line[0] += 0.25 * (line[1] + line[len - 1]);
}

/// Exact inverse of [`reduce_line`].
pub fn inverse_line(line: &mut [f32]) {
    let len = line.len();
    if len <= 2 {
        return;
    }
    debug_assert!(len.is_power_of_two(), "line length {} is not a power of two", len);

    line[0] -= 0.25 * (line[1] + line[len - 1]);
    for i in (2..len).step_by(2) {
        line[i] -= 0.25 * (line[i - 1] + line[i + 1]);
    }

    line[len - 1] += 0.5 * (line[len - 2] + line[0]);
    for i in (1..len - 1).step_by(2) {
        line[i] += 0.5 * (line[i - 1] + line[i + 1]);
    }
}

/// Forward lifting transform of the whole grid, in place.
///
/// With `scale` set the outermost low-low quadrant is multiplied by
/// [`LL_SCALE`].
pub fn lazy_transform(grid: &mut SampleGrid, scale: bool) -> Result<()> {
    check_dimensions(grid)?;
    let (rows, cols) = grid.dimensions();
    log::trace!("lifting forward {}x{} scale={}", cols, rows, scale);
    forward_region(grid, rows, cols, gain(scale));
    Ok(())
}

/// Inverse of [`lazy_transform`]; `scale` must match the forward call.
pub fn lazy_inverse(grid: &mut SampleGrid, scale: bool) -> Result<()> {
    check_dimensions(grid)?;
    let (rows, cols) = grid.dimensions();
    log::trace!("lifting inverse {}x{} scale={}", cols, rows, scale);
    inverse_region(grid, rows, cols, gain(scale));
    Ok(())
}

fn gain(scale: bool) -> f32 {
    if scale { LL_SCALE } else { 1.0 }
}

fn check_dimensions(grid: &SampleGrid) -> Result<()> {
    let (rows, cols) = grid.dimensions();
    if !rows.is_power_of_two() || !cols.is_power_of_two() {
        return Err(CodecError::InvalidDimension(format!(
            "lifting transform needs power-of-two dimensions, got {}x{}",
            cols, rows
        )));
    }
    Ok(())
}

fn forward_region(grid: &mut SampleGrid, rows: usize, cols: usize, ll_scale: f32) {
    if rows <= 2 || cols <= 2 {
        return;
    }

    reduce_rows(grid, rows, cols);

    let mut line = vec![0.0f32; rows];
    for c in 0..cols {
        for (r, v) in line.iter_mut().enumerate() {
            *v = grid.get(r, c);
        }
        reduce_line(&mut line);
        for (r, &v) in line.iter().enumerate() {
            grid.set(r, c, v);
        }
    }

    quadrant::pack(grid, rows, cols, ll_scale);
    forward_region(grid, rows / 2, cols / 2, 1.0);
}

fn inverse_region(grid: &mut SampleGrid, rows: usize, cols: usize, ll_scale: f32) {
    if rows <= 2 || cols <= 2 {
        return;
    }
    inverse_region(grid, rows / 2, cols / 2, 1.0);

    quadrant::unpack(grid, rows, cols, ll_scale);

    let mut line = vec![0.0f32; rows];
    for c in 0..cols {
        for (r, v) in line.iter_mut().enumerate() {
            *v = grid.get(r, c);
        }
        inverse_line(&mut line);
        for (r, &v) in line.iter().enumerate() {
            grid.set(r, c, v);
        }
    }

    for r in 0..rows {
        inverse_line(&mut grid.row_mut(r)[..cols]);
    }
}

#[cfg(not(feature = "rayon"))]
fn reduce_rows(grid: &mut SampleGrid, rows: usize, cols: usize) {
    for r in 0..rows {
        reduce_line(&mut grid.row_mut(r)[..cols]);
    }
}

#[cfg(feature = "rayon")]
fn reduce_rows(grid: &mut SampleGrid, rows: usize, cols: usize) {
    use rayon::prelude::*;

    let width = grid.width();
    grid.samples_mut()
        .par_chunks_mut(width)
        .take(rows)
        .for_each(|row| reduce_line(&mut row[..cols]));
}
