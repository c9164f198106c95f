// src/image/image_io.rs

//! The boundary between sample grids and image files.
//!
//! The codec never touches image containers directly; it asks an `ImageIo`
//! implementation for a grid normalised to [0, 1] and hands one back for saving.

use super::grid::SampleGrid;
use crate::utils::error::{CodecError, LoadFailureReason, Result};
use ::image::{GrayImage, ImageError};
use std::path::Path;

/// Loads and stores single-channel sample grids.
pub trait ImageIo {
    /// Loads `path` as a grid of intensities in [0, 1].
    fn load(&self, path: &Path) -> Result<SampleGrid>;

    /// Stores `grid` at `path`. Samples outside [0, 1] are clamped.
    fn save(&self, path: &Path, grid: &SampleGrid) -> Result<()>;
}

/// File-backed collaborator using the `image` crate. Colour inputs are
/// reduced to 8-bit luma; the output format follows the file extension.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileImageIo;

impl ImageIo for FileImageIo {
    fn load(&self, path: &Path) -> Result<SampleGrid> {
        if !path.exists() {
            return Err(CodecError::ImageLoadFailure {
                path: path.to_path_buf(),
                reason: LoadFailureReason::NotFound,
            });
        }
        let img = ::image::open(path).map_err(|err| CodecError::ImageLoadFailure {
            path: path.to_path_buf(),
            reason: match err {
                ImageError::IoError(ref io) if io.kind() == std::io::ErrorKind::NotFound => {
                    LoadFailureReason::NotFound
                }
                other => LoadFailureReason::Decode(other.to_string()),
            },
        })?;
        let gray = img.to_luma8();
        log::debug!("loaded {:?} ({}x{})", path, gray.width(), gray.height());
        Ok(gray_to_grid(&gray))
    }

    fn save(&self, path: &Path, grid: &SampleGrid) -> Result<()> {
        let img = grid_to_gray(grid).ok_or_else(|| CodecError::ImageSaveFailure {
            path: path.to_path_buf(),
            reason: format!(
                "grid of {}x{} does not fit an image buffer",
                grid.width(),
                grid.height()
            ),
        })?;
        img.save(path).map_err(|err| CodecError::ImageSaveFailure {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        log::debug!("saved {:?} ({}x{})", path, grid.width(), grid.height());
        Ok(())
    }
}

/// Converts 8-bit luma to intensities in [0, 1].
pub fn gray_to_grid(img: &GrayImage) -> SampleGrid {
    let (w, h) = img.dimensions();
    SampleGrid::from_fn(w as usize, h as usize, |row, col| {
        img.get_pixel(col as u32, row as u32)[0] as f32 / 255.0
    })
}

/// Converts intensities back to 8-bit luma, clamping to [0, 1] and rounding.
pub fn grid_to_gray(grid: &SampleGrid) -> Option<GrayImage> {
    let w = u32::try_from(grid.width()).ok()?;
    let h = u32::try_from(grid.height()).ok()?;
    let bytes: Vec<u8> = grid
        .samples()
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();
    GrayImage::from_raw(w, h, bytes)
}
