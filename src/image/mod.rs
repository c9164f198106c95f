//! Sample grids, reconstruction metrics and the image file collaborator.

pub mod grid;
pub mod image_io;
pub mod metric;

pub use grid::{ByteGrid, Grid, SampleGrid};
pub use image_io::{FileImageIo, ImageIo};
pub use metric::Quality;
