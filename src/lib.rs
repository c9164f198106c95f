//! A lossy wavelet codec for grayscale images.
//!
//! Images are decomposed with either a recursive Haar transform or a lazy
//! lifting transform, small detail coefficients are thresholded away, and the
//! re-transformed coefficients are mapped to bytes and run-length encoded
//! into a compact binary stream.
//!
//! # Quick Start
//!
//! ```ignore
//! use wavelet_codec::{CodecParams, LogSink, TransformKind, WaveletCodec};
//!
//! // Haar with hard thresholding
//! wavelet_codec::encode("photo.png", 10, "photo.wvc")?;
//! wavelet_codec::decode("photo.wvc", "restored.png")?;
//!
//! // Lifting, with pipeline statistics sent to the logger
//! let codec = WaveletCodec::new(CodecParams::default())
//!     .with_transform(TransformKind::Lifting)
//!     .with_diagnostics(LogSink);
//! codec.encode("photo.png", 25.0, "photo.wvc")?;
//! ```
//!
//! # Features
//!
//! - **Two transforms**: Haar (any even dimensions) and lifting (powers of two)
//! - **Hard or soft thresholding** with a cutoff given as a percentage
//! - **Pluggable I/O**: implement [`ImageIo`] to decode from anything
//! - **Diagnostics**: per-stage coefficient statistics through a [`DiagnosticSink`]
//! - **Optional parallelism**: enable the `rayon` feature for parallel lifting rows
//!
//! # Stream Format
//!
//! An 8-byte header (height `i16`, width `i16`, run count `i32`) followed by
//! packed 5-byte runs (`u8` value, `i32` length), all in the writer's native
//! byte order. See [`encode::rle::stream`].

// Core modules
pub mod encode;
pub mod image;
pub mod pipeline;
pub mod utils;

use std::path::Path;

// Public codec API
pub use pipeline::{CodecParams, WaveletCodec};

// Transform and threshold types
pub use encode::rle::{CompressedStream, Run, RunLengthCode};
pub use encode::{Cutoff, ThresholdMode, TransformKind, WaveletTransform};

// Grid and I/O types
pub use crate::image::{ByteGrid, FileImageIo, Grid, ImageIo, Quality, SampleGrid};

// Diagnostics
pub use utils::diagnostics::{DiagnosticSink, LogSink, NoopSink, PipelineStage, WriterSink};

// Error types
pub use utils::error::{CodecError, LoadFailureReason, Result};

// Constants
pub const CODEC_VERSION: &str = "0.3.0";

/// Compresses the image at `source` into `dest` with the default codec
/// (Haar, hard thresholding). `cutoff` is a percentage in [-100, 100].
pub fn encode<P: AsRef<Path>, Q: AsRef<Path>>(source: P, cutoff: i32, dest: Q) -> Result<()> {
    let cutoff = Cutoff::try_from(cutoff)?;
    WaveletCodec::default().encode(source, cutoff.percent(), dest)
}

/// Decompresses the stream at `source` into an image at `dest` with the
/// default codec.
pub fn decode<P: AsRef<Path>, Q: AsRef<Path>>(source: P, dest: Q) -> Result<()> {
    WaveletCodec::default().decode(source, dest)
}
