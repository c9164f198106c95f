//! Compression, decompression and denoising pipelines.

pub mod codec;
pub mod params;

pub use codec::WaveletCodec;
pub use params::CodecParams;
