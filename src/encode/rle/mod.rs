// src/encode/rle/mod.rs

//! Run-length coding of byte-mapped coefficients and its on-disk stream.

pub mod codec;
pub mod stream;

pub use codec::{
    HAAR_BIAS, LIFTING_BIAS, Run, RunLengthCode, decode, dequantize, encode, quantize,
};
pub use stream::CompressedStream;
