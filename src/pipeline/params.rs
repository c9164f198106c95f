// src/pipeline/params.rs

use crate::encode::threshold::ThresholdMode;
use crate::encode::wavelet::TransformKind;

/// Settings shared by every call on a `WaveletCodec`.
///
/// The transform kind must match between the encoder and the decoder of a
/// stream; the stream itself does not record it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodecParams {
    /// Which wavelet transform drives the pipeline.
    pub transform: TransformKind,
    /// Threshold policy. Compression uses `Hard` unless configured otherwise.
    pub threshold_mode: ThresholdMode,
}

impl CodecParams {
    pub fn haar() -> Self {
        Self::default()
    }

    pub fn lifting() -> Self {
        CodecParams {
            transform: TransformKind::Lifting,
            ..Self::default()
        }
    }
}
