pub mod haar;
pub mod lifting;
mod quadrant;
pub mod rle;
pub mod threshold;
pub mod wavelet;

// Re-export commonly used encoding functionality
pub use threshold::{CoefficientStats, Cutoff, ThresholdMode};
pub use wavelet::{HaarTransform, LiftingTransform, TransformKind, WaveletTransform};

pub use crate::utils::error::{CodecError, Result};
