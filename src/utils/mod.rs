//! General-purpose utility modules.

pub mod diagnostics;
pub mod error;

// Re-export commonly used items
pub use diagnostics::{DiagnosticSink, LogSink, NoopSink, PipelineStage, WriterSink};
pub use error::{CodecError, LoadFailureReason, Result};
