//! Diagnostic reporting for the compression pipeline.
//!
//! A `DiagnosticSink` is handed to the codec explicitly instead of being a
//! process-wide output file. The default sink discards everything.

use crate::encode::threshold::CoefficientStats;
use crate::image::metric::Quality;
use std::fmt;
use std::io::Write;
use std::sync::Mutex;

/// The states a compress or decompress call passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Loaded,
    Transformed,
    Thresholded,
    Reconstructed,
    ReTransformed,
    Encoded,
    Decoded,
    Inverted,
    Saved,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Loaded => "loaded",
            PipelineStage::Transformed => "transformed",
            PipelineStage::Thresholded => "thresholded",
            PipelineStage::Reconstructed => "reconstructed",
            PipelineStage::ReTransformed => "re-transformed",
            PipelineStage::Encoded => "encoded",
            PipelineStage::Decoded => "decoded",
            PipelineStage::Inverted => "inverted",
            PipelineStage::Saved => "saved",
        };
        f.write_str(name)
    }
}

/// Summary of a serialized stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    pub height: usize,
    pub width: usize,
    pub run_count: usize,
    pub byte_len: usize,
}

/// Receives progress events from the pipeline.
pub trait DiagnosticSink {
    /// Called after the grid reaches `stage`.
    fn stage(&self, stage: PipelineStage, stats: &CoefficientStats);

    /// Called once a stream has been produced or parsed.
    fn stream(&self, _summary: &StreamSummary) {}

    /// Called when a reconstruction can be compared against its source.
    fn quality(&self, _quality: &Quality) {}
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn stage(&self, _stage: PipelineStage, _stats: &CoefficientStats) {}
}

/// Forwards events to the `log` facade at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn stage(&self, stage: PipelineStage, stats: &CoefficientStats) {
        log::debug!("stage {}: {}", stage, stats);
    }

    fn stream(&self, summary: &StreamSummary) {
        log::debug!(
            "stream {}x{}: {} runs, {} bytes",
            summary.width,
            summary.height,
            summary.run_count,
            summary.byte_len
        );
    }

    fn quality(&self, quality: &Quality) {
        log::debug!("quality: {}", quality);
    }
}

/// Writes one text line per event to any writer (a log file, a buffer, ...).
///
/// Write failures are logged and otherwise ignored; diagnostics never abort
/// the pipeline.
pub struct WriterSink<W: Write> {
    out: Mutex<W>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        WriterSink {
            out: Mutex::new(out),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_line(&self, line: fmt::Arguments<'_>) {
        let mut out = match self.out.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = writeln!(out, "{}", line) {
            log::warn!("diagnostic sink write failed: {}", err);
        }
    }
}

impl<W: Write> DiagnosticSink for WriterSink<W> {
    fn stage(&self, stage: PipelineStage, stats: &CoefficientStats) {
        self.write_line(format_args!("{}\t{}", stage, stats));
    }

    fn stream(&self, summary: &StreamSummary) {
        self.write_line(format_args!(
            "stream\t{}x{}\truns={}\tbytes={}",
            summary.width, summary.height, summary.run_count, summary.byte_len
        ));
    }

    fn quality(&self, quality: &Quality) {
        self.write_line(format_args!(
            "quality\tmse={:.4}\tpsnr={:.2}",
            quality.mse, quality.psnr
        ));
    }
}
