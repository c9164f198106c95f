// src/pipeline/codec.rs

//! The compression pipeline.
//!
//! Compression runs
//!
//! ```text
//! load -> forward(normalized) -> threshold -> inverse(normalized)
//!      -> forward(unnormalized) -> quantize -> run-length encode -> write
//! ```
//!
//! The first round trip removes small detail coefficients from the image
//! itself; the second forward pass re-expresses the filtered image in
//! unnormalized coefficients, whose range suits the byte mapping.
//! Decompression parses the stream, dequantizes and applies a single
//! unnormalized inverse.

use crate::encode::rle::{self, CompressedStream};
use crate::encode::threshold::{self, CoefficientStats, Cutoff, ThresholdMode};
use crate::encode::wavelet::{TransformKind, WaveletTransform};
use crate::image::grid::SampleGrid;
use crate::image::metric::Quality;
use crate::image::image_io::{FileImageIo, ImageIo};
use crate::pipeline::params::CodecParams;
use crate::utils::diagnostics::{DiagnosticSink, NoopSink, PipelineStage, StreamSummary};
use crate::utils::error::{CodecError, Result};
use std::path::Path;

/// Wavelet image codec bound to an image collaborator and a diagnostic sink.
pub struct WaveletCodec {
    params: CodecParams,
    image_io: Box<dyn ImageIo>,
    diagnostics: Box<dyn DiagnosticSink>,
}

impl Default for WaveletCodec {
    fn default() -> Self {
        Self::new(CodecParams::default())
    }
}

impl WaveletCodec {
    /// Creates a codec using file-backed image I/O and no diagnostics.
    pub fn new(params: CodecParams) -> Self {
        WaveletCodec {
            params,
            image_io: Box::new(FileImageIo),
            diagnostics: Box::new(NoopSink),
        }
    }

    pub fn with_transform(mut self, kind: TransformKind) -> Self {
        self.params.transform = kind;
        self
    }

    pub fn with_threshold_mode(mut self, mode: ThresholdMode) -> Self {
        self.params.threshold_mode = mode;
        self
    }

    pub fn with_image_io<I: ImageIo + 'static>(mut self, image_io: I) -> Self {
        self.image_io = Box::new(image_io);
        self
    }

    pub fn with_diagnostics<D: DiagnosticSink + 'static>(mut self, sink: D) -> Self {
        self.diagnostics = Box::new(sink);
        self
    }

    pub fn params(&self) -> &CodecParams {
        &self.params
    }

    fn transform(&self) -> &'static dyn WaveletTransform {
        self.params.transform.transform()
    }

    fn report(&self, stage: PipelineStage, grid: &SampleGrid) {
        self.diagnostics.stage(stage, &CoefficientStats::from_grid(grid));
    }

    /// Compresses a grid of intensities into stream bytes.
    pub fn compress_grid(&self, mut grid: SampleGrid, cutoff: Cutoff) -> Result<Vec<u8>> {
        let t = self.transform();
        self.report(PipelineStage::Loaded, &grid);

        t.forward(&mut grid, true)?;
        self.report(PipelineStage::Transformed, &grid);

        threshold::threshold(&mut grid, cutoff, self.params.threshold_mode);
        self.report(PipelineStage::Thresholded, &grid);

        t.inverse(&mut grid, true)?;
        self.report(PipelineStage::Reconstructed, &grid);

        t.forward(&mut grid, false)?;
        self.report(PipelineStage::ReTransformed, &grid);

        let bytes = rle::quantize(&grid, t.byte_bias());
        let code = rle::encode(&bytes);
        let stream = CompressedStream::new(grid.height(), grid.width(), code)?;
        let out = stream.to_bytes()?;

        self.report(PipelineStage::Encoded, &grid);
        self.diagnostics.stream(&summarize(&stream));
        log::debug!(
            "{} compressed {}x{} at {}% into {} runs, {} bytes",
            t.name(),
            grid.width(),
            grid.height(),
            cutoff.percent(),
            stream.code().len(),
            out.len()
        );
        Ok(out)
    }

    /// Decompresses stream bytes into a grid of intensities.
    ///
    /// The whole stream is validated and decoded before anything is returned.
    pub fn decompress_bytes(&self, bytes: &[u8]) -> Result<SampleGrid> {
        let t = self.transform();
        let stream = CompressedStream::from_bytes(bytes)?;
        self.diagnostics.stream(&summarize(&stream));

        let (height, width) = (stream.height(), stream.width());
        let byte_grid = rle::decode(stream.into_code(), height, width)?;
        let mut grid = rle::dequantize(&byte_grid, t.byte_bias());
        self.report(PipelineStage::Decoded, &grid);

        t.inverse(&mut grid, false)?;
        self.report(PipelineStage::Inverted, &grid);
        log::debug!("{} decompressed {}x{}", t.name(), width, height);
        Ok(grid)
    }

    /// Removes small detail coefficients from `grid` in place.
    pub fn denoise_grid(
        &self,
        grid: &mut SampleGrid,
        cutoff: Cutoff,
        mode: ThresholdMode,
    ) -> Result<()> {
        let t = self.transform();
        t.forward(grid, true)?;
        self.report(PipelineStage::Transformed, grid);

        threshold::threshold(grid, cutoff, mode);
        self.report(PipelineStage::Thresholded, grid);

        t.inverse(grid, true)?;
        self.report(PipelineStage::Reconstructed, grid);
        Ok(())
    }

    /// Compresses and decompresses `grid` and measures the loss `cutoff`
    /// introduces, quantization included.
    pub fn measure_loss(&self, grid: &SampleGrid, cutoff: Cutoff) -> Result<Quality> {
        let bytes = self.compress_grid(grid.clone(), cutoff)?;
        let restored = self.decompress_bytes(&bytes)?;
        let quality = self.compare(grid, &restored)?;
        log::debug!("{}% cutoff: {}", cutoff.percent(), quality);
        Ok(quality)
    }

    fn compare(&self, original: &SampleGrid, restored: &SampleGrid) -> Result<Quality> {
        let quality = Quality::measure(original, restored).ok_or_else(|| {
            CodecError::InvalidDimension(format!(
                "cannot compare {}x{} against {}x{}",
                original.width(),
                original.height(),
                restored.width(),
                restored.height()
            ))
        })?;
        self.diagnostics.quality(&quality);
        Ok(quality)
    }

    /// Compresses the image at `source` into a stream file at `dest`.
    ///
    /// `cutoff` is a percentage in [-100, 100]; it is validated before any
    /// file is touched.
    pub fn encode<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        cutoff: f32,
        dest: Q,
    ) -> Result<()> {
        let cutoff = Cutoff::from_percent(cutoff)?;
        let grid = self.image_io.load(source.as_ref())?;
        let bytes = self.compress_grid(grid, cutoff)?;
        std::fs::write(dest.as_ref(), &bytes)?;
        log::info!(
            "encoded {:?} -> {:?} ({} bytes)",
            source.as_ref(),
            dest.as_ref(),
            bytes.len()
        );
        Ok(())
    }

    /// Decompresses the stream file at `source` and saves the image at `dest`.
    ///
    /// Nothing is written if the stream is corrupt.
    pub fn decode<P: AsRef<Path>, Q: AsRef<Path>>(&self, source: P, dest: Q) -> Result<()> {
        let bytes = std::fs::read(source.as_ref())?;
        let grid = self.decompress_bytes(&bytes)?;
        self.image_io.save(dest.as_ref(), &grid)?;
        self.report(PipelineStage::Saved, &grid);
        log::info!("decoded {:?} -> {:?}", source.as_ref(), dest.as_ref());
        Ok(())
    }

    /// Loads `source`, thresholds its transform with `mode` and saves the
    /// reconstruction at `dest`.
    pub fn denoise<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        cutoff: f32,
        mode: ThresholdMode,
        dest: Q,
    ) -> Result<()> {
        let cutoff = Cutoff::from_percent(cutoff)?;
        let source_grid = self.image_io.load(source.as_ref())?;
        self.report(PipelineStage::Loaded, &source_grid);

        let mut grid = source_grid.clone();
        self.denoise_grid(&mut grid, cutoff, mode)?;
        if !grid.is_empty() {
            self.compare(&source_grid, &grid)?;
        }
        self.image_io.save(dest.as_ref(), &grid)?;
        self.report(PipelineStage::Saved, &grid);
        Ok(())
    }
}

fn summarize(stream: &CompressedStream) -> StreamSummary {
    StreamSummary {
        height: stream.height(),
        width: stream.width(),
        run_count: stream.code().len(),
        byte_len: stream.byte_len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::rle::stream::{HEADER_LEN, RECORD_LEN};
    use crate::utils::error::{CodecError, LoadFailureReason};
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryImageIo {
        images: Rc<RefCell<HashMap<PathBuf, SampleGrid>>>,
        loads: Rc<Cell<usize>>,
    }

    impl ImageIo for MemoryImageIo {
        fn load(&self, path: &Path) -> Result<SampleGrid> {
            self.loads.set(self.loads.get() + 1);
            self.images
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| CodecError::ImageLoadFailure {
                    path: path.to_path_buf(),
                    reason: LoadFailureReason::NotFound,
                })
        }

        fn save(&self, path: &Path, grid: &SampleGrid) -> Result<()> {
            self.images
                .borrow_mut()
                .insert(path.to_path_buf(), grid.clone());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        stages: Rc<RefCell<Vec<PipelineStage>>>,
        qualities: Rc<RefCell<Vec<Quality>>>,
    }

    impl DiagnosticSink for RecordingSink {
        fn stage(&self, stage: PipelineStage, _stats: &CoefficientStats) {
            self.stages.borrow_mut().push(stage);
        }

        fn quality(&self, quality: &Quality) {
            self.qualities.borrow_mut().push(*quality);
        }
    }

    fn smooth(width: usize, height: usize) -> SampleGrid {
        SampleGrid::from_fn(width, height, |r, c| {
            0.2 + 0.5 * (r + c) as f32 / (width + height) as f32
        })
    }

    fn mean_abs_error(a: &SampleGrid, b: &SampleGrid) -> f32 {
        let sum: f32 = a
            .samples()
            .iter()
            .zip(b.samples())
            .map(|(x, y)| (x - y).abs())
            .sum();
        sum / a.len() as f32
    }

    #[test]
    fn test_constant_image_compresses_to_two_runs() {
        let codec = WaveletCodec::default();
        let grid = SampleGrid::from_fn(8, 8, |_, _| 0.5);
        let bytes = codec
            .compress_grid(grid.clone(), Cutoff::from_percent(0.0).unwrap())
            .unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 2 * RECORD_LEN);

        let back = codec.decompress_bytes(&bytes).unwrap();
        assert!(back.max_abs_diff(&grid).unwrap() < 1e-6);
    }

    #[test]
    fn test_lifting_constant_image_is_exact() {
        let codec = WaveletCodec::new(CodecParams::lifting());
        let grid = SampleGrid::from_fn(8, 8, |_, _| 0.5);
        let bytes = codec
            .compress_grid(grid.clone(), Cutoff::from_percent(0.0).unwrap())
            .unwrap();
        let back = codec.decompress_bytes(&bytes).unwrap();
        assert!(back.max_abs_diff(&grid).unwrap() < 1e-6);
    }

    #[test]
    fn test_haar_round_trip_is_close() {
        let codec = WaveletCodec::default();
        let grid = smooth(16, 16);
        let bytes = codec
            .compress_grid(grid.clone(), Cutoff::from_percent(0.0).unwrap())
            .unwrap();
        let back = codec.decompress_bytes(&bytes).unwrap();
        assert_eq!(back.dimensions(), (16, 16));
        assert!(mean_abs_error(&back, &grid) < 0.02);
    }

    #[test]
    fn test_lifting_round_trip_is_close() {
        let codec = WaveletCodec::new(CodecParams::lifting());
        let grid = smooth(16, 16);
        let bytes = codec
            .compress_grid(grid.clone(), Cutoff::from_percent(0.0).unwrap())
            .unwrap();
        let back = codec.decompress_bytes(&bytes).unwrap();
        assert!(mean_abs_error(&back, &grid) < 0.05);
    }

    #[test]
    fn test_higher_cutoff_never_grows_stream() {
        let codec = WaveletCodec::default();
        let grid = SampleGrid::from_fn(32, 32, |r, c| {
            ((r * 7 + c * 3) % 11) as f32 / 22.0 + 0.2
        });
        let low = codec
            .compress_grid(grid.clone(), Cutoff::from_percent(0.0).unwrap())
            .unwrap();
        let high = codec
            .compress_grid(grid, Cutoff::from_percent(60.0).unwrap())
            .unwrap();
        assert!(high.len() <= low.len());
    }

    #[test]
    fn test_lifting_rejects_non_power_of_two() {
        let codec = WaveletCodec::new(CodecParams::lifting());
        let err = codec
            .compress_grid(smooth(12, 8), Cutoff::from_percent(10.0).unwrap())
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidDimension(_)));
    }

    #[test]
    fn test_stage_sequence() {
        let sink = RecordingSink::default();
        let codec = WaveletCodec::default().with_diagnostics(sink.clone());
        let bytes = codec
            .compress_grid(smooth(4, 4), Cutoff::from_percent(5.0).unwrap())
            .unwrap();
        codec.decompress_bytes(&bytes).unwrap();

        use PipelineStage::*;
        assert_eq!(
            *sink.stages.borrow(),
            vec![
                Loaded,
                Transformed,
                Thresholded,
                Reconstructed,
                ReTransformed,
                Encoded,
                Decoded,
                Inverted
            ]
        );
    }

    #[test]
    fn test_invalid_cutoff_checked_before_load() {
        let io = MemoryImageIo::default();
        io.images
            .borrow_mut()
            .insert(PathBuf::from("in"), smooth(4, 4));
        let codec = WaveletCodec::default().with_image_io(io.clone());

        let err = codec.encode("in", 150.0, "out.bin").unwrap_err();
        assert!(matches!(err, CodecError::InvalidCutoff(_)));
        assert_eq!(io.loads.get(), 0);
    }

    #[test]
    fn test_missing_source_propagates_load_failure() {
        let codec = WaveletCodec::default().with_image_io(MemoryImageIo::default());
        let err = codec.encode("nowhere", 10.0, "out.bin").unwrap_err();
        assert!(matches!(err, CodecError::ImageLoadFailure { .. }));
    }

    #[test]
    fn test_denoise_grid_hard_removes_checkerboard() {
        let codec = WaveletCodec::default();
        let mut grid = SampleGrid::from_fn(8, 8, |r, c| if (r + c) % 2 == 0 { 0.52 } else { 0.48 });
        codec
            .denoise_grid(&mut grid, Cutoff::from_percent(10.0).unwrap(), ThresholdMode::Hard)
            .unwrap();
        // The checkerboard lives entirely in small detail coefficients.
        for &v in grid.samples() {
            assert!((v - 0.5).abs() < 1e-4, "{}", v);
        }
    }

    #[test]
    fn test_denoise_grid_soft_shrinks_dc() {
        let codec = WaveletCodec::default();
        let mut grid = SampleGrid::from_fn(8, 8, |_, _| 0.5);
        // Three normalized levels put a DC of 4.0 at the origin; soft
        // thresholding takes 0.1 off it and leaves the zero details alone.
        codec
            .denoise_grid(&mut grid, Cutoff::from_percent(10.0).unwrap(), ThresholdMode::Soft)
            .unwrap();
        for &v in grid.samples() {
            assert!((v - 0.4875).abs() < 1e-5, "{}", v);
        }
    }

    #[test]
    fn test_denoise_through_image_io() {
        let io = MemoryImageIo::default();
        io.images
            .borrow_mut()
            .insert(PathBuf::from("noisy"), smooth(8, 8));
        let codec = WaveletCodec::default().with_image_io(io.clone());

        codec
            .denoise("noisy", 0.0, ThresholdMode::Hard, "clean")
            .unwrap();
        let images = io.images.borrow();
        let clean = images.get(Path::new("clean")).unwrap();
        assert!(clean.max_abs_diff(&smooth(8, 8)).unwrap() < 1e-5);
    }

    #[test]
    fn test_measure_loss() {
        let sink = RecordingSink::default();
        let codec = WaveletCodec::default().with_diagnostics(sink.clone());

        let flat = SampleGrid::from_fn(8, 8, |_, _| 0.5);
        let quality = codec
            .measure_loss(&flat, Cutoff::from_percent(0.0).unwrap())
            .unwrap();
        assert!(quality.psnr > 100.0, "{}", quality);

        let quality = codec
            .measure_loss(&smooth(16, 16), Cutoff::from_percent(0.0).unwrap())
            .unwrap();
        assert!(quality.mse < 4.0, "{}", quality);
        assert!(quality.psnr > 40.0, "{}", quality);
        assert_eq!(sink.qualities.borrow().len(), 2);
    }

    #[test]
    fn test_denoise_reports_quality_against_source() {
        let io = MemoryImageIo::default();
        let noisy = SampleGrid::from_fn(8, 8, |r, c| if (r + c) % 2 == 0 { 0.52 } else { 0.48 });
        io.images.borrow_mut().insert(PathBuf::from("noisy"), noisy);
        let sink = RecordingSink::default();
        let codec = WaveletCodec::default()
            .with_image_io(io)
            .with_diagnostics(sink.clone());

        codec
            .denoise("noisy", 10.0, ThresholdMode::Hard, "clean")
            .unwrap();
        let qualities = sink.qualities.borrow();
        assert_eq!(qualities.len(), 1);
        // Every sample moves 0.02 (5.1 levels) onto the mean.
        assert!((qualities[0].mse - 26.01).abs() < 0.1, "{}", qualities[0]);
    }
}
