// src/encode/rle/codec.rs

use crate::image::grid::{ByteGrid, SampleGrid};
use crate::utils::error::{CodecError, Result};

/// Byte bias used with Haar coefficients.
pub const HAAR_BIAS: u8 = 128;
/// Byte bias used with lifting coefficients.
pub const LIFTING_BIAS: u8 = 127;

const COEFF_SCALE: f32 = 128.0;

/// A run of `length` identical bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub value: u8,
    pub length: u32,
}

impl Run {
    pub fn new(value: u8, length: u32) -> Self {
        Run { value, length }
    }
}

/// Runs in row-major order of the grid they were taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLengthCode {
    runs: Vec<Run>,
}

impl RunLengthCode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_runs(runs: Vec<Run>) -> Self {
        RunLengthCode { runs }
    }

    pub fn push(&mut self, run: Run) {
        self.runs.push(run);
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Number of cells covered by all runs.
    pub fn total_length(&self) -> u64 {
        self.runs.iter().map(|r| r.length as u64).sum()
    }
}

/// Maps coefficients to bytes: `clamp(round(c * 128 + bias), 0, 255)`.
/// Halves round to even.
pub fn quantize(grid: &SampleGrid, bias: u8) -> ByteGrid {
    grid.map(|&c| {
        (c * COEFF_SCALE + bias as f32)
            .round_ties_even()
            .clamp(0.0, 255.0) as u8
    })
}

/// Maps bytes back to coefficients: `(byte - bias) / 128`.
pub fn dequantize(bytes: &ByteGrid, bias: u8) -> SampleGrid {
    bytes.map(|&b| (b as f32 - bias as f32) / COEFF_SCALE)
}

/// Run-length encodes `grid` in row-major order.
pub fn encode(grid: &ByteGrid) -> RunLengthCode {
    let mut code = RunLengthCode::new();
    let mut cells = grid.samples().iter().copied();

    let Some(mut current) = cells.next() else {
        return code;
    };
    let mut run = 1u32;
    for value in cells {
        if value == current {
            run += 1;
        } else {
            code.push(Run::new(current, run));
            current = value;
            run = 1;
        }
    }
    code.push(Run::new(current, run));
    code
}

/// Rebuilds a `height x width` grid from `code`.
///
/// Runs are taken from the end of the code and fill the grid from its last
/// cell backwards, which reproduces the forward order `encode` produced.
/// Every run must be non-empty and together they must cover the grid exactly.
pub fn decode(mut code: RunLengthCode, height: usize, width: usize) -> Result<ByteGrid> {
    let cells = height
        .checked_mul(width)
        .and_then(|n| u64::try_from(n).ok());
    let covered = code.total_length();
    if cells != Some(covered) {
        return Err(CodecError::StreamCorruption(format!(
            "runs cover {} cells but the grid is {}x{}",
            covered, width, height
        )));
    }

    let mut grid = ByteGrid::new(width, height);
    let mut value = 0u8;
    let mut remaining = 0u32;

    for cell in grid.samples_mut().iter_mut().rev() {
        if remaining == 0 {
            let run = code.runs.pop().ok_or_else(|| {
                CodecError::StreamCorruption(format!(
                    "runs exhausted before filling {}x{} grid",
                    width, height
                ))
            })?;
            if run.length == 0 {
                return Err(CodecError::StreamCorruption(
                    "run of length zero".to_string(),
                ));
            }
            value = run.value;
            remaining = run.length;
        }
        *cell = value;
        remaining -= 1;
    }

    if remaining != 0 || !code.runs.is_empty() {
        return Err(CodecError::StreamCorruption(format!(
            "{} cells and {} runs left over after filling {}x{} grid",
            remaining,
            code.runs.len(),
            width,
            height
        )));
    }
    Ok(grid)
}
