// src/encode/rle/stream.rs

//! Binary layout of a compressed image.
//!
//! ```text
//! offset  field                  type
//! 0       height                 i16
//! 2       width                  i16
//! 4       run_count              i32
//! 8       record[0..run_count)   { u8 value, i32 run_length }  (5 bytes, packed)
//! ```
//!
//! All integers use the byte order of the machine that wrote the stream.
//! Streams are not portable between machines of different endianness.

use super::codec::{Run, RunLengthCode};
use crate::utils::error::{CodecError, Result};
use bytemuck::{Pod, Zeroable};
use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Write};

pub const HEADER_LEN: usize = 8;
pub const RECORD_LEN: usize = std::mem::size_of::<RunRecord>();

/// One run as it is laid out on disk.
#[repr(C, packed)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct RunRecord {
    value: u8,
    run_length: i32,
}

/// A run-length code together with the grid shape it decodes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedStream {
    height: i16,
    width: i16,
    code: RunLengthCode,
}

impl CompressedStream {
    /// Pairs `code` with its grid shape. Fails if either dimension does not
    /// fit the 16-bit header fields.
    pub fn new(height: usize, width: usize, code: RunLengthCode) -> Result<Self> {
        let to_i16 = |v: usize, what: &str| {
            i16::try_from(v).map_err(|_| {
                CodecError::InvalidDimension(format!(
                    "{} {} exceeds the stream limit of {}",
                    what,
                    v,
                    i16::MAX
                ))
            })
        };
        Ok(CompressedStream {
            height: to_i16(height, "height")?,
            width: to_i16(width, "width")?,
            code,
        })
    }

    pub fn height(&self) -> usize {
        self.height as usize
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn code(&self) -> &RunLengthCode {
        &self.code
    }

    pub fn into_code(self) -> RunLengthCode {
        self.code
    }

    /// Size of the serialized stream in bytes.
    pub fn byte_len(&self) -> usize {
        HEADER_LEN + RECORD_LEN * self.code.len()
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        let run_count = i32::try_from(self.code.len()).map_err(|_| {
            CodecError::InvalidDimension(format!("{} runs exceed i32", self.code.len()))
        })?;

        let records = self
            .code
            .runs()
            .iter()
            .map(|run| {
                let run_length = i32::try_from(run.length).map_err(|_| {
                    CodecError::InvalidDimension(format!("run of {} exceeds i32", run.length))
                })?;
                Ok(RunRecord {
                    value: run.value,
                    run_length,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut buf = Vec::with_capacity(self.byte_len());
        buf.write_i16::<NativeEndian>(self.height)?;
        buf.write_i16::<NativeEndian>(self.width)?;
        buf.write_i32::<NativeEndian>(run_count)?;
        buf.extend_from_slice(bytemuck::cast_slice(&records));

        out.write_all(&buf)?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.byte_len());
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Reads a whole stream from `input`.
    pub fn read_from<R: Read>(input: &mut R) -> Result<Self> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Parses a stream, checking that its length matches the declared run count.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(CodecError::StreamCorruption(format!(
                "stream of {} bytes is shorter than its {}-byte header",
                bytes.len(),
                HEADER_LEN
            )));
        }

        let mut cursor = Cursor::new(&bytes[..HEADER_LEN]);
        let height = cursor.read_i16::<NativeEndian>()?;
        let width = cursor.read_i16::<NativeEndian>()?;
        let run_count = cursor.read_i32::<NativeEndian>()?;

        if height < 0 || width < 0 {
            return Err(CodecError::StreamCorruption(format!(
                "negative dimensions {}x{}",
                width, height
            )));
        }
        let run_count = usize::try_from(run_count).map_err(|_| {
            CodecError::StreamCorruption(format!("negative run count {}", run_count))
        })?;

        let body = &bytes[HEADER_LEN..];
        if run_count.checked_mul(RECORD_LEN) != Some(body.len()) {
            return Err(CodecError::StreamCorruption(format!(
                "{} runs declared but {} record bytes present",
                run_count,
                body.len()
            )));
        }

        let mut runs = Vec::with_capacity(run_count);
        for (i, chunk) in body.chunks_exact(RECORD_LEN).enumerate() {
            let record: RunRecord = bytemuck::pod_read_unaligned(chunk);
            let run_length = record.run_length;
            if run_length <= 0 {
                return Err(CodecError::StreamCorruption(format!(
                    "record {} has run length {}",
                    i, run_length
                )));
            }
            runs.push(Run::new(record.value, run_length as u32));
        }

        Ok(CompressedStream {
            height,
            width,
            code: RunLengthCode::from_runs(runs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stream() -> CompressedStream {
        let code = RunLengthCode::from_runs(vec![Run::new(7, 3), Run::new(9, 2), Run::new(2, 1)]);
        CompressedStream::new(2, 3, code).unwrap()
    }

    #[test]
    fn test_record_is_packed() {
        assert_eq!(RECORD_LEN, 5);
    }

    #[test]
    fn test_layout() {
        let bytes = sample_stream().to_bytes().unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 3 * RECORD_LEN);
        assert_eq!(&bytes[0..2], &2i16.to_ne_bytes());
        assert_eq!(&bytes[2..4], &3i16.to_ne_bytes());
        assert_eq!(&bytes[4..8], &3i32.to_ne_bytes());
        assert_eq!(bytes[8], 7);
        assert_eq!(&bytes[9..13], &3i32.to_ne_bytes());
        assert_eq!(bytes[13], 9);
        assert_eq!(&bytes[14..18], &2i32.to_ne_bytes());
    }

    #[test]
    fn test_parse_written_stream() {
        let stream = sample_stream();
        let mut cursor = Cursor::new(stream.to_bytes().unwrap());
        let parsed = CompressedStream::read_from(&mut cursor).unwrap();
        assert_eq!(parsed, stream);
        assert_eq!(parsed.height(), 2);
        assert_eq!(parsed.width(), 3);
    }

    #[test]
    fn test_truncated_header() {
        let err = CompressedStream::from_bytes(&[0u8; 5]).unwrap_err();
        assert!(matches!(err, CodecError::StreamCorruption(_)));
    }

    #[test]
    fn test_length_mismatch() {
        let mut bytes = sample_stream().to_bytes().unwrap();
        bytes.pop();
        assert!(matches!(
            CompressedStream::from_bytes(&bytes),
            Err(CodecError::StreamCorruption(_))
        ));

        let mut bytes = sample_stream().to_bytes().unwrap();
        bytes.extend_from_slice(&[1, 0, 0, 0, 0]);
        assert!(matches!(
            CompressedStream::from_bytes(&bytes),
            Err(CodecError::StreamCorruption(_))
        ));
    }

    #[test]
    fn test_negative_fields() {
        let mut bytes = sample_stream().to_bytes().unwrap();
        bytes[0..2].copy_from_slice(&(-2i16).to_ne_bytes());
        assert!(CompressedStream::from_bytes(&bytes).is_err());

        let mut bytes = sample_stream().to_bytes().unwrap();
        bytes[9..13].copy_from_slice(&(-3i32).to_ne_bytes());
        assert!(matches!(
            CompressedStream::from_bytes(&bytes),
            Err(CodecError::StreamCorruption(_))
        ));
    }

    #[test]
    fn test_oversized_dimensions() {
        let err = CompressedStream::new(40_000, 4, RunLengthCode::new()).unwrap_err();
        assert!(matches!(err, CodecError::InvalidDimension(_)));
    }
}
