//! Big-endian binary cursor.
//!
//! Every FreeSurfer binary format is a flat sequence of big-endian scalars,
//! with the odd 3-byte magic number mixed in. [`ByteCursor`] reads those
//! values from any buffered stream and keeps track of the absolute offset so
//! truncation errors can say where the data ran out.
//!
//! Bulk reads never allocate from the declared count up front. They read
//! whatever the stream holds (up to the requested length) and fail with
//! [`DecodeError::TruncatedRead`] when it comes up short, so a corrupt count
//! cannot trigger a huge allocation.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{DecodeError, DecodeResult};

/// Forward-only big-endian reader over a buffered byte stream.
#[derive(Debug)]
pub struct ByteCursor<R> {
    inner: R,
    offset: u64,
}

/// Open a file, attaching the path to any failure.
pub(crate) fn open_file(path: &Path) -> DecodeResult<File> {
    File::open(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl ByteCursor<BufReader<File>> {
    /// Open a file for decoding.
    ///
    /// The handle lives as long as the cursor, so it is closed when the
    /// decode that owns the cursor returns, whichever way it returns.
    pub fn open(path: &Path) -> DecodeResult<Self> {
        Ok(Self::new(BufReader::new(open_file(path)?)))
    }
}

impl<R: BufRead> ByteCursor<R> {
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Number of bytes consumed so far.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read exactly `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> DecodeResult<Vec<u8>> {
        let offset = self.offset;
        let mut buf = Vec::new();
        let read = (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut buf)
            .map_err(|source| DecodeError::Read { offset, source })?;
        self.offset += read as u64;
        if read < len {
            return Err(DecodeError::TruncatedRead {
                offset,
                expected: len,
                available: read,
            });
        }
        Ok(buf)
    }

    /// Discard exactly `len` bytes.
    pub fn skip(&mut self, len: u64) -> DecodeResult<()> {
        let offset = self.offset;
        let copied = io::copy(&mut (&mut self.inner).take(len), &mut io::sink())
            .map_err(|source| DecodeError::Read { offset, source })?;
        self.offset += copied;
        if copied < len {
            return Err(DecodeError::TruncatedRead {
                offset,
                expected: len as usize,
                available: copied as usize,
            });
        }
        Ok(())
    }

    /// Advance to an absolute offset by discarding bytes.
    ///
    /// Works on streams that cannot seek (gzip), but only forwards.
    pub fn seek_to(&mut self, target: u64) -> DecodeResult<()> {
        if target < self.offset {
            return Err(DecodeError::InvalidFormat(format!(
                "cannot seek back to offset {target} from {}",
                self.offset
            )));
        }
        self.skip(target - self.offset)
    }

    /// Discard one newline-terminated line.
    pub fn skip_line(&mut self) -> DecodeResult<()> {
        let offset = self.offset;
        let mut line = Vec::new();
        let read = self
            .inner
            .read_until(b'\n', &mut line)
            .map_err(|source| DecodeError::Read { offset, source })?;
        self.offset += read as u64;
        if line.last() != Some(&b'\n') {
            return Err(DecodeError::TruncatedRead {
                offset,
                expected: read + 1,
                available: read,
            });
        }
        Ok(())
    }

    /// Read a 3-byte big-endian unsigned integer, `(b0 << 16) | (b1 << 8) | b2`.
    pub fn read_u24(&mut self) -> DecodeResult<u32> {
        Ok(BigEndian::read_u24(&self.read_bytes(3)?))
    }

    pub fn read_i8(&mut self) -> DecodeResult<i8> {
        let bytes = self.read_bytes(1)?;
        Ok(i8::from_be_bytes([bytes[0]]))
    }

    pub fn read_i16(&mut self) -> DecodeResult<i16> {
        Ok(BigEndian::read_i16(&self.read_bytes(2)?))
    }

    pub fn read_i32(&mut self) -> DecodeResult<i32> {
        Ok(BigEndian::read_i32(&self.read_bytes(4)?))
    }

    pub fn read_f32(&mut self) -> DecodeResult<f32> {
        Ok(BigEndian::read_f32(&self.read_bytes(4)?))
    }

    /// Read an int32 count field that must not be negative.
    pub fn read_count(&mut self, what: &str) -> DecodeResult<usize> {
        let offset = self.offset;
        let value = self.read_i32()?;
        usize::try_from(value).map_err(|_| {
            DecodeError::InvalidFormat(format!("negative {what} {value} at offset {offset}"))
        })
    }

    pub fn read_i8s(&mut self, count: usize) -> DecodeResult<Vec<i8>> {
        let bytes = self.read_bytes(count)?;
        Ok(bytes.into_iter().map(|b| i8::from_be_bytes([b])).collect())
    }

    pub fn read_i16s(&mut self, count: usize) -> DecodeResult<Vec<i16>> {
        let bytes = self.read_bytes(byte_len(count, 2)?)?;
        let mut values = vec![0; count];
        BigEndian::read_i16_into(&bytes, &mut values);
        Ok(values)
    }

    pub fn read_i32s(&mut self, count: usize) -> DecodeResult<Vec<i32>> {
        let bytes = self.read_bytes(byte_len(count, 4)?)?;
        let mut values = vec![0; count];
        BigEndian::read_i32_into(&bytes, &mut values);
        Ok(values)
    }

    pub fn read_f32s(&mut self, count: usize) -> DecodeResult<Vec<f32>> {
        let bytes = self.read_bytes(byte_len(count, 4)?)?;
        let mut values = vec![0.0; count];
        BigEndian::read_f32_into(&bytes, &mut values);
        Ok(values)
    }
}

fn byte_len(count: usize, width: usize) -> DecodeResult<usize> {
    count.checked_mul(width).ok_or_else(|| {
        DecodeError::InvalidFormat(format!("element count {count} overflows the address space"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn cursor(bytes: &[u8]) -> ByteCursor<Cursor<Vec<u8>>> {
        ByteCursor::new(Cursor::new(bytes.to_vec()))
    }

    #[test]
    fn test_read_u24_is_unsigned() {
        let mut c = cursor(&[0xFF, 0xFF, 0xFE]);
        assert_eq!(c.read_u24().unwrap(), 16_777_214);
        assert_eq!(c.offset(), 3);
    }

    #[test]
    fn test_read_mixed_widths_advances_offset() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(-2i32).to_be_bytes());
        bytes.extend_from_slice(&(-300i16).to_be_bytes());
        bytes.extend_from_slice(&1.5f32.to_be_bytes());
        bytes.push(0x80);

        let mut c = cursor(&bytes);
        assert_eq!(c.read_i32().unwrap(), -2);
        assert_eq!(c.read_i16().unwrap(), -300);
        assert_eq!(c.offset(), 6);
        assert!((c.read_f32().unwrap() - 1.5).abs() < f32::EPSILON);
        assert_eq!(c.read_i8().unwrap(), -128);
        assert_eq!(c.offset(), 11);
    }

    #[test]
    fn test_bulk_reads() {
        let bytes: Vec<u8> = [1i16, -1, 256].iter().flat_map(|v| v.to_be_bytes()).collect();
        let mut c = cursor(&bytes);
        assert_eq!(c.read_i16s(3).unwrap(), vec![1, -1, 256]);
        assert_eq!(c.offset(), 6);
    }

    #[test]
    fn test_truncated_read_reports_position() {
        let mut c = cursor(&[0, 0, 0, 1, 0, 0]);
        assert_eq!(c.read_i32().unwrap(), 1);
        match c.read_i32s(2) {
            Err(DecodeError::TruncatedRead {
                offset,
                expected,
                available,
            }) => {
                assert_eq!(offset, 4);
                assert_eq!(expected, 8);
                assert_eq!(available, 2);
            }
            other => panic!("expected truncated read, got {other:?}"),
        }
    }

    #[test]
    fn test_skip_line_and_seek() {
        let mut c = cursor(b"created by test\n\nabcdefgh");
        c.skip_line().unwrap();
        c.skip_line().unwrap();
        assert_eq!(c.offset(), 17);
        c.seek_to(20).unwrap();
        assert_eq!(c.read_bytes(2).unwrap(), b"de");
        assert!(matches!(c.seek_to(0), Err(DecodeError::InvalidFormat(_))));
        assert!(matches!(c.skip(10), Err(DecodeError::TruncatedRead { .. })));
    }

    #[test]
    fn test_skip_line_without_newline_is_truncated() {
        let mut c = cursor(b"no newline");
        assert!(matches!(
            c.skip_line(),
            Err(DecodeError::TruncatedRead { .. })
        ));
    }

    #[test]
    fn test_negative_count_is_invalid() {
        let mut c = cursor(&(-5i32).to_be_bytes());
        assert!(matches!(
            c.read_count("vertex count"),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_u24_never_sign_extends(b0: u8, b1: u8, b2: u8) {
            let mut c = cursor(&[b0, b1, b2]);
            let value = c.read_u24().unwrap();
            prop_assert_eq!(value, (u32::from(b0) << 16) | (u32::from(b1) << 8) | u32::from(b2));
            prop_assert!(value <= 0x00FF_FFFF);
        }
    }
}
