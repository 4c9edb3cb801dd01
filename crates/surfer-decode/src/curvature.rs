//! Per-vertex curvature decoding.

use std::io::BufRead;
use std::path::Path;

use crate::QUAD_FILE_MAGIC;
use crate::cursor::ByteCursor;
use crate::error::DecodeResult;

/// Fixed-point scale of the old curvature format (two implied decimals).
const OLD_FORMAT_SCALE: f32 = 100.0;

/// Read a curvature file (`?h.curv`, `?h.thickness`, ...) from disk.
pub fn read_curvature(path: &Path) -> DecodeResult<Vec<f32>> {
    tracing::debug!("Reading curvature from {}", path.display());
    decode_curvature(ByteCursor::open(path)?)
}

/// Decode per-vertex curvature values.
///
/// Two layouts share the leading 3-byte field:
///
/// - New format: magic `0xFFFFFF`, then `i32` vertex count, `i32` face
///   count, `i32` values per vertex, then one `f32` per vertex.
/// - Old format: the 3-byte field *is* the vertex count, followed by a
///   3-byte face count and one `i16` per vertex in hundredths.
pub fn decode_curvature<R: BufRead>(mut cursor: ByteCursor<R>) -> DecodeResult<Vec<f32>> {
    let magic = cursor.read_u24()?;

    if magic == QUAD_FILE_MAGIC {
        let vertex_count = cursor.read_count("vertex count")?;
        let _face_count = cursor.read_i32()?;
        let _values_per_vertex = cursor.read_i32()?;
        tracing::debug!("New-format curvature with {vertex_count} values");
        return cursor.read_f32s(vertex_count);
    }

    let vertex_count = magic as usize;
    let _face_count = cursor.read_u24()?;
    tracing::debug!("Old-format curvature with {vertex_count} values");
    let raw = cursor.read_i16s(vertex_count)?;
    Ok(raw
        .into_iter()
        .map(|v| f32::from(v) / OLD_FORMAT_SCALE)
        .collect())
}

/// Binarize curvature: `1` where the value is positive, else `0`.
#[must_use]
pub fn binarize(curvature: &[f32]) -> Vec<u8> {
    curvature.iter().map(|&v| u8::from(v > 0.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecodeError;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn encode_old(values: &[i16]) -> Vec<u8> {
        let mut bytes = (values.len() as u32).to_be_bytes()[1..].to_vec();
        bytes.extend_from_slice(&[0, 0, 7]);
        for v in values {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        bytes
    }

    fn decode(bytes: Vec<u8>) -> DecodeResult<Vec<f32>> {
        decode_curvature(ByteCursor::new(Cursor::new(bytes)))
    }

    #[test]
    fn test_old_format_hundredths() {
        let curv = decode(encode_old(&[100, -50, 0, 200, 1])).unwrap();
        let expected = [1.0, -0.5, 0.0, 2.0, 0.01];
        assert_eq!(curv.len(), expected.len());
        for (got, want) in curv.iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "{got} != {want}");
        }
    }

    #[test]
    fn test_new_format() {
        let mut bytes = QUAD_FILE_MAGIC.to_be_bytes()[1..].to_vec();
        for header in [3i32, 2, 1] {
            bytes.extend_from_slice(&header.to_be_bytes());
        }
        for v in [0.25f32, -1.75, 3.0] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }

        assert_eq!(decode(bytes).unwrap(), vec![0.25, -1.75, 3.0]);
    }

    #[test]
    fn test_new_format_truncated() {
        let mut bytes = QUAD_FILE_MAGIC.to_be_bytes()[1..].to_vec();
        for header in [3i32, 2, 1] {
            bytes.extend_from_slice(&header.to_be_bytes());
        }
        bytes.extend_from_slice(&1.0f32.to_be_bytes());

        assert!(matches!(
            decode(bytes),
            Err(DecodeError::TruncatedRead { .. })
        ));
    }

    #[test]
    fn test_binarize() {
        assert_eq!(binarize(&[0.5, 0.0, -0.1, 2.0]), vec![1, 0, 0, 1]);
    }

    proptest! {
        #[test]
        fn prop_old_format_divides_by_hundred(values in prop::collection::vec(any::<i16>(), 0..64)) {
            let curv = decode(encode_old(&values)).unwrap();
            prop_assert_eq!(curv.len(), values.len());
            for (got, raw) in curv.iter().zip(&values) {
                prop_assert_eq!(*got, f32::from(*raw) / 100.0);
            }
        }
    }
}
