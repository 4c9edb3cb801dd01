//! Triangular surface mesh decoding.

use std::io::BufRead;
use std::path::Path;

use glam::DVec3;

use crate::cursor::ByteCursor;
use crate::error::{DecodeError, DecodeResult};
use crate::{QUAD_FILE_MAGIC, TRIANGLE_FILE_MAGIC};

/// A triangular surface mesh as stored in `?h.white`, `?h.inflated`, etc.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex coordinates, promoted from the on-disk `f32`.
    pub vertices: Vec<DVec3>,
    /// Triangles as triples of vertex indices.
    pub faces: Vec<[i32; 3]>,
}

impl TriangleMesh {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// Read a triangular surface file from disk.
pub fn read_geometry(path: &Path) -> DecodeResult<TriangleMesh> {
    tracing::debug!("Reading surface geometry from {}", path.display());
    decode_geometry(ByteCursor::open(path)?)
}

/// Decode a triangular surface from a byte stream.
///
/// # Format
///
/// - 3-byte magic `0xFFFFFE`
/// - Two newline-terminated lines (creation stamp, comment)
/// - `i32` vertex count, `i32` face count
/// - `3 × vertex count` `f32` coordinates
/// - `3 × face count` `i32` vertex indices
pub fn decode_geometry<R: BufRead>(mut cursor: ByteCursor<R>) -> DecodeResult<TriangleMesh> {
    match cursor.read_u24()? {
        TRIANGLE_FILE_MAGIC => {}
        QUAD_FILE_MAGIC => {
            return Err(DecodeError::UnsupportedFormat(
                "quadrangle surface format reading not implemented".to_string(),
            ));
        }
        magic => {
            return Err(DecodeError::InvalidFormat(format!(
                "not a recognized surface file (magic {magic:#08x})"
            )));
        }
    }

    cursor.skip_line()?; // creation stamp
    cursor.skip_line()?;

    let vertex_count = cursor.read_count("vertex count")?;
    let face_count = cursor.read_count("face count")?;
    tracing::debug!("Surface has {vertex_count} vertices, {face_count} faces");

    let vertices = cursor
        .read_f32s(vertex_count * 3)?
        .chunks_exact(3)
        .map(|c| DVec3::new(f64::from(c[0]), f64::from(c[1]), f64::from(c[2])))
        .collect();

    let faces = cursor
        .read_i32s(face_count * 3)?
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();

    Ok(TriangleMesh { vertices, faces })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    fn encode(magic: u32, coords: &[[f32; 3]], faces: &[[i32; 3]]) -> Vec<u8> {
        let mut bytes = magic.to_be_bytes()[1..].to_vec();
        bytes.extend_from_slice(b"created by test on Thu Jan  1 00:00:00 2026\n\n");
        bytes.extend_from_slice(&(coords.len() as i32).to_be_bytes());
        bytes.extend_from_slice(&(faces.len() as i32).to_be_bytes());
        for v in coords.iter().flatten() {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        for i in faces.iter().flatten() {
            bytes.extend_from_slice(&i.to_be_bytes());
        }
        bytes
    }

    fn decode(bytes: Vec<u8>) -> DecodeResult<TriangleMesh> {
        decode_geometry(ByteCursor::new(Cursor::new(bytes)))
    }

    #[test]
    fn test_decode_tetrahedron_patch() {
        let coords = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.5, 0.0],
            [-2.25, 0.5, 3.0],
        ];
        let faces = [[0, 1, 2], [1, 2, 3]];

        let mesh = decode(encode(TRIANGLE_FILE_MAGIC, &coords, &faces)).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.faces, faces);
        for (v, c) in mesh.vertices.iter().zip(&coords) {
            assert_eq!(v.to_array(), c.map(f64::from));
        }
    }

    #[test]
    fn test_quad_magic_is_unsupported() {
        let bytes = encode(QUAD_FILE_MAGIC, &[[1.0, 2.0, 3.0]], &[]);
        assert!(matches!(
            decode(bytes),
            Err(DecodeError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_unknown_magic_is_invalid() {
        let bytes = encode(0x00_12_34, &[], &[]);
        assert!(matches!(decode(bytes), Err(DecodeError::InvalidFormat(_))));
    }

    #[test]
    fn test_truncated_faces() {
        let mut bytes = encode(TRIANGLE_FILE_MAGIC, &[[0.0; 3]; 3], &[[0, 1, 2]]);
        bytes.truncate(bytes.len() - 2);
        assert!(matches!(
            decode(bytes),
            Err(DecodeError::TruncatedRead { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = read_geometry(Path::new("/nonexistent/lh.white")).unwrap_err();
        assert!(matches!(err, DecodeError::Io { .. }));
    }

    proptest! {
        #[test]
        fn prop_decoded_shapes_match_counts(
            coords in prop::collection::vec(prop::array::uniform3(-100.0f32..100.0), 3..40),
            face_seed in prop::collection::vec(prop::array::uniform3(any::<u16>()), 0..40),
        ) {
            let n = coords.len() as i32;
            let faces: Vec<[i32; 3]> = face_seed
                .iter()
                .map(|f| f.map(|i| i32::from(i) % n))
                .collect();

            let mesh = decode(encode(TRIANGLE_FILE_MAGIC, &coords, &faces)).unwrap();

            prop_assert_eq!(mesh.vertex_count(), coords.len());
            prop_assert_eq!(mesh.face_count(), faces.len());
            prop_assert!(mesh.faces.iter().flatten().all(|&i| (0..n).contains(&i)));
            for (v, c) in mesh.vertices.iter().zip(&coords) {
                prop_assert_eq!(v.to_array(), c.map(f64::from));
            }
        }
    }
}
