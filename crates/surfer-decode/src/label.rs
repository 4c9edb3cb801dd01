//! Plain-text `.label` decoding.
//!
//! A label file is a two-line header (comment, vertex count) followed by one
//! row per vertex: `index x y z value`. Only the index column is used.

use std::io::BufRead;
use std::path::Path;

use crate::cursor::ByteCursor;
use crate::error::{DecodeError, DecodeResult};

const HEADER_LINES: usize = 2;

/// Read the vertex indices of a `.label` file.
pub fn read_label(path: &Path) -> DecodeResult<Vec<i32>> {
    tracing::debug!("Reading label from {}", path.display());
    decode_label(ByteCursor::open(path)?.into_inner())
}

/// Parse vertex indices from label text, in file order.
pub fn decode_label<R: BufRead>(reader: R) -> DecodeResult<Vec<i32>> {
    let mut indices = Vec::new();
    let mut offset = 0u64;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| DecodeError::Read { offset, source })?;
        offset += line.len() as u64 + 1;
        if line_no < HEADER_LINES {
            continue;
        }
        let Some(first) = line.split_whitespace().next() else {
            continue;
        };
        if first.starts_with('#') {
            continue;
        }
        let index = first.parse::<i32>().map_err(|e| {
            DecodeError::InvalidFormat(format!(
                "line {}: invalid vertex index '{first}': {e}",
                line_no + 1
            ))
        })?;
        indices.push(index);
    }

    tracing::debug!("Label lists {} vertices", indices.len());
    Ok(indices)
}
