//! Vertex annotation and color table decoding.

use std::io::BufRead;
use std::path::Path;

use crate::cursor::ByteCursor;
use crate::error::{DecodeError, DecodeResult};

/// The only color table layout this decoder understands.
pub const CTAB_VERSION: i32 = -2;

/// Largest declared table size that is zero-filled in memory.
pub const MAX_CTAB_ENTRIES: usize = 1 << 20;

/// One row of an annotation color table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorTableEntry {
    pub r: i32,
    pub g: i32,
    pub b: i32,
    pub a: i32,
    /// Packed color id, as stored per vertex in the annotation array.
    pub id: i32,
}

impl ColorTableEntry {
    #[must_use]
    pub fn new(r: i32, g: i32, b: i32, a: i32) -> Self {
        Self {
            r,
            g,
            b,
            a,
            id: Self::packed_id(r, g, b, a),
        }
    }

    /// `r + g·2⁸ + b·2¹⁶ + a·2²⁴`, wrapping like the on-disk int32.
    #[must_use]
    pub fn packed_id(r: i32, g: i32, b: i32, a: i32) -> i32 {
        r.wrapping_add(g.wrapping_shl(8))
            .wrapping_add(b.wrapping_shl(16))
            .wrapping_add(a.wrapping_shl(24))
    }
}

/// Color lookup table of an annotation.
///
/// Holds the declared number of entries. Entries that were deleted upstream
/// (declared but never stored) stay zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorTable {
    pub entries: Vec<ColorTableEntry>,
}

impl ColorTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the entry whose packed id matches `id`.
    #[must_use]
    pub fn find_by_id(&self, id: i32) -> Option<(usize, &ColorTableEntry)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.id == id)
    }
}

/// Read a `.annot` file from disk.
pub fn read_annotation(path: &Path) -> DecodeResult<Option<ColorTable>> {
    tracing::debug!("Reading annotation from {}", path.display());
    decode_annotation(ByteCursor::open(path)?)
}

/// Decode an annotation and return its color table, if it has one.
///
/// The per-vertex annotation values are parsed but not returned. `Ok(None)`
/// means the file has no table, or a table in a layout other than
/// [`CTAB_VERSION`].
///
/// # Format
///
/// - `i32` vertex count, then `(vertex, packed id)` `i32` pairs
/// - `i32` table-present flag
/// - `i32` table version, `i32` entry count
/// - `i32` length + bytes of the original table path
/// - `i32` number of stored entries, each: `i32` structure index,
///   `i32` length + bytes of the name, 4 × `i32` RGBA
pub fn decode_annotation<R: BufRead>(
    mut cursor: ByteCursor<R>,
) -> DecodeResult<Option<ColorTable>> {
    let vertex_count = cursor.read_count("vertex count")?;
    let pairs = cursor.read_i32s(vertex_count * 2)?;
    let annotation: Vec<i32> = pairs.chunks_exact(2).map(|pair| pair[1]).collect();
    tracing::debug!("Annotation covers {} vertices", annotation.len());

    if cursor.read_i32()? == 0 {
        tracing::warn!("Annotation has no color table");
        return Ok(None);
    }

    let version = cursor.read_i32()?;
    if version != CTAB_VERSION {
        tracing::warn!("Unsupported color table version {version}, ignoring table");
        return Ok(None);
    }

    let entry_count = cursor.read_count("color table entry count")?;
    let path_len = cursor.read_count("color table path length")?;
    cursor.skip(path_len as u64)?;

    let stored = cursor.read_count("stored color table entries")?;
    if stored > entry_count {
        return Err(DecodeError::InvalidFormat(format!(
            "color table stores {stored} entries but declares only {entry_count}"
        )));
    }
    if stored < entry_count {
        tracing::warn!(
            "Color table stores {stored} of {entry_count} entries, the rest stay zeroed"
        );
    }

    let mut entries = Vec::new();
    for _ in 0..stored {
        let _structure = cursor.read_i32()?;
        let name_len = cursor.read_count("structure name length")?;
        cursor.skip(name_len as u64)?;
        let rgba = cursor.read_i32s(4)?;
        entries.push(ColorTableEntry::new(rgba[0], rgba[1], rgba[2], rgba[3]));
    }
    if entry_count > MAX_CTAB_ENTRIES {
        return Err(DecodeError::InvalidFormat(format!(
            "color table declares {entry_count} entries, more than {MAX_CTAB_ENTRIES}"
        )));
    }
    entries.resize(entry_count, ColorTableEntry::default());

    Ok(Some(ColorTable { entries }))
}
