//! Decode FreeSurfer surface-based file formats.
//!
//! This crate provides pure synchronous decoders for the binary and text
//! files found in a FreeSurfer subject directory. Every function opens at
//! most one file, reads it to completion or fails, and closes it before
//! returning - the caller controls parallelism.
//!
//! # Design principles
//!
//! - **Read-only**: No encoders
//! - **All or nothing**: A failed decode never returns partial data
//! - **Reader-generic**: Each `read_*` function has a `decode_*` twin taking
//!   any buffered stream
//!
//! # Key functions
//!
//! - [`read_geometry`]: Triangular surface mesh (`?h.white`, `?h.inflated`, ...)
//! - [`read_curvature`]: Per-vertex scalars (`?h.curv`), old and new layouts
//! - [`read_annotation`]: Color table of a `.annot` file
//! - [`read_label`]: Vertex indices of a `.label` file
//! - [`load_scalar_data`]: Overlay values via the image library or `.mgh`/`.mgz`

mod error;

pub mod annotation;
pub mod cursor;
pub mod curvature;
pub mod geometry;
pub mod label;
pub mod volume;

pub use annotation::{ColorTable, ColorTableEntry, decode_annotation, read_annotation};
pub use cursor::ByteCursor;
pub use curvature::{binarize, decode_curvature, read_curvature};
pub use error::{DecodeError, DecodeResult};
pub use geometry::{TriangleMesh, decode_geometry, read_geometry};
pub use label::{decode_label, read_label};
pub use volume::{
    MghDatatype, MghHeader, MghVolume, ScalarData, VoxelData, decode_mgh, load_scalar_data,
    read_mgh,
};

/// 3-byte magic of a triangular surface file.
pub const TRIANGLE_FILE_MAGIC: u32 = 0x00FF_FFFE;

/// 3-byte magic of a quadrangle surface file, reused by new-format curvature.
pub const QUAD_FILE_MAGIC: u32 = 0x00FF_FFFF;
