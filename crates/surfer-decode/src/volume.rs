//! Scalar volume loading (`.mgh` / `.mgz`, or anything the image library reads).

use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use image::ImageError;

use crate::cursor::{ByteCursor, open_file};
use crate::error::{DecodeError, DecodeResult};

/// The only MGH header version accepted.
pub const MGH_VERSION: i32 = 1;

/// Byte offset of the first voxel in an MGH file.
pub const MGH_DATA_OFFSET: u64 = 284;

/// Voxel element type selected by the MGH datatype code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MghDatatype {
    /// Code 0, one byte per voxel.
    Byte,
    /// Code 1.
    Int32,
    /// Code 3.
    Float32,
    /// Code 4.
    Int16,
}

impl MghDatatype {
    pub fn from_code(code: i32) -> DecodeResult<Self> {
        match code {
            0 => Ok(Self::Byte),
            1 => Ok(Self::Int32),
            3 => Ok(Self::Float32),
            4 => Ok(Self::Int16),
            _ => Err(DecodeError::UnknownDatatype(code)),
        }
    }

    /// The on-disk datatype code.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Byte => 0,
            Self::Int32 => 1,
            Self::Float32 => 3,
            Self::Int16 => 4,
        }
    }

    /// Bytes per voxel.
    #[must_use]
    pub fn byte_width(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Int16 => 2,
            Self::Int32 | Self::Float32 => 4,
        }
    }
}

/// The fields of an MGH header this decoder uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MghHeader {
    pub version: i32,
    pub dims: [usize; 3],
    pub frames: usize,
    pub datatype: MghDatatype,
}

impl MghHeader {
    /// Number of voxels across all frames.
    pub fn voxel_count(&self) -> DecodeResult<usize> {
        self.dims
            .iter()
            .chain(std::iter::once(&self.frames))
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| {
                DecodeError::InvalidFormat(format!(
                    "volume of {:?} x {} frames is too large",
                    self.dims, self.frames
                ))
            })
    }
}

/// Flat voxel values in file order.
#[derive(Debug, Clone, PartialEq)]
pub enum VoxelData {
    Int8(Vec<i8>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
    Int16(Vec<i16>),
}

impl VoxelData {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int8(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Int16(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widen every value to `f64`.
    #[must_use]
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Self::Int8(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::Int32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::Float32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::Int16(v) => v.iter().map(|&x| f64::from(x)).collect(),
        }
    }
}

/// A decoded MGH/MGZ volume.
#[derive(Debug, Clone, PartialEq)]
pub struct MghVolume {
    pub header: MghHeader,
    pub data: VoxelData,
}

/// Scalar data loaded by [`load_scalar_data`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarData {
    /// Decoded by the image library: luminance as `f32`, x varying fastest.
    Image(Vec<f32>),
    /// Decoded by the MGH reader: raw voxels in file order.
    Mgh(MghVolume),
}

impl ScalarData {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Image(v) => v.len(),
            Self::Mgh(volume) => volume.data.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            Self::Image(v) => v.iter().map(|&x| f64::from(x)).collect(),
            Self::Mgh(volume) => volume.data.to_f64(),
        }
    }
}

/// Load scalar overlay data from a file.
///
/// The image library gets the first go at the file. Only when it does not
/// recognize the format does this fall back to [`read_mgh`]; any other image
/// failure is returned as is.
pub fn load_scalar_data(path: &Path) -> DecodeResult<ScalarData> {
    match image::open(path) {
        Ok(img) => {
            tracing::debug!(
                "Decoded {} as a {}x{} image",
                path.display(),
                img.width(),
                img.height()
            );
            Ok(ScalarData::Image(img.to_luma32f().into_raw()))
        }
        Err(ImageError::Unsupported(reason)) => {
            tracing::debug!(
                "Image library cannot read {} ({reason}), trying MGH",
                path.display()
            );
            read_mgh(path).map(ScalarData::Mgh)
        }
        Err(ImageError::IoError(source)) => Err(DecodeError::Io {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) => Err(e.into()),
    }
}

/// Read an `.mgh` file, or a gzip-compressed `.mgz` file.
pub fn read_mgh(path: &Path) -> DecodeResult<MghVolume> {
    match path.extension().and_then(OsStr::to_str) {
        Some("mgz") => {
            tracing::debug!("Reading compressed MGH volume from {}", path.display());
            let reader = BufReader::new(GzDecoder::new(open_file(path)?));
            decode_mgh(ByteCursor::new(reader))
        }
        Some("mgh") => {
            tracing::debug!("Reading MGH volume from {}", path.display());
            decode_mgh(ByteCursor::open(path)?)
        }
        _ => Err(DecodeError::UnsupportedFormat(format!(
            "{} is neither readable by the image library nor an .mgh/.mgz file",
            path.display()
        ))),
    }
}

/// Decode an uncompressed MGH byte stream.
///
/// # Format
///
/// - `i32` version (must be 1)
/// - 3 × `i32` dimensions, `i32` frames, `i32` datatype code
/// - padding up to byte [`MGH_DATA_OFFSET`]
/// - `dim1 × dim2 × dim3 × frames` big-endian voxels
pub fn decode_mgh<R: BufRead>(mut cursor: ByteCursor<R>) -> DecodeResult<MghVolume> {
    let version = cursor.read_i32()?;
    if version != MGH_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }

    let dims = [
        cursor.read_count("width")?,
        cursor.read_count("height")?,
        cursor.read_count("depth")?,
    ];
    let frames = cursor.read_count("frame count")?;
    let datatype = MghDatatype::from_code(cursor.read_i32()?)?;
    let header = MghHeader {
        version,
        dims,
        frames,
        datatype,
    };
    tracing::debug!("MGH header: {dims:?} x {frames} frames of {datatype:?}");

    cursor.seek_to(MGH_DATA_OFFSET)?;

    let count = header.voxel_count()?;
    let data = match datatype {
        MghDatatype::Byte => VoxelData::Int8(cursor.read_i8s(count)?),
        MghDatatype::Int32 => VoxelData::Int32(cursor.read_i32s(count)?),
        MghDatatype::Float32 => VoxelData::Float32(cursor.read_f32s(count)?),
        MghDatatype::Int16 => VoxelData::Int16(cursor.read_i16s(count)?),
    };

    Ok(MghVolume { header, data })
}
