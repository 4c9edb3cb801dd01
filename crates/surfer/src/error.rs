//! Error types for the surface container.

use surfer_decode::DecodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unusable configuration, e.g. `SUBJECTS_DIR` unset.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An operation needs data that has not been loaded yet.
    #[error("{0} must be loaded first")]
    MissingDependency(&'static str),

    /// A label refers to a vertex the surface does not have.
    #[error("label '{label}' lists vertex {index}, but the surface has {vertex_count} vertices")]
    LabelOutOfRange {
        label: String,
        index: i32,
        vertex_count: usize,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

pub type Result<T> = std::result::Result<T, Error>;
