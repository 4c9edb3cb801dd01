//! Subjects directory configuration.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Environment variable FreeSurfer uses for the subjects directory.
pub const SUBJECTS_DIR_ENV: &str = "SUBJECTS_DIR";

/// Root directory holding one directory per subject.
///
/// Passed explicitly to [`Surface::new`](crate::Surface::new) so nothing in
/// the container reads process state behind the caller's back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectsDir(PathBuf);

impl SubjectsDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Read the directory from `SUBJECTS_DIR`.
    pub fn from_env() -> Result<Self> {
        Self::from_env_var(SUBJECTS_DIR_ENV)
    }

    /// Read the directory from the named environment variable.
    pub fn from_env_var(name: &str) -> Result<Self> {
        match env::var_os(name) {
            Some(value) if !value.is_empty() => {
                let dir = Self::new(value);
                tracing::debug!("Using subjects directory {}", dir.0.display());
                Ok(dir)
            }
            _ => Err(Error::Configuration(format!(
                "the {name} environment variable must point at the subjects directory"
            ))),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Directory of one subject.
    #[must_use]
    pub fn subject_path(&self, subject_id: &str) -> PathBuf {
        self.0.join(subject_id)
    }
}

/// Cortical hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    Lh,
    Rh,
}

impl Hemisphere {
    /// File name prefix, `"lh"` or `"rh"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lh => "lh",
            Self::Rh => "rh",
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hemisphere {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lh" => Ok(Self::Lh),
            "rh" => Ok(Self::Rh),
            other => Err(Error::Configuration(format!(
                "unknown hemisphere '{other}' (expected 'lh' or 'rh')"
            ))),
        }
    }
}
