//! Load FreeSurfer subject surfaces.
//!
//! A [`Surface`] ties together the geometry, curvature and labels of one
//! hemisphere of one subject, located under a [`SubjectsDir`]. The file
//! decoding itself lives in [`surfer_decode`], re-exported here as
//! [`decode`].
//!
//! ```no_run
//! use surfer::{Hemisphere, SubjectsDir, Surface};
//!
//! let subjects = SubjectsDir::from_env()?;
//! let mut surface = Surface::new("bert", Hemisphere::Lh, "inflated", &subjects);
//! surface.load_geometry()?;
//! surface.load_curvature()?;
//! surface.load_label("cortex")?;
//! let _max_x = surface.x()?.fold(f64::NEG_INFINITY, f64::max);
//! # Ok::<(), surfer::Error>(())
//! ```

pub mod config;
mod error;
mod surface;

pub use surfer_decode as decode;

pub use config::{Hemisphere, SUBJECTS_DIR_ENV, SubjectsDir};
pub use error::{Error, Result};
pub use surface::{Axis, Curvature, Surface};
pub use surfer_decode::{ColorTable, ColorTableEntry, ScalarData, TriangleMesh, load_scalar_data};
