//! In-memory container for one subject's hemisphere surface.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use glam::{DMat4, DVec3};
use surfer_decode::{
    ColorTable, TriangleMesh, binarize, read_annotation, read_curvature, read_geometry, read_label,
};

use crate::config::{Hemisphere, SubjectsDir};
use crate::error::{Error, Result};

/// Coordinate axis of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// Curvature values with their sign mask.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Curvature {
    pub values: Vec<f32>,
    /// `1` where the curvature is positive (sulcal), else `0`.
    pub binary: Vec<u8>,
}

/// Surface of one hemisphere of one subject.
///
/// Geometry, curvature and labels are loaded independently and on demand.
/// Loading again replaces what was there; a failed load leaves the surface
/// as it was.
#[derive(Debug, Clone)]
pub struct Surface {
    subject_id: String,
    hemi: Hemisphere,
    surf: String,
    data_path: PathBuf,
    geometry: Option<TriangleMesh>,
    curvature: Option<Curvature>,
    labels: HashMap<String, Vec<u8>>,
}

impl Surface {
    /// Create a surface for `subject_id` under `subjects_dir`.
    ///
    /// `surf` names the surface file, e.g. `"white"` or `"inflated"`.
    pub fn new(
        subject_id: impl Into<String>,
        hemi: Hemisphere,
        surf: impl Into<String>,
        subjects_dir: &SubjectsDir,
    ) -> Self {
        let subject_id = subject_id.into();
        let data_path = subjects_dir.subject_path(&subject_id);
        Self {
            subject_id,
            hemi,
            surf: surf.into(),
            data_path,
            geometry: None,
            curvature: None,
            labels: HashMap::new(),
        }
    }

    /// Create a surface, locating subjects through `SUBJECTS_DIR`.
    pub fn from_env(
        subject_id: impl Into<String>,
        hemi: Hemisphere,
        surf: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self::new(subject_id, hemi, surf, &SubjectsDir::from_env()?))
    }

    #[must_use]
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    #[must_use]
    pub fn hemi(&self) -> Hemisphere {
        self.hemi
    }

    #[must_use]
    pub fn surf(&self) -> &str {
        &self.surf
    }

    /// The subject's directory.
    #[must_use]
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    #[must_use]
    pub fn geometry_path(&self) -> PathBuf {
        self.data_path
            .join("surf")
            .join(format!("{}.{}", self.hemi, self.surf))
    }

    #[must_use]
    pub fn curvature_path(&self) -> PathBuf {
        self.data_path.join("surf").join(format!("{}.curv", self.hemi))
    }

    #[must_use]
    pub fn label_path(&self, name: &str) -> PathBuf {
        self.data_path
            .join("label")
            .join(format!("{}.{name}.label", self.hemi))
    }

    #[must_use]
    pub fn annotation_path(&self, name: &str) -> PathBuf {
        self.data_path
            .join("label")
            .join(format!("{}.{name}.annot", self.hemi))
    }

    /// Load vertices and faces from `surf/{hemi}.{surf}`.
    pub fn load_geometry(&mut self) -> Result<()> {
        let mesh = read_geometry(&self.geometry_path())?;
        tracing::info!(
            "Loaded {} {} geometry for {}: {} vertices, {} faces",
            self.hemi,
            self.surf,
            self.subject_id,
            mesh.vertex_count(),
            mesh.face_count()
        );
        self.geometry = Some(mesh);
        Ok(())
    }

    /// Load curvature from `surf/{hemi}.curv` and derive its sign mask.
    pub fn load_curvature(&mut self) -> Result<()> {
        let values = read_curvature(&self.curvature_path())?;
        tracing::info!(
            "Loaded {} curvature for {}: {} values",
            self.hemi,
            self.subject_id,
            values.len()
        );
        let binary = binarize(&values);
        self.curvature = Some(Curvature { values, binary });
        Ok(())
    }

    /// Load `label/{hemi}.{name}.label` as a per-vertex indicator.
    ///
    /// Needs geometry for the vertex count.
    pub fn load_label(&mut self, name: &str) -> Result<()> {
        let vertex_count = self.geometry()?.vertex_count();
        let indices = read_label(&self.label_path(name))?;

        let mut indicator = vec![0u8; vertex_count];
        for index in indices {
            let slot = usize::try_from(index)
                .ok()
                .and_then(|i| indicator.get_mut(i))
                .ok_or_else(|| Error::LabelOutOfRange {
                    label: name.to_string(),
                    index,
                    vertex_count,
                })?;
            *slot = 1;
        }

        tracing::info!(
            "Loaded label '{name}' for {} {}: {} of {vertex_count} vertices",
            self.subject_id,
            self.hemi,
            indicator.iter().filter(|&&v| v == 1).count()
        );
        self.labels.insert(name.to_string(), indicator);
        Ok(())
    }

    /// Decode the color table of `label/{hemi}.{name}.annot`.
    ///
    /// Nothing is stored on the surface. `Ok(None)` when the annotation has
    /// no table in a supported layout.
    pub fn load_annotation(&self, name: &str) -> Result<Option<ColorTable>> {
        Ok(read_annotation(&self.annotation_path(name))?)
    }

    pub fn geometry(&self) -> Result<&TriangleMesh> {
        self.geometry
            .as_ref()
            .ok_or(Error::MissingDependency("geometry"))
    }

    #[must_use]
    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }

    pub fn coords(&self) -> Result<&[DVec3]> {
        Ok(&self.geometry()?.vertices)
    }

    pub fn faces(&self) -> Result<&[[i32; 3]]> {
        Ok(&self.geometry()?.faces)
    }

    /// One coordinate of every vertex, in vertex order.
    pub fn axis(&self, axis: Axis) -> Result<impl ExactSizeIterator<Item = f64> + '_> {
        let column = axis as usize;
        Ok(self.coords()?.iter().map(move |v| v[column]))
    }

    pub fn x(&self) -> Result<impl ExactSizeIterator<Item = f64> + '_> {
        self.axis(Axis::X)
    }

    pub fn y(&self) -> Result<impl ExactSizeIterator<Item = f64> + '_> {
        self.axis(Axis::Y)
    }

    pub fn z(&self) -> Result<impl ExactSizeIterator<Item = f64> + '_> {
        self.axis(Axis::Z)
    }

    pub fn curvature(&self) -> Result<&[f32]> {
        self.curvature
            .as_ref()
            .map(|c| c.values.as_slice())
            .ok_or(Error::MissingDependency("curvature"))
    }

    pub fn binary_curvature(&self) -> Result<&[u8]> {
        self.curvature
            .as_ref()
            .map(|c| c.binary.as_slice())
            .ok_or(Error::MissingDependency("curvature"))
    }

    /// Indicator vector of a loaded label.
    pub fn label(&self, name: &str) -> Result<&[u8]> {
        self.labels
            .get(name)
            .map(Vec::as_slice)
            .ok_or(Error::MissingDependency("label"))
    }

    #[must_use]
    pub fn labels(&self) -> &HashMap<String, Vec<u8>> {
        &self.labels
    }

    /// Apply an affine transform to every vertex in place.
    ///
    /// Each vertex becomes the first three components of `xfm · [x y z 1]ᵀ`.
    /// No perspective divide is performed.
    pub fn apply_xfm(&mut self, xfm: &DMat4) -> Result<()> {
        let mesh = self
            .geometry
            .as_mut()
            .ok_or(Error::MissingDependency("geometry"))?;
        for v in &mut mesh.vertices {
            *v = (*xfm * v.extend(1.0)).truncate();
        }
        tracing::debug!("Applied transform to {} vertices", mesh.vertex_count());
        Ok(())
    }

    /// [`apply_xfm`](Self::apply_xfm) with a row-major matrix.
    pub fn apply_xfm_rows(&mut self, rows: [[f64; 4]; 4]) -> Result<()> {
        self.apply_xfm(&DMat4::from_cols_array_2d(&rows).transpose())
    }
}
