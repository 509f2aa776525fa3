use cgmath::Point3;

use crate::color::ColorModel;
use crate::common::{Aabb, Ray};
use crate::error::{SceneError, SceneResult};
use crate::geom_query::HitContext;

/// An indexed triangle mesh.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mesh {
    vertices: Vec<Point3<f64>>,
    faces: Vec<[u32; 3]>,
    color: ColorModel,
}

impl Mesh {
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            faces,
            color: ColorModel::default(),
        }
    }

    pub fn with_color(mut self, color: ColorModel) -> Self {
        self.color = color;
        self
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn color(&self) -> &ColorModel {
        &self.color
    }

    pub(crate) fn validate(&self) -> SceneResult<()> {
        check_faces(&self.faces, self.vertices.len())
    }

    /// Replaces the vertex array. Faces are not re-checked so vertices and
    /// faces may be updated in either order; faces that index past the end
    /// are skipped when picking.
    pub(crate) fn set_vertices(&mut self, vertices: Vec<Point3<f64>>) {
        self.vertices = vertices;
    }

    pub(crate) fn set_faces(&mut self, faces: Vec<[u32; 3]>) -> SceneResult<()> {
        check_faces(&faces, self.vertices.len())?;
        self.faces = faces;
        Ok(())
    }

    pub(crate) fn set_color(&mut self, color: ColorModel) {
        self.color = color;
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Every face the ray crosses, as `(face_index, t)` sorted by `t`.
    ///
    /// The ray must be expressed in the mesh's local frame.
    pub fn intersect_faces(&self, ray: &Ray) -> Vec<(usize, f64)> {
        if ray.is_degenerate() {
            return Vec::new();
        }
        let vertex = |i: u32| self.vertices.get(i as usize).copied();
        let mut hits: Vec<(usize, f64)> = self
            .faces
            .iter()
            .enumerate()
            .filter_map(|(index, [a, b, c])| {
                let (v0, v1, v2) = (vertex(*a)?, vertex(*b)?, vertex(*c)?);
                ray.intersect_triangle(v0, v1, v2).map(|(t, _, _)| (index, t))
            })
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits
    }

    pub(crate) fn passes_through(&self, ctx: &HitContext<'_>) -> Option<f64> {
        if self.faces.is_empty() {
            return None;
        }
        let local_ray = ctx.local_ray()?;
        self.intersect_faces(&local_ray).first().map(|(_, t)| *t)
    }
}

fn check_faces(faces: &[[u32; 3]], vertex_count: usize) -> SceneResult<()> {
    match faces.iter().flatten().find(|i| **i as usize >= vertex_count) {
        Some(index) => Err(SceneError::Validation {
            field: "faces",
            reason: format!("vertex index {index} out of range for {vertex_count} vertices"),
        }),
        None => Ok(()),
    }
}
