use std::ops::Mul;

use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Quaternion, SquareMatrix, Vector3};

use crate::{EPSILON, TransformError};

/// An affine map stored as a 4x4 matrix.
///
/// Matrices use the column-vector convention: a point is mapped as
/// `M * p`. Builder operations (`translated`, `scaled`, `rotated`) apply the
/// new operation *after* the existing one, so
/// `Transform::identity().scaled(s).translated(t)` first scales, then
/// translates. Composition with [`Transform::chain`] reads left to right as
/// successive local-to-parent maps: `chain(&[a, b]).map(p) == a.map(b.map(p))`.
///
/// Transforms are values. Every builder returns a new instance.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    matrix: Matrix4<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Matrix4<f64>> for Transform {
    fn from(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }
}

impl Transform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Wraps a raw column-major matrix.
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    /// The underlying matrix.
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Returns this transform followed by a translation.
    pub fn translated(&self, offset: Vector3<f64>) -> Self {
        Self {
            matrix: Matrix4::from_translation(offset) * self.matrix,
        }
    }

    /// Returns this transform followed by a per-axis scale about the origin.
    pub fn scaled(&self, factors: Vector3<f64>) -> Self {
        Self {
            matrix: Matrix4::from_nonuniform_scale(factors.x, factors.y, factors.z) * self.matrix,
        }
    }

    /// Returns this transform followed by a rotation of `angle_degrees` about
    /// `axis` (through the origin, right-handed).
    ///
    /// A zero-length axis describes no rotation and leaves the transform as is.
    pub fn rotated(&self, angle_degrees: f64, axis: Vector3<f64>) -> Self {
        if axis.magnitude2() < EPSILON * EPSILON {
            return *self;
        }
        Self {
            matrix: Matrix4::from_axis_angle(axis.normalize(), Deg(angle_degrees)) * self.matrix,
        }
    }

    /// Returns this transform followed by the rotation `rotation`.
    pub fn rotated_by(&self, rotation: Quaternion<f64>) -> Self {
        Self {
            matrix: Matrix4::from(rotation) * self.matrix,
        }
    }

    /// Composes transforms as successive local-to-parent maps.
    ///
    /// The rightmost transform is applied to points first. An empty slice
    /// yields the identity.
    pub fn chain(transforms: &[Transform]) -> Self {
        transforms
            .iter()
            .fold(Self::identity(), |acc, t| acc * *t)
    }

    /// The exact inverse of this transform.
    pub fn inv(&self) -> Result<Self, TransformError> {
        self.matrix
            .invert()
            .map(Self::from_matrix)
            .ok_or(TransformError::SingularMatrix)
    }

    /// Maps a point, including translation and the homogeneous divide.
    pub fn map(&self, point: Point3<f64>) -> Point3<f64> {
        Point3::from_homogeneous(self.matrix * point.to_homogeneous())
    }

    /// Maps a direction (ignores translation).
    pub fn map_vector(&self, vector: Vector3<f64>) -> Vector3<f64> {
        (self.matrix * vector.extend(0.0)).truncate()
    }

    /// Maps every point of a slice.
    pub fn map_all(&self, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        points.iter().map(|p| self.map(*p)).collect()
    }

    /// Maps a point through the inverse of this transform.
    pub fn imap(&self, point: Point3<f64>) -> Result<Point3<f64>, TransformError> {
        Ok(self.inv()?.map(point))
    }

    /// Maps every point of a slice through the inverse of this transform.
    pub fn imap_all(&self, points: &[Point3<f64>]) -> Result<Vec<Point3<f64>>, TransformError> {
        Ok(self.inv()?.map_all(points))
    }

    /// Where the local origin lands.
    pub fn origin(&self) -> Point3<f64> {
        self.map(Point3::origin())
    }
}

impl Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        Transform {
            matrix: self.matrix * rhs.matrix,
        }
    }
}
