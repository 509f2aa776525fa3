use cgmath::{InnerSpace, Point3, Vector3};

use crate::Transform;

/// Determinants smaller than this are treated as a ray lying in (or parallel
/// to) a triangle's plane.
const PARALLEL_EPSILON: f64 = 1e-8;

/// Identifier of the view a ray was cast from.
pub type ViewId = u32;

/// Maps world points to pixels of one view.
///
/// `world_to_ndc` is the camera's effective matrix (projection composed with
/// the inverse of the camera's world transform); `width` and `height` are the
/// view's layout size in canvas pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projector {
    pub world_to_ndc: Transform,
    pub width: f64,
    pub height: f64,
}

impl Projector {
    /// Projects a world point to view-relative pixel coordinates (Y down).
    pub fn to_canvas(&self, point: Point3<f64>) -> (f64, f64) {
        let ndc = self.world_to_ndc.map(point);
        (
            (ndc.x + 1.0) / 2.0 * self.width,
            (1.0 - ndc.y) / 2.0 * self.height,
        )
    }
}

/// The view a ray originated from, with a snapshot of its projection so
/// screen-space tests can run without access to the canvas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RaySource {
    pub view: ViewId,
    pub projector: Projector,
}

/// A ray in 3D space, defined by an origin point and a direction vector.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
    pub source: Option<RaySource>,
}

impl Ray {
    /// Creates a new ray with the given origin and direction.
    /// The direction is normalized unless it has zero length.
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Self {
        let direction = if direction.magnitude2() > 0.0 {
            direction.normalize()
        } else {
            direction
        };
        Self {
            origin,
            direction,
            source: None,
        }
    }

    /// Attaches the view this ray was cast from.
    pub fn with_source(mut self, source: RaySource) -> Self {
        self.source = Some(source);
        self
    }

    /// `origin + t * direction`
    pub fn point_at_distance(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction * t
    }

    /// True when the direction has zero length and no intersection is defined.
    pub fn is_degenerate(&self) -> bool {
        self.direction.magnitude2() == 0.0
    }

    /// Maps the ray into another coordinate frame.
    ///
    /// The direction is *not* re-normalized: under an affine map the ray
    /// parameter of a point is preserved, so a `t` found in the new frame is
    /// the same `t` in the original one.
    pub fn transform(&self, transform: &Transform) -> Self {
        Self {
            origin: transform.map(self.origin),
            direction: transform.map_vector(self.direction),
            source: self.source,
        }
    }

    /// Closed-form ray/sphere test.
    ///
    /// Returns the smallest non-negative ray parameter at which the ray
    /// touches the sphere, or `None`.
    pub fn intersect_sphere(&self, center: Point3<f64>, radius: f64) -> Option<f64> {
        let a = self.direction.dot(self.direction);
        if a == 0.0 {
            return None;
        }
        let offset = center - self.origin;
        let b = -2.0 * offset.dot(self.direction);
        let c = offset.dot(offset) - radius * radius;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let near = (-b - root) / (2.0 * a);
        let far = (-b + root) / (2.0 * a);
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            // Origin inside the sphere
            Some(far)
        } else {
            None
        }
    }

    /// Tests if a ray intersects a triangle using the Möller-Trumbore algorithm.
    ///
    /// Returns `Some((t, u, v))` if the ray hits the triangle, where:
    /// - t: ray parameter of the hit
    /// - u, v: barycentric coordinates (w = 1 - u - v)
    ///
    /// Faces nearly parallel to the ray are culled, as are hits with
    /// `u < 0`, `v < 0` or `u + v >= 1` (points on the edge opposite `v0`
    /// miss) and hits behind the origin.
    pub fn intersect_triangle(
        &self,
        v0: Point3<f64>,
        v1: Point3<f64>,
        v2: Point3<f64>,
    ) -> Option<(f64, f64, f64)> {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = self.direction.cross(edge2);
        let det = edge1.dot(h);
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let s = self.origin - v0;
        let u = inv_det * s.dot(h);
        if u < 0.0 {
            return None;
        }

        let q = s.cross(edge1);
        let v = inv_det * self.direction.dot(q);
        if v < 0.0 || u + v >= 1.0 {
            return None;
        }

        let t = inv_det * edge2.dot(q);
        if t >= 0.0 {
            Some((t, u, v))
        } else {
            // Behind the ray origin
            None
        }
    }
}
