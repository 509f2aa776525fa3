use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};

use crate::{EPSILON, Ray};

/// A plane in 3D space defined by a normal and distance from origin.
///
/// The plane equation is: normal · point + distance = 0
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Plane {
    /// Unit normal
    pub normal: Vector3<f64>,
    /// Signed distance from origin along the normal
    pub distance: f64,
}

impl Plane {
    /// Creates a new plane from a normal vector and a point on the plane.
    ///
    /// Returns `None` for a zero-length normal.
    pub fn new(normal: Vector3<f64>, point: Point3<f64>) -> Option<Self> {
        if normal.magnitude2() < EPSILON * EPSILON {
            return None;
        }
        let normal = normal.normalize();
        let distance = -normal.dot(point.to_vec());
        Some(Self { normal, distance })
    }

    /// Computes the signed distance from a point to the plane.
    pub fn signed_distance(&self, point: Point3<f64>) -> f64 {
        self.normal.dot(point.to_vec()) + self.distance
    }

    /// Ray parameter at which the ray crosses the plane.
    ///
    /// `None` when the ray runs parallel to the plane or the crossing lies
    /// behind the ray origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f64> {
        let denom = self.normal.dot(ray.direction);
        if denom == 0.0 {
            return None;
        }
        let t = -self.signed_distance(ray.origin) / denom;
        if t < 0.0 { None } else { Some(t) }
    }
}

/// A flat four-sided patch spanned by two edge vectors from a corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Parallelogram {
    pub corner: Point3<f64>,
    pub u: Vector3<f64>,
    pub v: Vector3<f64>,
}

impl Parallelogram {
    pub fn new(corner: Point3<f64>, u: Vector3<f64>, v: Vector3<f64>) -> Self {
        Self { corner, u, v }
    }

    /// Ray parameter of the hit, if the ray crosses the patch.
    ///
    /// The crossing point is written as `corner + alpha * u + beta * v`; both
    /// coordinates must lie in `[0, 1]` (edges included).
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f64> {
        let n = self.u.cross(self.v);
        let plane = Plane::new(n, self.corner)?;
        let t = plane.intersect_ray(ray)?;

        let p = ray.point_at_distance(t) - self.corner;
        let w = n / n.dot(n);
        let alpha = w.dot(p.cross(self.v));
        let beta = w.dot(self.u.cross(p));
        if (0.0..=1.0).contains(&alpha) && (0.0..=1.0).contains(&beta) {
            Some(t)
        } else {
            None
        }
    }
}
