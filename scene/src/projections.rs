//! Builders for camera projection transforms.
//!
//! A projection maps the camera's local frame to normalized device
//! coordinates: x and y in `[-1, 1]` (y up) and depth in `[0, 1]`, where
//! depth 0 is the nearest and depth 1 the farthest visible plane. Cameras
//! look down their local -z axis.

use cgmath::{Matrix4, Vector3};

use crate::common::Transform;
use crate::error::{SceneError, SceneResult};

/// A box of `width` x `height` centered on the camera axis mapped onto the
/// NDC square, with `depth` local units in front of the camera spanning half
/// the NDC depth range.
pub fn orthographic(width: f64, height: f64, depth: f64) -> Transform {
    Transform::identity().scaled(Vector3::new(2.0 / width, 2.0 / height, -2.0 / depth))
}

/// A standard frustum with a vertical field of view of `fov` degrees.
///
/// Points on the near plane land on NDC depth 0 and points on the far plane
/// on depth 1.
pub fn perspective(fov: f64, near: f64, far: f64) -> SceneResult<Transform> {
    frustum_matrix(fov, near, far, 1.0)
}

fn frustum_matrix(fov: f64, near: f64, far: f64, aspect: f64) -> SceneResult<Transform> {
    if !(fov > 0.0 && fov < 180.0) {
        return Err(SceneError::Validation {
            field: "fov",
            reason: format!("perspective projection needs 0 < fov < 180, got {fov}"),
        });
    }
    if !(near > 0.0 && far > near) {
        return Err(SceneError::Validation {
            field: "near",
            reason: format!("clip planes need 0 < near < far, got near={near} far={far}"),
        });
    }
    if !(aspect > 0.0) {
        return Err(SceneError::Validation {
            field: "aspect",
            reason: format!("aspect ratio must be positive, got {aspect}"),
        });
    }

    let s = 1.0 / (fov.to_radians() / 2.0).tan();
    let depth = far - near;
    #[rustfmt::skip]
    let matrix = Matrix4::new(
        s / aspect, 0.0, 0.0,                  0.0,
        0.0,        s,   0.0,                  0.0,
        0.0,        0.0, -far / depth,         -1.0,
        0.0,        0.0, -far * near / depth,  0.0,
    );
    Ok(Transform::from_matrix(matrix))
}

/// Frustum parameters shared by cameras and the controllers that move them.
///
/// `distance` is the camera-to-target distance at which a target
/// `view_width` wide exactly fills the view horizontally. Controllers that
/// infer a distance from the camera transform must use the same factor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frustum {
    /// Field of view in degrees; 0 selects an orthographic projection.
    pub fov: f64,
    pub view_width: f64,
    /// Extent of the visible region along the view axis.
    pub depth: f64,
    /// Width over height.
    pub aspect: f64,
    pub zoom_factor: f64,
}

impl Default for Frustum {
    fn default() -> Self {
        Self {
            fov: 50.0,
            view_width: 1.0,
            depth: 1.0,
            aspect: 1.0,
            zoom_factor: 1.0,
        }
    }
}

impl Frustum {
    /// `0.5 / tan(fov / 2)`: camera distance per unit of view width.
    pub fn distance_factor(&self) -> f64 {
        0.5 / (self.fov.to_radians() / 2.0).tan()
    }

    pub fn distance(&self) -> f64 {
        self.view_width * self.distance_factor()
    }

    /// Near clip plane, never closer than a thousandth of the distance.
    pub fn near(&self) -> f64 {
        let distance = self.distance();
        (distance - self.depth / 2.0).max(distance * 1e-3)
    }

    pub fn far(&self) -> f64 {
        self.distance() + self.depth / 2.0
    }

    pub fn projection(&self) -> SceneResult<Transform> {
        if !(self.zoom_factor > 0.0) {
            return Err(SceneError::Validation {
                field: "zoom_factor",
                reason: format!("must be positive, got {}", self.zoom_factor),
            });
        }
        if self.fov == 0.0 {
            let width = self.view_width / self.zoom_factor;
            return Ok(orthographic(width, width / self.aspect, self.depth));
        }
        let zoom = self.zoom_factor;
        Ok(frustum_matrix(self.fov, self.near(), self.far(), self.aspect)?
            .scaled(Vector3::new(zoom, zoom, 1.0)))
    }
}
