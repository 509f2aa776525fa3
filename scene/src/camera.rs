use cgmath::{EuclideanSpace, InnerSpace, Point3, Quaternion, Vector3};

use crate::common::{EPSILON, Transform};
use crate::controller::Controller;
use crate::error::{SceneError, SceneResult};
use crate::projections::orthographic;

/// A camera node's kind data.
///
/// Cameras carry two transforms. The node transform places the camera in
/// its parent's frame like any other node. The `projection` maps the
/// camera's local frame onto normalized device coordinates. Together they
/// form the view-projection matrix `projection * world_transform⁻¹` used to
/// project scene points to the canvas and to unproject cursor positions
/// into picking rays.
///
/// Cameras look down their local -z axis with +y up.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Camera {
    projection: Transform,
    controller: Option<Controller>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: orthographic(1.0, 1.0, 1.0),
            controller: None,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projection(mut self, projection: Transform) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_controller(mut self, controller: impl Into<Controller>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    pub fn projection(&self) -> &Transform {
        &self.projection
    }

    pub fn controller(&self) -> Option<&Controller> {
        self.controller.as_ref()
    }

    pub(crate) fn controller_mut(&mut self) -> Option<&mut Controller> {
        self.controller.as_mut()
    }

    pub(crate) fn set_projection(&mut self, projection: Transform) {
        self.projection = projection;
    }

    pub(crate) fn set_controller(&mut self, controller: Option<Controller>) {
        self.controller = controller;
    }

    /// Builds the world-to-NDC matrix for a camera whose node-to-world
    /// transform is `world_transform`.
    ///
    /// # Errors
    /// Returns [`SceneError::Transform`] when `world_transform` is singular.
    pub fn view_projection(&self, world_transform: &Transform) -> SceneResult<Transform> {
        Ok(self.projection * world_transform.inv()?)
    }
}

/// The direction a camera with node transform `transform` looks at, in its
/// parent's frame.
pub fn forward(transform: &Transform) -> Vector3<f64> {
    unit_or_zero(transform.map_vector(-Vector3::unit_z()))
}

/// The camera's up direction, in its parent's frame.
pub fn up(transform: &Transform) -> Vector3<f64> {
    unit_or_zero(transform.map_vector(Vector3::unit_y()))
}

fn unit_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    if v.magnitude2() > 0.0 { v.normalize() } else { v }
}

/// Rotates `transform` about its own position so that the camera looks
/// along `direction`.
///
/// # Errors
/// Returns a validation error when `direction` has zero length.
pub fn with_forward(transform: &Transform, direction: Vector3<f64>) -> SceneResult<Transform> {
    if direction.magnitude2() < EPSILON * EPSILON {
        return Err(SceneError::Validation {
            field: "forward",
            reason: "direction must have non-zero length".to_string(),
        });
    }
    let current = forward(transform);
    let target = direction.normalize();
    if (current - target).magnitude() < EPSILON {
        return Ok(*transform);
    }
    let rotation = Quaternion::from_arc(current, target, Some(up(transform)));
    Ok(rotate_in_place(transform, rotation))
}

/// Rolls `transform` about its forward axis so that its up vector matches
/// `direction`.
///
/// # Errors
/// Returns a validation error when `direction` has zero length or is not
/// perpendicular to the current forward vector.
pub fn with_up(transform: &Transform, direction: Vector3<f64>) -> SceneResult<Transform> {
    if direction.magnitude2() < EPSILON * EPSILON {
        return Err(SceneError::Validation {
            field: "up",
            reason: "up vector must have non-zero length".to_string(),
        });
    }
    let target = direction.normalize();
    let view_dir = forward(transform);
    let alignment = target.dot(view_dir);
    if alignment.abs() > EPSILON {
        return Err(SceneError::Validation {
            field: "up",
            reason: format!(
                "up vector {:?} is not perpendicular to forward vector {:?}",
                direction, view_dir
            ),
        });
    }
    let current = up(transform);
    if (current - target).magnitude() < EPSILON {
        return Ok(*transform);
    }
    let rotation = Quaternion::from_arc(current, target, Some(view_dir));
    Ok(rotate_in_place(transform, rotation))
}

/// Points the camera at `target`, optionally rolling it so that its up
/// vector is `up`.
///
/// The result is computed on a copy: on error, nothing has changed.
///
/// # Errors
/// Returns a validation error when `target` coincides with the camera
/// position, or when `up` is zero or not perpendicular to the new forward
/// vector.
pub fn look_at(
    transform: &Transform,
    target: Point3<f64>,
    up: Option<Vector3<f64>>,
) -> SceneResult<Transform> {
    let position = transform.origin();
    let turned = with_forward(transform, target - position).map_err(|_| SceneError::Validation {
        field: "target",
        reason: format!("target {target:?} coincides with the camera position"),
    })?;
    match up {
        Some(up) => with_up(&turned, up),
        None => Ok(turned),
    }
}

fn rotate_in_place(transform: &Transform, rotation: Quaternion<f64>) -> Transform {
    let position = transform.origin().to_vec();
    transform
        .translated(-position)
        .rotated_by(rotation)
        .translated(position)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64, z: f64) -> Transform {
        Transform::identity().translated(Vector3::new(x, y, z))
    }

    fn close(a: Vector3<f64>, b: Vector3<f64>) -> bool {
        (a - b).magnitude() < EPSILON
    }

    #[test]
    fn test_default_orientation() {
        let t = Transform::identity();
        assert!(close(forward(&t), Vector3::new(0.0, 0.0, -1.0)));
        assert!(close(up(&t), Vector3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_forward_ignores_translation() {
        let t = at(5.0, -3.0, 2.0);
        assert!(close(forward(&t), Vector3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_with_forward_keeps_position() {
        let t = at(1.0, 2.0, 3.0);
        let turned = with_forward(&t, Vector3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(close(forward(&turned), Vector3::new(1.0, 0.0, 0.0)));
        assert!((turned.origin() - Point3::new(1.0, 2.0, 3.0)).magnitude() < EPSILON);
    }

    #[test]
    fn test_with_forward_opposite_direction() {
        let t = Transform::identity();
        let turned = with_forward(&t, Vector3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(close(forward(&turned), Vector3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_with_up_rolls_about_forward() {
        let t = at(0.0, 0.0, 10.0);
        let rolled = with_up(&t, Vector3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(close(up(&rolled), Vector3::new(1.0, 0.0, 0.0)));
        assert!(close(forward(&rolled), Vector3::new(0.0, 0.0, -1.0)));
    }

    #[test]
    fn test_with_up_rejects_zero_and_oblique() {
        let t = Transform::identity();
        assert!(matches!(
            with_up(&t, Vector3::new(0.0, 0.0, 0.0)),
            Err(SceneError::Validation { field: "up", .. })
        ));
        assert!(with_up(&t, Vector3::new(0.0, 1.0, 1.0)).is_err());
    }

    #[test]
    fn test_look_at_with_up() {
        let t = at(10.0, 0.0, 0.0);
        let looking = look_at(&t, Point3::origin(), Some(Vector3::unit_z())).unwrap();
        assert!(close(forward(&looking), Vector3::new(-1.0, 0.0, 0.0)));
        assert!(close(up(&looking), Vector3::new(0.0, 0.0, 1.0)));
        assert!((looking.origin() - Point3::new(10.0, 0.0, 0.0)).magnitude() < EPSILON);
    }

    #[test]
    fn test_look_at_rejects_target_at_position() {
        let t = at(1.0, 1.0, 1.0);
        assert!(look_at(&t, Point3::new(1.0, 1.0, 1.0), None).is_err());
    }

    #[test]
    fn test_view_projection_centers_camera_axis() {
        let camera = Camera::new();
        let world = at(3.0, 4.0, 5.0);
        let vp = camera.view_projection(&world).unwrap();
        let ndc = vp.map(Point3::new(3.0, 4.0, 4.5));
        assert!(ndc.x.abs() < EPSILON);
        assert!(ndc.y.abs() < EPSILON);
        assert!((ndc.z - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_view_projection_singular_world_transform() {
        let camera = Camera::new();
        let flat = Transform::identity().scaled(Vector3::new(1.0, 1.0, 0.0));
        assert!(matches!(camera.view_projection(&flat), Err(SceneError::Transform(_))));
    }
}
