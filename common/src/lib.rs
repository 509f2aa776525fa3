//! Math value types shared by the scene graph: affine transforms, rays,
//! planes and axis-aligned bounding boxes.

mod aabb;
mod error;
mod plane;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use error::TransformError;
pub use plane::{Parallelogram, Plane};
pub use ray::{Projector, Ray, RaySource, ViewId};
pub use transform::Transform;

/// Tolerance used for floating point comparisons throughout the workspace.
pub const EPSILON: f64 = 1e-6;
