use crate::common::{Projector, Ray, Transform};

/// What a node's intersection test gets to work with.
///
/// `ray` is expressed in the frame of the subtree root being picked.
/// `to_world` maps the node's local frame into that same frame, so tests
/// that are easier in local coordinates can pull the ray back with
/// [`local_ray`](Self::local_ray).
#[derive(Debug, Clone, Copy)]
pub struct HitContext<'a> {
    pub ray: &'a Ray,
    pub to_world: &'a Transform,
}

impl<'a> HitContext<'a> {
    pub fn new(ray: &'a Ray, to_world: &'a Transform) -> Self {
        Self { ray, to_world }
    }

    /// The ray in the node's local frame.
    ///
    /// The direction is not re-normalized, so a ray parameter found against
    /// local geometry is the same parameter along the original ray. Returns
    /// `None` (and logs a warning) if the node's transform is singular.
    pub fn local_ray(&self) -> Option<Ray> {
        match self.to_world.inv() {
            Ok(to_local) => Some(self.ray.transform(&to_local)),
            Err(err) => {
                log::warn!("Skipping intersection test: {err}");
                None
            }
        }
    }

    /// Projection of the view the ray was cast from, for tests measured in
    /// canvas pixels.
    pub fn projector(&self) -> Option<&'a Projector> {
        self.ray.source.as_ref().map(|source| &source.projector)
    }
}
