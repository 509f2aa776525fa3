mod hit_context;
mod ray_picking;

pub use hit_context::HitContext;
pub use ray_picking::{Intersection, intersections};
