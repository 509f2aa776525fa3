//! Drawable node kinds. Each kind owns its raw arrays, computes its own local
//! bounding box and implements its own ray test.

mod image;
mod line;
mod mesh;
mod points;
mod text;

pub use image::{ArrayData, Image, Interpolation, RenderMode, Volume};
pub use line::Line;
pub use mesh::Mesh;
pub use points::{Points, Scaling, Symbol};
pub use text::Text;
