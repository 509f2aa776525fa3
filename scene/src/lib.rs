//! A declarative scene graph for interactive 2D/3D visualization.
//!
//! Nodes (images, points, lines, meshes, volumes, text, cameras) form trees
//! linked by affine transforms. Views pair a scene with a camera on a
//! canvas; cursor positions are unprojected into rays and picked against the
//! tree, and the resulting events are routed to node, view and camera
//! handlers. Rendering back ends observe every field change through
//! [`Adaptor`]s.

pub use scenegraph_common as common;

pub mod adaptor;
pub mod camera;
pub mod canvas;
pub mod color;
pub mod controller;
pub mod error;
pub mod event;
pub mod geom_query;
pub mod geometry;
pub mod graph;
pub mod grid;
pub mod node;
pub mod projections;
pub mod tree;
pub mod view;

pub use adaptor::{Adaptor, AdaptorId, NodeChange};
pub use camera::Camera;
pub use canvas::{Canvas, CanvasConfig};
pub use color::{Color, ColorModel};
pub use common::ViewId;
pub use controller::{CameraPose, Controller, Orbit, PanZoom};
pub use error::{SceneError, SceneResult};
pub use event::{
    Event, EventContext, EventDispatcher, EventHandler, EventKind, HandlerId, HandlerTarget,
    InputEvent, MouseButtons, MouseEvent,
};
pub use geom_query::{HitContext, Intersection, intersections};
pub use graph::{NodeMut, Parents, SceneGraph};
pub use grid::{Grid, GridAssignment};
pub use node::{BlendMode, Node, NodeDescriptor, NodeId, NodeKind};
pub use projections::{Frustum, orthographic, perspective};
pub use tree::{TreeVisitor, walk_tree};
pub use view::{Layout, View};
