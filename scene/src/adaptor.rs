//! The contract between the scene model and whatever renders it.
//!
//! A rendering backend registers an [`Adaptor`] with the
//! [`SceneGraph`](crate::SceneGraph). Every successful edit, structural or
//! field-level, is reported to each adaptor as one [`NodeChange`]. Because
//! the enum is exhaustive, a backend that matches on it without a wildcard
//! arm is checked by the compiler to handle every observable field.

use cgmath::Point3;

use crate::color::{Color, ColorModel};
use crate::common::Transform;
use crate::controller::Controller;
use crate::geometry::{ArrayData, Interpolation, RenderMode, Scaling, Symbol};
use crate::node::{BlendMode, Node, NodeId};

/// Unique identifier for a registered adaptor.
pub type AdaptorId = u32;

/// One change to one node, carrying the new value.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange<'a> {
    // Lifecycle
    /// The node was added to the graph.
    Created(&'a Node),
    /// The node was removed from the graph.
    Removed,

    // Hierarchy
    Parent(Option<NodeId>),
    ChildAdded(NodeId),
    ChildRemoved(NodeId),

    // Base fields
    Name(Option<&'a str>),
    Transform(Transform),
    Visible(bool),
    Interactive(bool),
    Opacity(f64),
    Order(u32),
    Blending(BlendMode),

    // Camera
    Projection(Transform),
    Controller(Option<&'a Controller>),

    // Points
    Coords(&'a [Point3<f64>]),
    FaceColor(Option<Color>),
    EdgeColor(Option<Color>),
    EdgeWidth(f64),
    Symbol(Symbol),
    Scaling(Scaling),

    // Points and text
    Size(f64),

    // Points and line
    Antialias(f64),

    // Line and mesh
    Vertices(&'a [Point3<f64>]),
    Color(&'a ColorModel),

    // Line
    Width(f64),

    // Mesh
    Faces(&'a [[u32; 3]]),

    // Image and volume
    Data(&'a ArrayData),
    Cmap(&'a str),
    Clims(Option<(f64, f64)>),
    Gamma(f64),
    Interpolation(Interpolation),

    // Volume
    RenderMode(RenderMode),

    // Text
    Text(&'a str),
    TextColor(Color),
}

impl NodeChange<'_> {
    /// The name of the changed field, for logging.
    pub fn field(&self) -> &'static str {
        match self {
            NodeChange::Created(_) => "created",
            NodeChange::Removed => "removed",
            NodeChange::Parent(_) => "parent",
            NodeChange::ChildAdded(_) => "child_added",
            NodeChange::ChildRemoved(_) => "child_removed",
            NodeChange::Name(_) => "name",
            NodeChange::Transform(_) => "transform",
            NodeChange::Visible(_) => "visible",
            NodeChange::Interactive(_) => "interactive",
            NodeChange::Opacity(_) => "opacity",
            NodeChange::Order(_) => "order",
            NodeChange::Blending(_) => "blending",
            NodeChange::Projection(_) => "projection",
            NodeChange::Controller(_) => "controller",
            NodeChange::Coords(_) => "coords",
            NodeChange::FaceColor(_) => "face_color",
            NodeChange::EdgeColor(_) => "edge_color",
            NodeChange::EdgeWidth(_) => "edge_width",
            NodeChange::Symbol(_) => "symbol",
            NodeChange::Scaling(_) => "scaling",
            NodeChange::Size(_) => "size",
            NodeChange::Antialias(_) => "antialias",
            NodeChange::Vertices(_) => "vertices",
            NodeChange::Color(_) => "color",
            NodeChange::Width(_) => "width",
            NodeChange::Faces(_) => "faces",
            NodeChange::Data(_) => "data",
            NodeChange::Cmap(_) => "cmap",
            NodeChange::Clims(_) => "clims",
            NodeChange::Gamma(_) => "gamma",
            NodeChange::Interpolation(_) => "interpolation",
            NodeChange::RenderMode(_) => "render_mode",
            NodeChange::Text(_) => "text",
            NodeChange::TextColor(_) => "text_color",
        }
    }
}

/// Observer of scene graph changes, typically a rendering backend that
/// mirrors the model into native objects.
///
/// Implementations should be idempotent: the graph makes no promise about
/// coalescing repeated assignments of the same value.
pub trait Adaptor {
    fn apply(&mut self, node: NodeId, change: &NodeChange<'_>);
}

impl<F> Adaptor for F
where
    F: FnMut(NodeId, &NodeChange<'_>),
{
    fn apply(&mut self, node: NodeId, change: &NodeChange<'_>) {
        self(node, change)
    }
}

pub(crate) type AdaptorList = Vec<(AdaptorId, Box<dyn Adaptor>)>;

/// Sends `change` to every adaptor in registration order.
pub(crate) fn broadcast(adaptors: &mut [(AdaptorId, Box<dyn Adaptor>)], node: NodeId, change: &NodeChange<'_>) {
    log::trace!("node {node}: {} changed", change.field());
    for (_, adaptor) in adaptors.iter_mut() {
        adaptor.apply(node, change);
    }
}
