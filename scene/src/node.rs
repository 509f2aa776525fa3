use crate::camera::Camera;
use crate::common::{Aabb, Transform};
use crate::error::{SceneError, SceneResult, check_range};
use crate::geom_query::HitContext;
use crate::geometry::{Image, Line, Mesh, Points, Text, Volume};

/// Unique identifier for a Node in the scene graph.
pub type NodeId = u32;

/// How a node's colors combine with whatever was drawn behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendMode {
    /// Color times alpha overwrites the background.
    #[default]
    Opaque,
    /// Standard alpha compositing.
    Alpha,
    /// Color times alpha is added to the background.
    Additive,
}

/// What a node is, together with its kind-specific fields.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// A pure container; the root of what a view renders.
    Scene,
    Camera(Camera),
    Points(Points),
    Line(Line),
    Mesh(Mesh),
    Image(Image),
    Volume(Volume),
    Text(Text),
}

impl NodeKind {
    /// Lower-case kind name, as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Scene => "scene",
            NodeKind::Camera(_) => "camera",
            NodeKind::Points(_) => "points",
            NodeKind::Line(_) => "line",
            NodeKind::Mesh(_) => "mesh",
            NodeKind::Image(_) => "image",
            NodeKind::Volume(_) => "volume",
            NodeKind::Text(_) => "text",
        }
    }

    /// Bounds of this node's own geometry in its local frame, ignoring
    /// children. Containers and cameras have none.
    pub fn bounding_box(&self) -> Option<Aabb> {
        match self {
            NodeKind::Scene | NodeKind::Camera(_) => None,
            NodeKind::Points(points) => points.bounding_box(),
            NodeKind::Line(line) => line.bounding_box(),
            NodeKind::Mesh(mesh) => mesh.bounding_box(),
            NodeKind::Image(image) => image.bounding_box(),
            NodeKind::Volume(volume) => volume.bounding_box(),
            NodeKind::Text(text) => text.bounding_box(),
        }
    }

    /// Ray parameter of the nearest point where the ray meets this node's
    /// own geometry.
    pub(crate) fn passes_through(&self, ctx: &HitContext<'_>) -> Option<f64> {
        match self {
            NodeKind::Scene | NodeKind::Camera(_) | NodeKind::Text(_) => None,
            NodeKind::Points(points) => points.passes_through(ctx),
            NodeKind::Line(line) => line.passes_through(ctx),
            NodeKind::Mesh(mesh) => mesh.passes_through(ctx),
            NodeKind::Image(image) => image.passes_through(ctx),
            NodeKind::Volume(volume) => volume.passes_through(ctx),
        }
    }

    pub(crate) fn validate(&self) -> SceneResult<()> {
        match self {
            NodeKind::Scene | NodeKind::Camera(_) => Ok(()),
            NodeKind::Points(points) => points.validate(),
            NodeKind::Line(line) => line.validate(),
            NodeKind::Mesh(mesh) => mesh.validate(),
            NodeKind::Image(image) => image.validate(),
            NodeKind::Volume(volume) => volume.validate(),
            NodeKind::Text(text) => text.validate(),
        }
    }
}

macro_rules! impl_from_kind {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for NodeKind {
                fn from(value: $ty) -> Self {
                    NodeKind::$ty(value)
                }
            }

            impl From<$ty> for NodeDescriptor {
                fn from(value: $ty) -> Self {
                    NodeDescriptor::new(NodeKind::$ty(value))
                }
            }
        )*
    };
}

impl_from_kind!(Camera, Points, Line, Mesh, Image, Volume, Text);

/// Everything needed to create a node, minus its place in the tree.
///
/// # Example
///
/// ```
/// use cgmath::{Point3, Vector3};
/// use scenegraph::{NodeDescriptor, SceneGraph};
/// use scenegraph::common::Transform;
/// use scenegraph::geometry::Points;
///
/// let mut graph = SceneGraph::new();
/// let scene = graph.add_node(None, NodeDescriptor::scene()).unwrap();
/// let points = graph
///     .add_node(
///         Some(scene),
///         NodeDescriptor::from(Points::new(vec![Point3::new(0.0, 0.0, 0.0)]))
///             .with_name("markers")
///             .with_transform(Transform::identity().translated(Vector3::new(1.0, 0.0, 0.0))),
///     )
///     .unwrap();
/// assert_eq!(graph.parent(points), Some(scene));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeDescriptor {
    pub name: Option<String>,
    /// Maps the node's local frame to its parent's frame.
    pub transform: Transform,
    pub visible: bool,
    pub interactive: bool,
    /// In `[0, 1]`.
    pub opacity: f64,
    /// Draw order among siblings; higher is drawn later.
    pub order: u32,
    pub blending: BlendMode,
    pub kind: NodeKind,
}

impl NodeDescriptor {
    /// Defaults for `kind`. Only cameras start out interactive.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            transform: Transform::identity(),
            visible: true,
            interactive: matches!(kind, NodeKind::Camera(_)),
            opacity: 1.0,
            order: 0,
            blending: BlendMode::default(),
            kind,
        }
    }

    pub fn scene() -> Self {
        Self::new(NodeKind::Scene)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    pub fn with_blending(mut self, blending: BlendMode) -> Self {
        self.blending = blending;
        self
    }

    pub(crate) fn validate(&self) -> SceneResult<()> {
        check_range("opacity", self.opacity, 0.0, 1.0)?;
        self.kind.validate()
    }
}

impl From<NodeKind> for NodeDescriptor {
    fn from(kind: NodeKind) -> Self {
        NodeDescriptor::new(kind)
    }
}

/// A node in the scene graph.
///
/// Nodes are owned by a [`SceneGraph`](crate::SceneGraph) and edited through
/// [`NodeMut`](crate::NodeMut) so that every change reaches the registered
/// adaptors.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    name: Option<String>,

    transform: Transform,
    visible: bool,
    interactive: bool,
    opacity: f64,
    order: u32,
    blending: BlendMode,

    // Hierarchy
    parent: Option<NodeId>,
    children: Vec<NodeId>,

    kind: NodeKind,
}

impl Node {
    pub(crate) fn from_descriptor(id: NodeId, descriptor: NodeDescriptor) -> Self {
        Self {
            id,
            name: descriptor.name,
            transform: descriptor.transform,
            visible: descriptor.visible,
            interactive: descriptor.interactive,
            opacity: descriptor.opacity,
            order: descriptor.order,
            blending: descriptor.blending,
            parent: None,
            children: Vec::new(),
            kind: descriptor.kind,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn interactive(&self) -> bool {
        self.interactive
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn blending(&self) -> BlendMode {
        self.blending
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The camera data, if this is a camera node.
    pub fn as_camera(&self) -> Option<&Camera> {
        match &self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn is_scene(&self) -> bool {
        matches!(self.kind, NodeKind::Scene)
    }

    // Hierarchy management

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    /// Returns `false` if `child` was not in the children list.
    pub(crate) fn remove_child(&mut self, child: NodeId) -> bool {
        let before = self.children.len();
        self.children.retain(|&id| id != child);
        self.children.len() != before
    }

    // Field mutation. Validation happens here, notification in `NodeMut`.

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub(crate) fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub(crate) fn set_opacity(&mut self, opacity: f64) -> SceneResult<()> {
        self.opacity = check_range("opacity", opacity, 0.0, 1.0)?;
        Ok(())
    }

    pub(crate) fn set_order(&mut self, order: u32) {
        self.order = order;
    }

    pub(crate) fn set_blending(&mut self, blending: BlendMode) {
        self.blending = blending;
    }

    pub(crate) fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    /// Returns a [`SceneError::WrongKind`] for this node.
    pub(crate) fn wrong_kind(&self, expected: &'static str) -> SceneError {
        SceneError::WrongKind {
            node: self.id,
            expected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    #[test]
    fn test_only_cameras_default_to_interactive() {
        assert!(NodeDescriptor::from(Camera::new()).interactive);
        assert!(!NodeDescriptor::scene().interactive);
        assert!(!NodeDescriptor::from(Points::default()).interactive);
    }

    #[test]
    fn test_descriptor_rejects_opacity_out_of_range() {
        let descriptor = NodeDescriptor::scene().with_opacity(1.5);
        assert!(matches!(
            descriptor.validate(),
            Err(SceneError::Validation { field: "opacity", .. })
        ));
    }

    #[test]
    fn test_set_opacity_keeps_previous_value_on_error() {
        let mut node = Node::from_descriptor(0, NodeDescriptor::scene().with_opacity(0.25));
        assert!(node.set_opacity(-0.1).is_err());
        assert!((node.opacity() - 0.25).abs() < f64::EPSILON);
        assert!(node.set_opacity(1.0).is_ok());
        assert!((node.opacity() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_containers_have_no_bounding_box() {
        assert!(NodeKind::Scene.bounding_box().is_none());
        assert!(NodeKind::Camera(Camera::new()).bounding_box().is_none());
        let points = NodeKind::from(Points::new(vec![Point3::new(1.0, 2.0, 3.0)]));
        assert!(points.bounding_box().is_some());
    }

    #[test]
    fn test_remove_child_reports_membership() {
        let mut node = Node::from_descriptor(0, NodeDescriptor::scene());
        node.push_child(4);
        assert!(node.remove_child(4));
        assert!(!node.remove_child(4));
        assert!(node.children().is_empty());
    }
}
