use std::collections::HashMap;

use cgmath::{Point3, Vector3};

use crate::adaptor::{Adaptor, AdaptorId, AdaptorList, NodeChange, broadcast};
use crate::camera::{self, Camera};
use crate::color::{Color, ColorModel};
use crate::common::{Aabb, Transform};
use crate::controller::{CameraPose, Controller};
use crate::error::{SceneError, SceneResult};
use crate::event::Event;
use crate::geometry::{ArrayData, Interpolation, RenderMode, Scaling, Symbol};
use crate::node::{BlendMode, Node, NodeDescriptor, NodeId, NodeKind};
use crate::tree::{TreeRepr, walk_tree};

/// Owns every node of one or more scene trees.
///
/// Nodes live in an id-indexed arena; parent and child links are ids, so
/// reparenting never moves node data. All edits go through the graph (for
/// structure) or through a [`NodeMut`] (for fields) and are reported to the
/// registered [`Adaptor`]s.
///
/// # Example
///
/// ```
/// use cgmath::Point3;
/// use scenegraph::{NodeDescriptor, SceneGraph};
/// use scenegraph::geometry::Points;
///
/// let mut graph = SceneGraph::new();
/// let scene = graph.add_node(None, NodeDescriptor::scene()).unwrap();
/// let a = graph.add_node(Some(scene), Points::new(vec![Point3::new(0.0, 100.0, 0.0)])).unwrap();
/// let b = graph.add_node(Some(scene), Points::new(vec![Point3::new(100.0, 0.0, 1.0)])).unwrap();
///
/// let bounds = graph.bounding_box(scene).unwrap();
/// assert_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
/// assert_eq!(bounds.max, Point3::new(100.0, 100.0, 1.0));
/// # let _ = (a, b);
/// ```
#[derive(Default)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, Node>,
    root_nodes: Vec<NodeId>,
    adaptors: AdaptorList,
    /// Cameras owned by views: camera -> (scene, number of views).
    view_cameras: HashMap<NodeId, (NodeId, usize)>,

    next_node_id: NodeId,
    next_adaptor_id: AdaptorId,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Adaptors ==========

    /// Registers an observer that receives every subsequent change.
    pub fn add_adaptor(&mut self, adaptor: impl Adaptor + 'static) -> AdaptorId {
        let id = self.next_adaptor_id;
        self.next_adaptor_id += 1;
        self.adaptors.push((id, Box::new(adaptor)));
        id
    }

    /// Returns `true` if the adaptor was registered.
    pub fn remove_adaptor(&mut self, id: AdaptorId) -> bool {
        let before = self.adaptors.len();
        self.adaptors.retain(|(aid, _)| *aid != id);
        self.adaptors.len() != before
    }

    // ========== Node access ==========

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Like [`get_node`](Self::get_node), but a missing node is an error.
    pub fn node(&self, id: NodeId) -> SceneResult<&Node> {
        self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))
    }

    /// An editor for the fields of node `id`.
    pub fn node_mut(&mut self, id: NodeId) -> SceneResult<NodeMut<'_>> {
        let node = self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))?;
        Ok(NodeMut {
            node,
            adaptors: &mut self.adaptors,
        })
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes without a parent, in creation (or detachment) order.
    pub fn root_nodes(&self) -> &[NodeId] {
        &self.root_nodes
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(Node::parent)
    }

    /// Children of `id` in insertion order; empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(Node::children).unwrap_or(&[])
    }

    /// The camera data of node `id`.
    pub fn camera(&self, id: NodeId) -> SceneResult<&Camera> {
        let node = self.node(id)?;
        node.as_camera().ok_or_else(|| node.wrong_kind("camera"))
    }

    // ========== Structure ==========

    /// Adds a new node, either as a root or as the last child of `parent`.
    ///
    /// # Errors
    /// Returns [`SceneError::NodeNotFound`] if `parent` does not exist, or a
    /// validation error if a descriptor field is out of range. Nothing is
    /// added on error.
    pub fn add_node(
        &mut self,
        parent: Option<NodeId>,
        descriptor: impl Into<NodeDescriptor>,
    ) -> SceneResult<NodeId> {
        let descriptor = descriptor.into();
        descriptor.validate()?;
        if let Some(parent_id) = parent {
            if !self.nodes.contains_key(&parent_id) {
                return Err(SceneError::NodeNotFound(parent_id));
            }
        }

        let id = self.next_node_id;
        self.next_node_id += 1;

        let mut node = Node::from_descriptor(id, descriptor);
        node.set_parent(parent);
        self.nodes.insert(id, node);

        match parent.and_then(|parent_id| self.nodes.get_mut(&parent_id)) {
            Some(parent_node) => parent_node.push_child(id),
            None => self.root_nodes.push(id),
        }

        if let Some(node) = self.nodes.get(&id) {
            log::debug!("Added {} node {id}", node.kind().name());
            broadcast(&mut self.adaptors, id, &NodeChange::Created(node));
        }
        if let Some(parent_id) = parent {
            broadcast(&mut self.adaptors, parent_id, &NodeChange::ChildAdded(id));
        }
        Ok(id)
    }

    /// Makes `child` the last child of `parent`, detaching it from its
    /// previous parent first.
    ///
    /// The move is atomic: on error nothing changes, and on success `child`
    /// appears in exactly one children list.
    ///
    /// # Errors
    /// - [`SceneError::NodeNotFound`] if either node is missing.
    /// - [`SceneError::Cycle`] if `child` is `parent` or one of its ancestors.
    /// - [`SceneError::ViewCamera`] if `child` is a view's camera and
    ///   `parent` is not that view's scene.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.node(parent)?;
        let old_parent = self.node(child)?.parent();
        if let Some(&(scene, _)) = self.view_cameras.get(&child) {
            if scene != parent {
                return Err(SceneError::ViewCamera { camera: child, scene });
            }
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::Cycle { parent, child });
        }
        if old_parent == Some(parent) {
            return Ok(());
        }

        self.unlink(child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.set_parent(Some(parent));
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.push_child(child);
        }

        if let Some(old) = old_parent {
            broadcast(&mut self.adaptors, old, &NodeChange::ChildRemoved(child));
        }
        broadcast(&mut self.adaptors, child, &NodeChange::Parent(Some(parent)));
        broadcast(&mut self.adaptors, parent, &NodeChange::ChildAdded(child));
        Ok(())
    }

    /// Detaches `child` from `parent`, making it a root.
    ///
    /// Returns `Ok(false)` without changing anything when `child` is not a
    /// child of `parent`, and [`SceneError::ViewCamera`] when `child` is the
    /// camera of a view of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<bool> {
        self.node(parent)?;
        if self.parent(child) != Some(parent) {
            return Ok(false);
        }
        self.check_not_view_camera(child)?;

        self.unlink(child);
        if let Some(node) = self.nodes.get_mut(&child) {
            node.set_parent(None);
        }
        self.root_nodes.push(child);

        broadcast(&mut self.adaptors, parent, &NodeChange::ChildRemoved(child));
        broadcast(&mut self.adaptors, child, &NodeChange::Parent(None));
        Ok(true)
    }

    /// Removes a single node from the graph and returns it.
    ///
    /// Children are not removed with it; they become roots. Event handlers
    /// referring to the node are not touched.
    ///
    /// # Errors
    /// [`SceneError::ViewCamera`] if `id` is a view's camera or the scene
    /// holding one.
    pub fn remove_node(&mut self, id: NodeId) -> SceneResult<Node> {
        let node = self.node(id)?;
        self.check_not_view_camera(id)?;
        if let Some(&camera) = node.children().iter().find(|&&c| self.view_cameras.contains_key(&c)) {
            return Err(SceneError::ViewCamera { camera, scene: id });
        }
        let parent = node.parent();
        self.unlink(id);

        let Some(mut node) = self.nodes.remove(&id) else {
            return Err(SceneError::NodeNotFound(id));
        };
        let orphans = node.children().to_vec();
        for &child in &orphans {
            node.remove_child(child);
            if let Some(child_node) = self.nodes.get_mut(&child) {
                child_node.set_parent(None);
            }
            self.root_nodes.push(child);
        }
        node.set_parent(None);

        if let Some(parent_id) = parent {
            broadcast(&mut self.adaptors, parent_id, &NodeChange::ChildRemoved(id));
        }
        for &child in &orphans {
            broadcast(&mut self.adaptors, child, &NodeChange::Parent(None));
        }
        broadcast(&mut self.adaptors, id, &NodeChange::Removed);
        log::debug!("Removed node {id}, {} children detached", orphans.len());
        Ok(node)
    }

    /// Parents `camera` under `scene` and keeps it there until every view
    /// sharing it has been released.
    pub(crate) fn bind_view_camera(&mut self, scene: NodeId, camera: NodeId) -> SceneResult<()> {
        self.add_child(scene, camera)?;
        self.view_cameras.entry(camera).or_insert((scene, 0)).1 += 1;
        Ok(())
    }

    /// Drops one view's claim on `camera`.
    pub(crate) fn release_view_camera(&mut self, camera: NodeId) {
        if let Some((_, count)) = self.view_cameras.get_mut(&camera) {
            *count -= 1;
            if *count == 0 {
                self.view_cameras.remove(&camera);
            }
        }
    }

    /// Whether `camera` currently belongs to a view.
    pub fn is_view_camera(&self, camera: NodeId) -> bool {
        self.view_cameras.contains_key(&camera)
    }

    fn check_not_view_camera(&self, id: NodeId) -> SceneResult<()> {
        match self.view_cameras.get(&id) {
            Some(&(scene, _)) => Err(SceneError::ViewCamera { camera: id, scene }),
            None => Ok(()),
        }
    }

    /// Takes `id` out of its parent's children list (or the root list).
    /// Leaves the node's own parent link for the caller to reset.
    fn unlink(&mut self, id: NodeId) {
        match self.parent(id) {
            Some(parent_id) => {
                if let Some(parent) = self.nodes.get_mut(&parent_id) {
                    parent.remove_child(id);
                }
            }
            None => self.root_nodes.retain(|&root| root != id),
        }
    }

    // ========== Paths and transforms ==========

    /// `id`, then its parent, then its grandparent, up to the root.
    pub fn iter_parents(&self, id: NodeId) -> Parents<'_> {
        Parents {
            graph: self,
            next: self.contains(id).then_some(id),
        }
    }

    /// True when `ancestor` is `node` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.iter_parents(node).any(|id| id == ancestor)
    }

    /// The path between two nodes through their nearest common ancestor.
    ///
    /// The first list starts at `from` and ends at the common ancestor. The
    /// second continues from just below the common ancestor down to `to`.
    /// For the tree
    ///
    /// ```text
    /// A --- B --- C --- D
    ///        \
    ///         --- E --- F
    /// ```
    ///
    /// the path from D to F is `([D, C, B], [E, F])`.
    pub fn path_to_node(&self, from: NodeId, to: NodeId) -> SceneResult<(Vec<NodeId>, Vec<NodeId>)> {
        self.node(from)?;
        self.node(to)?;
        let mine: Vec<NodeId> = self.iter_parents(from).collect();
        let theirs: Vec<NodeId> = self.iter_parents(to).collect();

        let common = mine
            .iter()
            .position(|id| theirs.contains(id))
            .ok_or(SceneError::NoCommonAncestor(from, to))?;
        let common_id = mine[common];
        let down_len = theirs
            .iter()
            .position(|&id| id == common_id)
            .ok_or(SceneError::NoCommonAncestor(from, to))?;

        let up = mine[..=common].to_vec();
        let down = theirs[..down_len].iter().rev().copied().collect();
        Ok((up, down))
    }

    /// The transform mapping coordinates in the frame of `from` to the frame
    /// of `to`.
    ///
    /// # Errors
    /// [`SceneError::NoCommonAncestor`] if the nodes are in different trees,
    /// or [`SceneError::Transform`] if a transform on the way down is
    /// singular.
    pub fn transform_to_node(&self, from: NodeId, to: NodeId) -> SceneResult<Transform> {
        let (up, down) = self.path_to_node(from, to)?;

        // In the order they are applied to a point
        let mut steps = Vec::with_capacity(up.len() + down.len());
        for &id in &up[..up.len() - 1] {
            steps.push(*self.node(id)?.transform());
        }
        for &id in &down {
            steps.push(self.node(id)?.transform().inv()?);
        }
        steps.reverse();
        Ok(Transform::chain(&steps))
    }

    /// Maps the node's local frame to the frame above its root, including
    /// the root's own transform.
    pub fn world_transform(&self, id: NodeId) -> SceneResult<Transform> {
        self.node(id)?;
        let mut steps = Vec::new();
        for ancestor in self.iter_parents(id) {
            steps.push(*self.node(ancestor)?.transform());
        }
        steps.reverse();
        Ok(Transform::chain(&steps))
    }

    /// The world-to-NDC matrix of `camera` as seen from the `scene` frame.
    pub fn view_projection(&self, camera: NodeId, scene: NodeId) -> SceneResult<Transform> {
        let data = self.camera(camera)?;
        data.view_projection(&self.transform_to_node(camera, scene)?)
    }

    /// Bounds of a node's geometry and all its descendants, in the node's
    /// local frame.
    ///
    /// Returns `None` when nothing in the subtree has geometry (or `id` is
    /// unknown), which is distinct from a zero-size box.
    pub fn bounding_box(&self, id: NodeId) -> Option<Aabb> {
        let node = self.get_node(id)?;
        let mut merged = node.kind().bounding_box();

        for &child_id in node.children() {
            let Some(child) = self.get_node(child_id) else {
                continue;
            };
            if let Some(child_bounds) = self.bounding_box(child_id) {
                let mapped = child_bounds.transform(child.transform());
                merged = Some(match merged {
                    Some(existing) => existing.merge(&mapped),
                    None => mapped,
                });
            }
        }
        merged
    }

    /// An indented, one-line-per-node dump of the subtree under `id`.
    pub fn tree_repr(&self, id: NodeId) -> String {
        let mut repr = TreeRepr::default();
        walk_tree(self, id, &mut repr);
        repr.finish()
    }
}

/// Iterator over a node and its ancestors. See [`SceneGraph::iter_parents`].
pub struct Parents<'a> {
    graph: &'a SceneGraph,
    next: Option<NodeId>,
}

impl Iterator for Parents<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.graph.parent(id);
        Some(id)
    }
}

fn unsupported(kind: &NodeKind, field: &'static str) -> SceneError {
    SceneError::UnsupportedField {
        kind: kind.name(),
        field,
    }
}

/// Edits one node's fields, validating each assignment and reporting it to
/// the graph's adaptors.
///
/// Setters for fields the node's kind does not have return
/// [`SceneError::UnsupportedField`]. A rejected assignment leaves the node
/// unchanged and notifies nobody.
pub struct NodeMut<'a> {
    node: &'a mut Node,
    adaptors: &'a mut AdaptorList,
}

impl NodeMut<'_> {
    pub fn node(&self) -> &Node {
        self.node
    }

    pub fn id(&self) -> NodeId {
        self.node.id
    }

    fn notify(&mut self, change: NodeChange<'_>) {
        broadcast(self.adaptors, self.node.id, &change);
    }

    // ========== Base fields ==========

    pub fn set_name(&mut self, name: Option<String>) {
        self.node.set_name(name);
        broadcast(self.adaptors, self.node.id, &NodeChange::Name(self.node.name()));
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.node.set_transform(transform);
        self.notify(NodeChange::Transform(transform));
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.node.set_visible(visible);
        self.notify(NodeChange::Visible(visible));
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.node.set_interactive(interactive);
        self.notify(NodeChange::Interactive(interactive));
    }

    pub fn set_opacity(&mut self, opacity: f64) -> SceneResult<()> {
        self.node.set_opacity(opacity)?;
        self.notify(NodeChange::Opacity(opacity));
        Ok(())
    }

    pub fn set_order(&mut self, order: u32) {
        self.node.set_order(order);
        self.notify(NodeChange::Order(order));
    }

    pub fn set_blending(&mut self, blending: BlendMode) {
        self.node.set_blending(blending);
        self.notify(NodeChange::Blending(blending));
    }

    // ========== Camera ==========

    fn camera_transform(&self) -> SceneResult<&Transform> {
        match self.node.kind() {
            NodeKind::Camera(_) => Ok(self.node.transform()),
            _ => Err(self.node.wrong_kind("camera")),
        }
    }

    pub fn set_projection(&mut self, projection: Transform) -> SceneResult<()> {
        let id = self.node.id;
        match self.node.kind_mut() {
            NodeKind::Camera(camera) => camera.set_projection(projection),
            other => return Err(unsupported(other, "projection")),
        }
        broadcast(self.adaptors, id, &NodeChange::Projection(projection));
        Ok(())
    }

    pub fn set_controller(&mut self, controller: Option<Controller>) -> SceneResult<()> {
        let id = self.node.id;
        match self.node.kind_mut() {
            NodeKind::Camera(camera) => {
                camera.set_controller(controller);
                broadcast(self.adaptors, id, &NodeChange::Controller(camera.controller()));
                Ok(())
            }
            other => Err(unsupported(other, "controller")),
        }
    }

    /// Turns the camera in place to look along `direction`.
    pub fn set_forward(&mut self, direction: Vector3<f64>) -> SceneResult<()> {
        let transform = camera::with_forward(self.camera_transform()?, direction)?;
        self.set_transform(transform);
        Ok(())
    }

    /// Rolls the camera about its view axis so that `direction` is up.
    pub fn set_up(&mut self, direction: Vector3<f64>) -> SceneResult<()> {
        let transform = camera::with_up(self.camera_transform()?, direction)?;
        self.set_transform(transform);
        Ok(())
    }

    /// Points the camera at `target` (in its parent's frame). On error the
    /// transform is left unchanged.
    pub fn look_at(&mut self, target: Point3<f64>, up: Option<Vector3<f64>>) -> SceneResult<()> {
        let transform = camera::look_at(self.camera_transform()?, target, up)?;
        self.set_transform(transform);
        Ok(())
    }

    /// Lets the camera's controller react to `event`, then reports any
    /// resulting transform or projection change. Returns whether the
    /// controller consumed the event.
    pub(crate) fn drive_controller(&mut self, event: &Event) -> bool {
        let id = self.node.id;
        let transform = *self.node.transform();
        let NodeKind::Camera(camera) = self.node.kind_mut() else {
            return false;
        };
        let projection = *camera.projection();
        let Some(controller) = camera.controller_mut() else {
            return false;
        };

        let mut pose = CameraPose {
            transform,
            projection,
        };
        let handled = controller.handle_event(event, &mut pose);

        if pose.projection != projection {
            camera.set_projection(pose.projection);
            broadcast(self.adaptors, id, &NodeChange::Projection(pose.projection));
        }
        if pose.transform != transform {
            self.set_transform(pose.transform);
        }
        handled
    }

    // ========== Points ==========

    pub fn set_coords(&mut self, coords: Vec<Point3<f64>>) -> SceneResult<()> {
        let id = self.node.id;
        match self.node.kind_mut() {
            NodeKind::Points(points) => {
                points.set_coords(coords);
                broadcast(self.adaptors, id, &NodeChange::Coords(points.coords()));
                Ok(())
            }
            other => Err(unsupported(other, "coords")),
        }
    }

    /// Marker size for points, font size for text.
    pub fn set_size(&mut self, size: f64) -> SceneResult<()> {
        match self.node.kind_mut() {
            NodeKind::Points(points) => points.set_size(size)?,
            NodeKind::Text(text) => text.set_size(size)?,
            other => return Err(unsupported(other, "size")),
        }
        self.notify(NodeChange::Size(size));
        Ok(())
    }

    pub fn set_face_color(&mut self, color: Option<Color>) -> SceneResult<()> {
        match self.node.kind_mut() {
            NodeKind::Points(points) => points.set_face_color(color),
            other => return Err(unsupported(other, "face_color")),
        }
        self.notify(NodeChange::FaceColor(color));
        Ok(())
    }

    pub fn set_edge_color(&mut self, color: Option<Color>) -> SceneResult<()> {
        match self.node.kind_mut() {
            NodeKind::Points(points) => points.set_edge_color(color),
            other => return Err(unsupported(other, "edge_color")),
        }
        self.notify(NodeChange::EdgeColor(color));
        Ok(())
    }

    pub fn set_edge_width(&mut self, edge_width: f64) -> SceneResult<()> {
        match self.node.kind_mut() {
            NodeKind::Points(points) => points.set_edge_width(edge_width)?,
            other => return Err(unsupported(other, "edge_width")),
        }
        self.notify(NodeChange::EdgeWidth(edge_width));
        Ok(())
    }

    pub fn set_symbol(&mut self, symbol: Symbol) -> SceneResult<()> {
        match self.node.kind_mut() {
            NodeKind::Points(points) => points.set_symbol(symbol),
            other => return Err(unsupported(other, "symbol")),
        }
        self.notify(NodeChange::Symbol(symbol));
        Ok(())
    }

    pub fn set_scaling(&mut self, scaling: Scaling) -> SceneResult<()> {
        match self.node.kind_mut() {
            NodeKind::Points(points) => points.set_scaling(scaling),
            other => return Err(unsupported(other, "scaling")),
        }
        self.notify(NodeChange::Scaling(scaling));
        Ok(())
    }

    pub fn set_antialias(&mut self, antialias: f64) -> SceneResult<()> {
        match self.node.kind_mut() {
            NodeKind::Points(points) => points.set_antialias(antialias)?,
            NodeKind::Line(line) => line.set_antialias(antialias)?,
            other => return Err(unsupported(other, "antialias")),
        }
        self.notify(NodeChange::Antialias(antialias));
        Ok(())
    }

    // ========== Line and mesh ==========

    pub fn set_vertices(&mut self, vertices: Vec<Point3<f64>>) -> SceneResult<()> {
        let id = self.node.id;
        let stored = match self.node.kind_mut() {
            NodeKind::Line(line) => {
                line.set_vertices(vertices);
                line.vertices()
            }
            NodeKind::Mesh(mesh) => {
                mesh.set_vertices(vertices);
                mesh.vertices()
            }
            other => return Err(unsupported(other, "vertices")),
        };
        broadcast(self.adaptors, id, &NodeChange::Vertices(stored));
        Ok(())
    }

    /// Line colors may be uniform or per vertex; meshes accept any model.
    pub fn set_color(&mut self, color: ColorModel) -> SceneResult<()> {
        let id = self.node.id;
        let stored = match self.node.kind_mut() {
            NodeKind::Line(line) => {
                line.set_color(color)?;
                line.color()
            }
            NodeKind::Mesh(mesh) => {
                mesh.set_color(color);
                mesh.color()
            }
            other => return Err(unsupported(other, "color")),
        };
        broadcast(self.adaptors, id, &NodeChange::Color(stored));
        Ok(())
    }

    pub fn set_width(&mut self, width: f64) -> SceneResult<()> {
        match self.node.kind_mut() {
            NodeKind::Line(line) => line.set_width(width)?,
            other => return Err(unsupported(other, "width")),
        }
        self.notify(NodeChange::Width(width));
        Ok(())
    }

    pub fn set_faces(&mut self, faces: Vec<[u32; 3]>) -> SceneResult<()> {
        let id = self.node.id;
        match self.node.kind_mut() {
            NodeKind::Mesh(mesh) => {
                mesh.set_faces(faces)?;
                broadcast(self.adaptors, id, &NodeChange::Faces(mesh.faces()));
                Ok(())
            }
            other => Err(unsupported(other, "faces")),
        }
    }

    // ========== Image and volume ==========

    pub fn set_data(&mut self, data: ArrayData) -> SceneResult<()> {
        let id = self.node.id;
        let stored = match self.node.kind_mut() {
            NodeKind::Image(image) => {
                image.set_data(data)?;
                image.data()
            }
            NodeKind::Volume(volume) => {
                volume.set_data(data)?;
                volume.data()
            }
            other => return Err(unsupported(other, "data")),
        };
        broadcast(self.adaptors, id, &NodeChange::Data(stored));
        Ok(())
    }

    pub fn set_cmap(&mut self, cmap: impl Into<String>) -> SceneResult<()> {
        let id = self.node.id;
        let cmap = cmap.into();
        let stored = match self.node.kind_mut() {
            NodeKind::Image(image) => {
                image.set_cmap(cmap);
                image.cmap()
            }
            NodeKind::Volume(volume) => {
                volume.set_cmap(cmap);
                volume.cmap()
            }
            other => return Err(unsupported(other, "cmap")),
        };
        broadcast(self.adaptors, id, &NodeChange::Cmap(stored));
        Ok(())
    }

    pub fn set_clims(&mut self, clims: Option<(f64, f64)>) -> SceneResult<()> {
        match self.node.kind_mut() {
            NodeKind::Image(image) => image.set_clims(clims)?,
            NodeKind::Volume(volume) => volume.set_clims(clims)?,
            other => return Err(unsupported(other, "clims")),
        }
        self.notify(NodeChange::Clims(clims));
        Ok(())
    }

    pub fn set_gamma(&mut self, gamma: f64) -> SceneResult<()> {
        match self.node.kind_mut() {
            NodeKind::Image(image) => image.set_gamma(gamma)?,
            NodeKind::Volume(volume) => volume.set_gamma(gamma)?,
            other => return Err(unsupported(other, "gamma")),
        }
        self.notify(NodeChange::Gamma(gamma));
        Ok(())
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) -> SceneResult<()> {
        match self.node.kind_mut() {
            NodeKind::Image(image) => image.set_interpolation(interpolation),
            NodeKind::Volume(volume) => volume.set_interpolation(interpolation),
            other => return Err(unsupported(other, "interpolation")),
        }
        self.notify(NodeChange::Interpolation(interpolation));
        Ok(())
    }

    pub fn set_render_mode(&mut self, render_mode: RenderMode) -> SceneResult<()> {
        match self.node.kind_mut() {
            NodeKind::Volume(volume) => volume.set_render_mode(render_mode),
            other => return Err(unsupported(other, "render_mode")),
        }
        self.notify(NodeChange::RenderMode(render_mode));
        Ok(())
    }

    // ========== Text ==========

    pub fn set_text(&mut self, text: impl Into<String>) -> SceneResult<()> {
        let id = self.node.id;
        match self.node.kind_mut() {
            NodeKind::Text(label) => {
                label.set_text(text.into());
                broadcast(self.adaptors, id, &NodeChange::Text(label.text()));
                Ok(())
            }
            other => Err(unsupported(other, "text")),
        }
    }

    pub fn set_text_color(&mut self, color: Color) -> SceneResult<()> {
        match self.node.kind_mut() {
            NodeKind::Text(label) => label.set_color(color),
            other => return Err(unsupported(other, "text_color")),
        }
        self.notify(NodeChange::TextColor(color));
        Ok(())
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
