use crate::color::Color;
use crate::common::{Projector, Transform};
use crate::error::{SceneError, SceneResult};
use crate::graph::SceneGraph;
use crate::node::{NodeId, NodeKind};

/// A rectangle on the canvas, in pixels (origin top-left, Y down), using a
/// CSS-like box model:
///
/// ```text
/// (x, y) +--------------------------------+
///        |            margin              |
///        |  +--------------------------+  |
///        |  |         border           |  |
///        |  |  +--------------------+  |  |
///        |  |  |      padding       |  |  |
///        |  |  |  +--------------+  |  |  |  height
///        |  |  |  |   content    |  |  |  |
///        |  |  |  +--------------+  |  |  |
///        |  |  +--------------------+  |  |
///        |  +--------------------------+  |
///        +--------------------------------+
///                      width
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    pub x: f64,
    pub y: f64,
    /// Total width including margin, border and padding.
    pub width: f64,
    /// Total height including margin, border and padding.
    pub height: f64,
    /// Fill inside the border; `None` is transparent.
    pub background_color: Option<Color>,
    pub border_width: f64,
    pub border_color: Option<Color>,
    pub padding: u32,
    pub margin: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 600.0,
            height: 600.0,
            background_color: Some(Color::BLACK),
            border_width: 0.0,
            border_color: Some(Color::BLACK),
            padding: 0,
            margin: 0,
        }
    }
}

impl Layout {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    fn inset(&self) -> f64 {
        f64::from(self.padding) + self.border_width + f64::from(self.margin)
    }

    /// `(x, y, width, height)` of the content area.
    pub fn content_rect(&self) -> (f64, f64, f64, f64) {
        let offset = self.inset();
        (
            self.x + offset,
            self.y + offset,
            self.width - 2.0 * offset,
            self.height - 2.0 * offset,
        )
    }

    /// Whether a canvas position lies in the content area, edges included.
    pub fn contains(&self, pos: (f64, f64)) -> bool {
        let (left, top, width, height) = self.content_rect();
        (left..=left + width).contains(&pos.0) && (top..=top + height).contains(&pos.1)
    }
}

/// A scene seen through a camera, placed on a canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    scene: NodeId,
    camera: NodeId,
    pub layout: Layout,
    /// Hidden views are neither drawn nor sent events.
    pub visible: bool,
}

impl View {
    /// Pairs `scene` with `camera`, making the camera a child of the scene.
    ///
    /// The graph then refuses to move or remove the camera, or to remove the
    /// scene, until the view is [released](Self::release).
    ///
    /// # Errors
    /// [`SceneError::WrongKind`] if `scene` is not a scene node or `camera`
    /// is not a camera, and the errors of [`SceneGraph::add_child`].
    pub fn new(graph: &mut SceneGraph, scene: NodeId, camera: NodeId) -> SceneResult<Self> {
        let scene_node = graph.node(scene)?;
        if !matches!(scene_node.kind(), NodeKind::Scene) {
            return Err(SceneError::WrongKind {
                node: scene,
                expected: "scene",
            });
        }
        graph.camera(camera)?;
        graph.bind_view_camera(scene, camera)?;

        Ok(Self {
            scene,
            camera,
            layout: Layout::default(),
            visible: true,
        })
    }

    /// Ends this view, letting its camera be reparented or removed again.
    pub fn release(self, graph: &mut SceneGraph) {
        graph.release_view_camera(self.camera);
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn scene(&self) -> NodeId {
        self.scene
    }

    pub fn camera(&self) -> NodeId {
        self.camera
    }

    /// The scene-to-NDC matrix of this view's camera.
    pub fn camera_matrix(&self, graph: &SceneGraph) -> SceneResult<Transform> {
        graph.view_projection(self.camera, self.scene)
    }

    /// Projects scene points to pixels relative to this view's top-left
    /// corner.
    pub fn projector(&self, graph: &SceneGraph) -> SceneResult<Projector> {
        Ok(Projector {
            world_to_ndc: self.camera_matrix(graph)?,
            width: self.layout.width,
            height: self.layout.height,
        })
    }
}
