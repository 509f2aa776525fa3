//! The canvas: a window-sized surface holding one or more views, and the
//! entry point for raw input.

use cgmath::Point3;

use crate::color::Color;
use crate::common::{Projector, Ray, RaySource, ViewId};
use crate::error::{SceneError, SceneResult};
use crate::event::{Event, EventContext, EventDispatcher, HandlerTarget, InputEvent};
use crate::geom_query::{Intersection, intersections};
use crate::graph::SceneGraph;
use crate::grid::{Grid, check_weights};
use crate::view::View;

/// Configuration for a [`Canvas`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CanvasConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    pub title: String,
    pub background_color: Color,
    pub visible: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            title: String::new(),
            background_color: Color::BLACK,
            visible: false,
        }
    }
}

/// A surface with views laid out on a [`Grid`].
///
/// The canvas owns its views and the [`EventDispatcher`] holding node and
/// view handlers. It turns raw [`InputEvent`]s into routed [`Event`]s:
///
/// 1. The view under the cursor is found and the cursor is unprojected into
///    a ray in that view's scene frame.
/// 2. The nearest node hit by the ray and then its ancestors (up to the
///    view's scene) are offered the event, skipping non-interactive nodes.
/// 3. The view's own handlers are offered the event.
/// 4. If the view's camera is interactive, its controller gets the event.
///
/// Routing stops at the first handler that reports the event handled.
pub struct Canvas {
    config: CanvasConfig,
    views: Vec<(ViewId, View)>,
    grid: Grid,
    dispatcher: EventDispatcher,
    last_mouse_view: Option<ViewId>,
    next_view_id: ViewId,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl Canvas {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            config,
            views: Vec::new(),
            grid: Grid::new(),
            dispatcher: EventDispatcher::new(),
            last_mouse_view: None,
            next_view_id: 0,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Resizes the canvas and lays the views out again.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        self.compute_layout();
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Replaces the grid row and column weights and lays the views out again.
    ///
    /// # Errors
    /// [`SceneError::Validation`] if any weight is not positive; neither set
    /// of weights changes then.
    pub fn set_grid_sizes(&mut self, row_sizes: Vec<f64>, col_sizes: Vec<f64>) -> SceneResult<()> {
        let col_sizes = check_weights("col_sizes", col_sizes)?;
        self.grid.set_row_sizes(row_sizes)?;
        self.grid.set_col_sizes(col_sizes)?;
        self.compute_layout();
        Ok(())
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut EventDispatcher {
        &mut self.dispatcher
    }

    // ========== Views ==========

    /// Adds a view in the first free column of the top row.
    pub fn add_view(&mut self, view: View) -> ViewId {
        self.add_view_at(view, Some(0), None, 1, 1)
    }

    /// Adds a view at a grid position. See [`Grid::add`] for how missing
    /// coordinates are filled in.
    pub fn add_view_at(
        &mut self,
        view: View,
        row: Option<usize>,
        col: Option<usize>,
        rowspan: usize,
        colspan: usize,
    ) -> ViewId {
        let id = self.next_view_id;
        self.next_view_id += 1;
        self.views.push((id, view));
        self.grid.add(id, row, col, rowspan, colspan);
        self.compute_layout();
        id
    }

    /// Removes a view and every handler registered for it.
    ///
    /// The returned view still holds its camera under its scene; pass it to
    /// [`View::release`] to free the camera.
    pub fn remove_view(&mut self, id: ViewId) -> SceneResult<View> {
        let index = self
            .views
            .iter()
            .position(|(view_id, _)| *view_id == id)
            .ok_or(SceneError::ViewNotFound(id))?;
        let (_, view) = self.views.remove(index);
        self.grid.remove(id);
        self.dispatcher.clear(HandlerTarget::View(id));
        if self.last_mouse_view == Some(id) {
            self.last_mouse_view = None;
        }
        self.compute_layout();
        Ok(view)
    }

    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.views
            .iter()
            .find(|(view_id, _)| *view_id == id)
            .map(|(_, view)| view)
    }

    pub fn view_mut(&mut self, id: ViewId) -> Option<&mut View> {
        self.views
            .iter_mut()
            .find(|(view_id, _)| *view_id == id)
            .map(|(_, view)| view)
    }

    pub fn views(&self) -> impl Iterator<Item = (ViewId, &View)> {
        self.views.iter().map(|(id, view)| (*id, view))
    }

    /// The view under the cursor, if any.
    pub fn last_mouse_view(&self) -> Option<ViewId> {
        self.last_mouse_view
    }

    fn compute_layout(&mut self) {
        let width = f64::from(self.config.width);
        let height = f64::from(self.config.height);
        for (id, (x, y, w, h)) in self.grid.compute(width, height) {
            if let Some(view) = self.view_mut(id) {
                view.layout.x = x;
                view.layout.y = y;
                view.layout.width = w;
                view.layout.height = h;
            }
        }
    }

    // ========== Coordinates ==========

    /// The first visible view whose content area contains `pos`.
    pub fn containing_view(&self, pos: (f64, f64)) -> Option<ViewId> {
        self.views
            .iter()
            .find(|(_, view)| view.visible && view.layout.contains(pos))
            .map(|(id, _)| *id)
    }

    /// Maps a canvas position to normalized device coordinates of the view
    /// under it. Y is flipped: NDC grows upward.
    pub fn to_ndc(&self, pos: (f64, f64)) -> Option<(f64, f64)> {
        let view = self.view(self.containing_view(pos)?)?;
        let layout = &view.layout;
        let x = (pos.0 - layout.x) / layout.width * 2.0 - 1.0;
        let y = -((pos.1 - layout.y) / layout.height * 2.0 - 1.0);
        Some((x, y))
    }

    /// Casts a ray through a canvas position into the scene frame of the
    /// view under it.
    ///
    /// Returns `None` outside every view, and (with a warning) when the
    /// view's camera matrix cannot be inverted.
    pub fn to_world(&self, graph: &SceneGraph, pos: (f64, f64)) -> Option<Ray> {
        let view_id = self.containing_view(pos)?;
        let view = self.view(view_id)?;
        let (x, y) = self.to_ndc(pos)?;

        let world_to_ndc = match view.camera_matrix(graph) {
            Ok(matrix) => matrix,
            Err(err) => {
                log::warn!("View {view_id} has no usable camera matrix: {err}");
                return None;
            }
        };
        let ndc_to_world = match world_to_ndc.inv() {
            Ok(inverse) => inverse,
            Err(err) => {
                log::warn!("Cannot unproject cursor in view {view_id}: {err}");
                return None;
            }
        };

        let near = ndc_to_world.map(Point3::new(x, y, 0.0));
        let far = ndc_to_world.map(Point3::new(x, y, 1.0));
        let source = RaySource {
            view: view_id,
            projector: Projector {
                world_to_ndc,
                width: view.layout.width,
                height: view.layout.height,
            },
        };
        Some(Ray::new(near, far - near).with_source(source))
    }

    // ========== Events ==========

    /// Routes one raw input event. Returns whether any handler consumed it.
    pub fn handle(&mut self, graph: &mut SceneGraph, input: InputEvent) -> bool {
        match input {
            InputEvent::Resize { width, height } => {
                self.set_size(width, height);
                let event = Event::Resize { width, height };
                let ids: Vec<ViewId> = self
                    .views
                    .iter()
                    .filter(|(_, view)| view.visible)
                    .map(|(id, _)| *id)
                    .collect();
                let mut handled = false;
                for id in ids {
                    handled |= self.offer_to_view(graph, id, &event, &[]);
                }
                handled
            }
            InputEvent::MouseLeave => match self.last_mouse_view.take() {
                Some(previous) => self.offer_to_view(graph, previous, &Event::MouseLeave, &[]),
                None => false,
            },
            _ => {
                let Some(pos) = input.pos() else {
                    return false;
                };
                let current = self.containing_view(pos);
                let ray = self.to_world(graph, pos);

                if current != self.last_mouse_view {
                    if let Some(previous) = self.last_mouse_view {
                        self.offer_to_view(graph, previous, &Event::MouseLeave, &[]);
                    }
                    self.last_mouse_view = current;
                    if let (Some(view), Some(ray)) = (current, ray) {
                        let enter = Event::from_input(&input, ray).and_then(|event| {
                            event.mouse().map(|mouse| Event::MouseEnter(*mouse))
                        });
                        if let Some(enter) = enter {
                            self.offer_to_view(graph, view, &enter, &[]);
                        }
                    }
                }

                let (Some(view), Some(ray)) = (current, ray) else {
                    return false;
                };
                let Some(event) = Event::from_input(&input, ray) else {
                    return false;
                };
                self.route(graph, view, &event)
            }
        }
    }

    /// Picks under the event's ray and offers the event to the nearest
    /// interactive hit and its interactive ancestors, then to the view.
    fn route(&mut self, graph: &mut SceneGraph, view_id: ViewId, event: &Event) -> bool {
        let Some(view) = self.view(view_id) else {
            return false;
        };
        let scene = view.scene();
        let hits = match event.mouse() {
            Some(mouse) => intersections(graph, &mouse.world_ray, scene),
            None => Vec::new(),
        };

        // The nearest interactive hit starts the bubble; without one, the
        // nearest hit's ancestors may still take the event.
        let start = hits
            .iter()
            .find(|hit| graph.get_node(hit.node).is_some_and(|n| n.interactive()))
            .or_else(|| hits.first());
        if let Some(start) = start {
            let chain: Vec<_> = graph.iter_parents(start.node).collect();
            for node in chain {
                let interactive = graph.get_node(node).is_some_and(|n| n.interactive());
                if interactive {
                    let mut ctx = EventContext {
                        graph: &mut *graph,
                        view: view_id,
                        node: Some(node),
                        hits: &hits,
                    };
                    if self.dispatcher.dispatch(HandlerTarget::Node(node), event, &mut ctx) {
                        return true;
                    }
                }
                if node == scene {
                    break;
                }
            }
        }

        self.offer_to_view(graph, view_id, event, &hits)
    }

    /// Offers an event to a view's handlers, then to its camera controller.
    fn offer_to_view(
        &mut self,
        graph: &mut SceneGraph,
        view_id: ViewId,
        event: &Event,
        hits: &[Intersection],
    ) -> bool {
        let Some(view) = self.view(view_id) else {
            return false;
        };
        let camera = view.camera();

        let mut ctx = EventContext {
            graph: &mut *graph,
            view: view_id,
            node: None,
            hits,
        };
        if self.dispatcher.dispatch(HandlerTarget::View(view_id), event, &mut ctx) {
            return true;
        }

        if !graph.get_node(camera).is_some_and(|n| n.interactive()) {
            return false;
        }
        match graph.node_mut(camera) {
            Ok(mut node) => {
                let handled = node.drive_controller(event);
                if handled {
                    log::debug!("{:?} handled by controller of camera {camera}", event.kind());
                }
                handled
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::common::EPSILON;
    use crate::event::{EventKind, MouseButtons};
    use crate::node::NodeDescriptor;
    use crate::projections::orthographic;
    use cgmath::{InnerSpace, Vector3};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn graph_with_view() -> (SceneGraph, View) {
        let mut graph = SceneGraph::new();
        let scene = graph.add_node(None, NodeDescriptor::scene()).unwrap();
        let camera = graph.add_node(None, Camera::new()).unwrap();
        let view = View::new(&mut graph, scene, camera).unwrap();
        (graph, view)
    }

    fn moved(pos: (f64, f64)) -> InputEvent {
        InputEvent::MouseMove {
            pos,
            buttons: MouseButtons::empty(),
        }
    }

    #[test]
    fn test_single_view_fills_canvas() {
        let (_, view) = graph_with_view();
        let mut canvas = Canvas::default();
        let id = canvas.add_view(view);
        assert_eq!(canvas.view(id).unwrap().layout.width, 500.0);
        assert_eq!(canvas.view(id).unwrap().layout.height, 500.0);

        canvas.set_size(300, 200);
        let layout = canvas.view(id).unwrap().layout;
        assert_eq!((layout.width, layout.height), (300.0, 200.0));
    }

    #[test]
    fn test_to_ndc_flips_y() {
        let (_, view) = graph_with_view();
        let mut canvas = Canvas::default();
        canvas.add_view(view);
        assert_eq!(canvas.to_ndc((250.0, 250.0)), Some((0.0, 0.0)));
        assert_eq!(canvas.to_ndc((0.0, 0.0)), Some((-1.0, 1.0)));
        assert_eq!(canvas.to_ndc((500.0, 500.0)), Some((1.0, -1.0)));
        assert_eq!(canvas.to_ndc((501.0, 10.0)), None);
    }

    #[test]
    fn test_to_world_follows_camera_axis() {
        let (mut graph, view) = graph_with_view();
        let camera = view.camera();
        graph
            .node_mut(camera)
            .unwrap()
            .set_transform(crate::common::Transform::identity().translated(Vector3::new(0.0, 0.0, 5.0)));
        graph
            .node_mut(camera)
            .unwrap()
            .set_projection(orthographic(10.0, 10.0, 10.0))
            .unwrap();

        let mut canvas = Canvas::default();
        let id = canvas.add_view(view);
        let ray = canvas.to_world(&graph, (250.0, 250.0)).unwrap();
        assert!((ray.origin - Point3::new(0.0, 0.0, 5.0)).magnitude() < EPSILON);
        assert!((ray.direction - Vector3::new(0.0, 0.0, -1.0)).magnitude() < EPSILON);
        assert_eq!(ray.source.map(|s| s.view), Some(id));

        let corner = canvas.to_world(&graph, (0.0, 0.0)).unwrap();
        assert!((corner.origin.x + 5.0).abs() < EPSILON);
        assert!((corner.origin.y - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_hidden_view_is_skipped() {
        let (graph, view) = graph_with_view();
        let mut canvas = Canvas::default();
        let id = canvas.add_view(view);
        canvas.view_mut(id).unwrap().visible = false;
        assert_eq!(canvas.containing_view((10.0, 10.0)), None);
        assert!(canvas.to_world(&graph, (10.0, 10.0)).is_none());
    }

    #[test]
    fn test_views_share_top_row() {
        let (mut graph, left) = graph_with_view();
        let scene = graph.add_node(None, NodeDescriptor::scene()).unwrap();
        let camera = graph.add_node(None, Camera::new()).unwrap();
        let right = View::new(&mut graph, scene, camera).unwrap();

        let mut canvas = Canvas::default();
        let a = canvas.add_view(left);
        let b = canvas.add_view(right);
        assert_eq!(canvas.containing_view((100.0, 100.0)), Some(a));
        assert_eq!(canvas.containing_view((400.0, 100.0)), Some(b));
        assert_eq!(canvas.view(b).unwrap().layout.x, 250.0);
    }

    #[test]
    fn test_grid_sizes_reject_zero_weights() {
        let (mut graph, left) = graph_with_view();
        let scene = graph.add_node(None, NodeDescriptor::scene()).unwrap();
        let camera = graph.add_node(None, Camera::new()).unwrap();
        let right = View::new(&mut graph, scene, camera).unwrap();

        let mut canvas = Canvas::default();
        canvas.add_view(left);
        let b = canvas.add_view(right);
        canvas.set_grid_sizes(vec![1.0], vec![1.0, 4.0]).unwrap();
        assert_eq!(canvas.view(b).unwrap().layout.x, 100.0);

        assert!(canvas.set_grid_sizes(vec![1.0], vec![0.0, 0.0]).is_err());
        assert!(canvas.set_grid_sizes(vec![0.0], vec![1.0, 1.0]).is_err());
        assert_eq!(canvas.grid().col_sizes(), &[1.0, 4.0]);
        assert_eq!(canvas.grid().row_sizes(), &[1.0]);
        let layout = canvas.view(b).unwrap().layout;
        assert_eq!((layout.x, layout.width), (100.0, 400.0));
    }

    #[test]
    fn test_remove_view_drops_handlers() {
        let (_, view) = graph_with_view();
        let mut canvas = Canvas::default();
        let id = canvas.add_view(view);
        canvas.dispatcher_mut().register(HandlerTarget::View(id), |_, _| true);
        assert!(canvas.remove_view(id).is_ok());
        assert!(!canvas.dispatcher().has_handlers(HandlerTarget::View(id)));
        assert!(matches!(canvas.remove_view(id), Err(SceneError::ViewNotFound(_))));
    }

    #[test]
    fn test_canvas_leave_clears_current_view() {
        let (mut graph, view) = graph_with_view();
        let mut canvas = Canvas::default();
        let id = canvas.add_view(view);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        canvas
            .dispatcher_mut()
            .register(HandlerTarget::View(id), move |event, _| {
                log.borrow_mut().push(event.kind());
                false
            });

        canvas.handle(&mut graph, moved((10.0, 10.0)));
        assert_eq!(canvas.last_mouse_view(), Some(id));
        canvas.handle(&mut graph, InputEvent::MouseLeave);
        assert_eq!(canvas.last_mouse_view(), None);

        assert_eq!(
            *seen.borrow(),
            vec![EventKind::MouseEnter, EventKind::MouseMove, EventKind::MouseLeave]
        );
    }
}
