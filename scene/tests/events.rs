use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use anyhow::Result;
use cgmath::{Point3, Vector3};
use scenegraph::common::Transform;
use scenegraph::geometry::{Points, Scaling};
use scenegraph::{
    Camera, Canvas, CanvasConfig, Event, EventContext, HandlerTarget, InputEvent, MouseButtons,
    NodeDescriptor, NodeId, PanZoom, SceneGraph, View, ViewId, orthographic,
};

fn init_logger() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

type Log = Rc<RefCell<Vec<String>>>;

/// scene
///  ├── camera (pan/zoom, at (1, 1, 1) looking down -z)
///  └── outer (interactive group)
///       └── marker (points at (1, 1, 0), radius 0.5)
struct Fixture {
    graph: SceneGraph,
    canvas: Canvas,
    scene: NodeId,
    view: ViewId,
    camera: NodeId,
    outer: NodeId,
    marker: NodeId,
}

fn fixture() -> Result<Fixture> {
    init_logger();
    let mut graph = SceneGraph::new();
    let scene = graph.add_node(None, NodeDescriptor::scene())?;
    let outer = graph.add_node(Some(scene), NodeDescriptor::scene().with_interactive(true))?;
    let marker = graph.add_node(
        Some(outer),
        NodeDescriptor::from(
            Points::new(vec![Point3::new(1.0, 1.0, 0.0)])
                .with_size(1.0)
                .with_edge_width(0.0)
                .with_scaling(Scaling::Scene),
        )
        .with_interactive(true),
    )?;
    let camera = graph.add_node(
        None,
        NodeDescriptor::from(
            Camera::new()
                .with_projection(orthographic(2.0, 2.0, 2.0))
                .with_controller(PanZoom::default()),
        )
        .with_transform(Transform::identity().translated(Vector3::new(1.0, 1.0, 1.0))),
    )?;

    let mut canvas = Canvas::new(CanvasConfig {
        width: 512,
        height: 512,
        ..Default::default()
    });
    let view = canvas.add_view(View::new(&mut graph, scene, camera)?);
    Ok(Fixture {
        graph,
        canvas,
        scene,
        view,
        camera,
        outer,
        marker,
    })
}

fn recorder(
    log: &Log,
    name: &str,
    handled: bool,
) -> impl FnMut(&Event, &mut EventContext<'_>) -> bool + 'static {
    let log = log.clone();
    let name = name.to_string();
    move |event, _| {
        log.borrow_mut().push(format!("{name}:{:?}", event.kind()));
        handled
    }
}

fn press(pos: (f64, f64)) -> InputEvent {
    InputEvent::MousePress {
        pos,
        buttons: MouseButtons::LEFT,
    }
}

const CENTER: (f64, f64) = (256.0, 256.0);

#[test]
fn test_nearest_node_then_ancestors() -> Result<()> {
    let mut f = fixture()?;
    let log = Log::default();
    let dispatcher = f.canvas.dispatcher_mut();
    dispatcher.register(HandlerTarget::Node(f.marker), recorder(&log, "marker", false));
    dispatcher.register(HandlerTarget::Node(f.outer), recorder(&log, "outer", true));
    dispatcher.register(HandlerTarget::View(f.view), recorder(&log, "view", true));

    assert!(f.canvas.handle(&mut f.graph, press(CENTER)));
    assert_eq!(
        *log.borrow(),
        vec!["view:MouseEnter", "marker:MousePress", "outer:MousePress"]
    );
    Ok(())
}

#[test]
fn test_interactive_node_behind_non_interactive_hit() -> Result<()> {
    let mut f = fixture()?;
    // Nearer than the marker along the center ray
    let front = f.graph.add_node(
        Some(f.scene),
        Points::new(vec![Point3::new(1.0, 1.0, 0.5)])
            .with_size(0.5)
            .with_edge_width(0.0)
            .with_scaling(Scaling::Scene),
    )?;
    let log = Log::default();
    let dispatcher = f.canvas.dispatcher_mut();
    dispatcher.register(HandlerTarget::Node(front), recorder(&log, "front", true));
    dispatcher.register(HandlerTarget::Node(f.marker), recorder(&log, "marker", true));

    let before = f.graph.node(f.camera)?.transform().origin();
    assert!(f.canvas.handle(&mut f.graph, press(CENTER)));
    assert_eq!(*log.borrow(), vec!["marker:MousePress"]);
    assert_eq!(f.graph.node(f.camera)?.transform().origin(), before);
    Ok(())
}

#[test]
fn test_non_interactive_nodes_are_skipped() -> Result<()> {
    let mut f = fixture()?;
    f.graph.node_mut(f.marker)?.set_interactive(false);
    let log = Log::default();
    let dispatcher = f.canvas.dispatcher_mut();
    dispatcher.register(HandlerTarget::Node(f.marker), recorder(&log, "marker", true));
    dispatcher.register(HandlerTarget::Node(f.outer), recorder(&log, "outer", true));

    assert!(f.canvas.handle(&mut f.graph, press(CENTER)));
    assert_eq!(*log.borrow(), vec!["outer:MousePress"]);
    Ok(())
}

#[test]
fn test_unhandled_events_reach_view_then_controller() -> Result<()> {
    let mut f = fixture()?;
    let log = Log::default();
    f.canvas
        .dispatcher_mut()
        .register(HandlerTarget::View(f.view), recorder(&log, "view", false));
    let before = *f.graph.camera(f.camera)?.projection();

    let wheel = InputEvent::Wheel {
        pos: (10.0, 10.0),
        buttons: MouseButtons::empty(),
        angle_delta: (0.0, 120.0),
    };
    assert!(f.canvas.handle(&mut f.graph, wheel));
    assert_eq!(*log.borrow(), vec!["view:MouseEnter", "view:Wheel"]);
    assert_ne!(*f.graph.camera(f.camera)?.projection(), before);
    Ok(())
}

#[test]
fn test_non_interactive_camera_ignores_input() -> Result<()> {
    let mut f = fixture()?;
    f.graph.node_mut(f.camera)?.set_interactive(false);
    let before = *f.graph.camera(f.camera)?.projection();

    let wheel = InputEvent::Wheel {
        pos: CENTER,
        buttons: MouseButtons::empty(),
        angle_delta: (0.0, 120.0),
    };
    assert!(!f.canvas.handle(&mut f.graph, wheel));
    assert_eq!(*f.graph.camera(f.camera)?.projection(), before);
    Ok(())
}

#[test]
fn test_handlers_can_edit_the_graph() -> Result<()> {
    let mut f = fixture()?;
    f.canvas
        .dispatcher_mut()
        .register(HandlerTarget::Node(f.marker), |_, ctx| {
            let Some(node) = ctx.node else {
                return false;
            };
            assert_eq!(ctx.hits.first().map(|hit| hit.node), Some(node));
            ctx.graph
                .node_mut(node)
                .and_then(|mut node| node.set_opacity(0.25))
                .is_ok()
        });

    assert!(f.canvas.handle(&mut f.graph, press(CENTER)));
    assert_eq!(f.graph.node(f.marker)?.opacity(), 0.25);
    Ok(())
}

#[test]
fn test_pan_drag_moves_camera() -> Result<()> {
    let mut f = fixture()?;
    // Miss the marker so the drag reaches the controller
    let start = (400.0, 256.0);
    f.canvas.handle(&mut f.graph, press(start));
    let moved = f.canvas.handle(
        &mut f.graph,
        InputEvent::MouseMove {
            pos: (400.0 + 128.0, 256.0),
            buttons: MouseButtons::LEFT,
        },
    );
    // The cursor left the canvas horizontally; nothing to route
    assert!(!moved);

    f.canvas.handle(
        &mut f.graph,
        InputEvent::MouseMove {
            pos: (464.0, 256.0),
            buttons: MouseButtons::LEFT,
        },
    );
    let origin = f.graph.node(f.camera)?.transform().origin();
    // 64 pixels right is 0.25 scene units; the camera moves the other way
    assert!((origin.x - 0.75).abs() < 1e-9);
    assert!((origin.y - 1.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_enter_and_leave_between_views() -> Result<()> {
    init_logger();
    let mut graph = SceneGraph::new();
    let mut canvas = Canvas::new(CanvasConfig {
        width: 200,
        height: 100,
        ..Default::default()
    });
    let mut views = Vec::new();
    for _ in 0..2 {
        let scene = graph.add_node(None, NodeDescriptor::scene())?;
        let camera = graph.add_node(None, Camera::new())?;
        views.push(canvas.add_view(View::new(&mut graph, scene, camera)?));
    }
    let (left, right) = (views[0], views[1]);

    let log = Log::default();
    canvas
        .dispatcher_mut()
        .register(HandlerTarget::View(left), recorder(&log, "left", false));
    canvas
        .dispatcher_mut()
        .register(HandlerTarget::View(right), recorder(&log, "right", false));

    let hover = |pos| InputEvent::MouseMove {
        pos,
        buttons: MouseButtons::empty(),
    };
    canvas.handle(&mut graph, hover((50.0, 50.0)));
    canvas.handle(&mut graph, hover((150.0, 50.0)));
    canvas.handle(&mut graph, InputEvent::MouseLeave);

    assert_eq!(
        *log.borrow(),
        vec![
            "left:MouseEnter",
            "left:MouseMove",
            "left:MouseLeave",
            "right:MouseEnter",
            "right:MouseMove",
            "right:MouseLeave",
        ]
    );
    assert_eq!(canvas.last_mouse_view(), None);
    Ok(())
}

#[test]
fn test_resize_relayouts_views() -> Result<()> {
    let mut f = fixture()?;
    let log = Log::default();
    f.canvas
        .dispatcher_mut()
        .register(HandlerTarget::View(f.view), recorder(&log, "view", false));

    f.canvas.handle(
        &mut f.graph,
        InputEvent::Resize {
            width: 800,
            height: 400,
        },
    );
    assert_eq!(f.canvas.size(), (800, 400));
    let layout = f.canvas.view(f.view).expect("view exists").layout;
    assert_eq!((layout.width, layout.height), (800.0, 400.0));
    assert_eq!(*log.borrow(), vec!["view:Resize"]);
    Ok(())
}
