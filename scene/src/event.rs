use std::collections::HashMap;

use bitflags::bitflags;

use crate::common::{Ray, ViewId};
use crate::geom_query::Intersection;
use crate::graph::SceneGraph;
use crate::node::NodeId;

bitflags! {
    /// Set of mouse buttons held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct MouseButtons: u8 {
        const LEFT = 1;
        const MIDDLE = 1 << 1;
        const RIGHT = 1 << 2;
    }
}

/// Raw input from the windowing layer, in canvas pixels (origin top-left,
/// Y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    MousePress {
        pos: (f64, f64),
        buttons: MouseButtons,
    },
    MouseRelease {
        pos: (f64, f64),
        buttons: MouseButtons,
    },
    MouseMove {
        pos: (f64, f64),
        buttons: MouseButtons,
    },
    MouseDoublePress {
        pos: (f64, f64),
        buttons: MouseButtons,
    },
    Wheel {
        pos: (f64, f64),
        buttons: MouseButtons,
        /// Scroll amount (horizontal, vertical) in eighths of a degree.
        angle_delta: (f64, f64),
    },
    /// The cursor left the canvas.
    MouseLeave,
    /// The canvas was resized to (width, height) pixels.
    Resize { width: u32, height: u32 },
}

impl InputEvent {
    /// Cursor position for pointer events.
    pub fn pos(&self) -> Option<(f64, f64)> {
        match self {
            Self::MousePress { pos, .. }
            | Self::MouseRelease { pos, .. }
            | Self::MouseMove { pos, .. }
            | Self::MouseDoublePress { pos, .. }
            | Self::Wheel { pos, .. } => Some(*pos),
            Self::MouseLeave | Self::Resize { .. } => None,
        }
    }

    pub fn buttons(&self) -> MouseButtons {
        match self {
            Self::MousePress { buttons, .. }
            | Self::MouseRelease { buttons, .. }
            | Self::MouseMove { buttons, .. }
            | Self::MouseDoublePress { buttons, .. }
            | Self::Wheel { buttons, .. } => *buttons,
            Self::MouseLeave | Self::Resize { .. } => MouseButtons::empty(),
        }
    }
}

/// Pointer state shared by all mouse events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    /// Cursor position in canvas pixels.
    pub canvas_pos: (f64, f64),
    /// Ray from the view under the cursor, in that view's scene frame.
    pub world_ray: Ray,
    pub buttons: MouseButtons,
}

/// enum representing event types.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EventKind {
    MousePress,
    MouseRelease,
    MouseMove,
    MouseDoublePress,
    Wheel,
    MouseEnter,
    MouseLeave,
    Resize,
}

/// Events routed to nodes, views and camera controllers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    MousePress(MouseEvent),
    MouseRelease(MouseEvent),
    MouseMove(MouseEvent),
    MouseDoublePress(MouseEvent),
    Wheel {
        mouse: MouseEvent,
        angle_delta: (f64, f64),
    },
    /// The cursor moved into a view.
    MouseEnter(MouseEvent),
    /// The cursor moved out of a view (or off the canvas).
    MouseLeave,
    Resize {
        width: u32,
        height: u32,
    },
}

impl Event {
    /// Returns the [`EventKind`] discriminant for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MousePress(_) => EventKind::MousePress,
            Self::MouseRelease(_) => EventKind::MouseRelease,
            Self::MouseMove(_) => EventKind::MouseMove,
            Self::MouseDoublePress(_) => EventKind::MouseDoublePress,
            Self::Wheel { .. } => EventKind::Wheel,
            Self::MouseEnter(_) => EventKind::MouseEnter,
            Self::MouseLeave => EventKind::MouseLeave,
            Self::Resize { .. } => EventKind::Resize,
        }
    }

    /// Pointer state, for events that carry one.
    pub fn mouse(&self) -> Option<&MouseEvent> {
        match self {
            Self::MousePress(m)
            | Self::MouseRelease(m)
            | Self::MouseMove(m)
            | Self::MouseDoublePress(m)
            | Self::MouseEnter(m)
            | Self::Wheel { mouse: m, .. } => Some(m),
            Self::MouseLeave | Self::Resize { .. } => None,
        }
    }

    /// Builds the routed event for a pointer input, given the ray cast
    /// through the cursor. Returns `None` for non-pointer input.
    pub(crate) fn from_input(input: &InputEvent, world_ray: Ray) -> Option<Self> {
        let mouse = MouseEvent {
            canvas_pos: input.pos()?,
            world_ray,
            buttons: input.buttons(),
        };
        Some(match input {
            InputEvent::MousePress { .. } => Self::MousePress(mouse),
            InputEvent::MouseRelease { .. } => Self::MouseRelease(mouse),
            InputEvent::MouseMove { .. } => Self::MouseMove(mouse),
            InputEvent::MouseDoublePress { .. } => Self::MouseDoublePress(mouse),
            InputEvent::Wheel { angle_delta, .. } => Self::Wheel {
                mouse,
                angle_delta: *angle_delta,
            },
            InputEvent::MouseLeave | InputEvent::Resize { .. } => return None,
        })
    }
}

/// State handed to event handlers.
pub struct EventContext<'a> {
    /// The scene graph, for handlers that react by editing nodes.
    pub graph: &'a mut SceneGraph,
    /// The view the event was routed through.
    pub view: ViewId,
    /// The node currently offered the event (`None` for view handlers).
    pub node: Option<NodeId>,
    /// Every intersection under the cursor, nearest first.
    pub hits: &'a [Intersection],
}

/// Something that reacts to routed events.
///
/// Returning `true` marks the event handled and stops propagation.
/// Closures with the matching signature implement this trait.
pub trait EventHandler {
    fn handle(&mut self, event: &Event, ctx: &mut EventContext<'_>) -> bool;
}

impl<F> EventHandler for F
where
    F: FnMut(&Event, &mut EventContext<'_>) -> bool,
{
    fn handle(&mut self, event: &Event, ctx: &mut EventContext<'_>) -> bool {
        self(event, ctx)
    }
}

/// Unique identifier for a registered handler.
pub type HandlerId = u32;

/// Who a handler listens on behalf of.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum HandlerTarget {
    Node(NodeId),
    View(ViewId),
}

type HandlerList = Vec<(HandlerId, Box<dyn EventHandler>)>;

/// Registry of event handlers attached to nodes and views.
///
/// Multiple handlers can be registered for the same target; they are called
/// in registration order until one returns `true`.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<HandlerTarget, HandlerList>,
    next_id: HandlerId,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback and returns an id that can be used to unregister it.
    pub fn register<F>(&mut self, target: HandlerTarget, callback: F) -> HandlerId
    where
        F: FnMut(&Event, &mut EventContext<'_>) -> bool + 'static,
    {
        self.register_handler(target, callback)
    }

    /// Registers a handler object.
    pub fn register_handler<H>(&mut self, target: HandlerTarget, handler: H) -> HandlerId
    where
        H: EventHandler + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.handlers
            .entry(target)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Unregisters a handler by its ID.
    ///
    /// Returns `true` if the handler was found and removed, `false` otherwise.
    pub fn unregister(&mut self, id: HandlerId) -> bool {
        for handlers in self.handlers.values_mut() {
            if let Some(pos) = handlers.iter().position(|(hid, _)| *hid == id) {
                let _ = handlers.remove(pos);
                return true;
            }
        }
        false
    }

    /// Drops every handler attached to `target`.
    pub fn clear(&mut self, target: HandlerTarget) {
        self.handlers.remove(&target);
    }

    pub fn has_handlers(&self, target: HandlerTarget) -> bool {
        self.handlers
            .get(&target)
            .is_some_and(|handlers| !handlers.is_empty())
    }

    /// Offers `event` to the handlers of `target`, stopping at the first one
    /// that reports it handled.
    pub fn dispatch(&mut self, target: HandlerTarget, event: &Event, ctx: &mut EventContext<'_>) -> bool {
        let Some(handlers) = self.handlers.get_mut(&target) else {
            return false;
        };
        for (id, handler) in handlers.iter_mut() {
            if handler.handle(event, ctx) {
                log::debug!("{:?} handled by {target:?} (handler {id})", event.kind());
                return true;
            }
        }
        false
    }
}
