//! Camera controllers: interaction policies that turn routed mouse events
//! into camera motion.

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3};

use crate::camera;
use crate::common::{Ray, Transform};
use crate::event::{Event, MouseButtons};

/// Scroll-to-zoom sensitivity (per eighth of a degree of wheel rotation).
const WHEEL_ZOOM_RATE: f64 = 0.001;

/// The camera state a controller may change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Camera-to-scene transform.
    pub transform: Transform,
    pub projection: Transform,
}

/// The controllers a camera can carry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Controller {
    PanZoom(PanZoom),
    Orbit(Orbit),
}

impl Controller {
    /// Reacts to `event`, editing `pose` in place. Returns `true` when the
    /// event was consumed.
    pub fn handle_event(&mut self, event: &Event, pose: &mut CameraPose) -> bool {
        match self {
            Controller::PanZoom(c) => c.handle_event(event, pose),
            Controller::Orbit(c) => c.handle_event(event, pose),
        }
    }
}

impl From<PanZoom> for Controller {
    fn from(c: PanZoom) -> Self {
        Controller::PanZoom(c)
    }
}

impl From<Orbit> for Controller {
    fn from(c: Orbit) -> Self {
        Controller::Orbit(c)
    }
}

/// 2-D navigation: left-drag pans, the wheel zooms about the cursor.
///
/// Panning moves the camera transform so the world point grabbed on press
/// stays under the cursor; zooming scales the projection and shifts the
/// camera so the point under the cursor stays put.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PanZoom {
    /// Prevent horizontal panning and zooming.
    pub lock_x: bool,
    /// Prevent vertical panning and zooming.
    pub lock_y: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    drag_pos: Option<(f64, f64)>,
}

impl PanZoom {
    pub fn new(lock_x: bool, lock_y: bool) -> Self {
        Self {
            lock_x,
            lock_y,
            drag_pos: None,
        }
    }

    pub fn handle_event(&mut self, event: &Event, pose: &mut CameraPose) -> bool {
        match event {
            Event::MousePress(mouse) if mouse.buttons.contains(MouseButtons::LEFT) => {
                let origin = mouse.world_ray.origin;
                self.drag_pos = Some((origin.x, origin.y));
                false
            }
            Event::MouseMove(mouse) if mouse.buttons.contains(MouseButtons::LEFT) => {
                let Some((drag_x, drag_y)) = self.drag_pos else {
                    return false;
                };
                let origin = mouse.world_ray.origin;
                let dx = if self.lock_x { 0.0 } else { drag_x - origin.x };
                let dy = if self.lock_y { 0.0 } else { drag_y - origin.y };
                pose.transform = pose.transform.translated(Vector3::new(dx, dy, 0.0));
                true
            }
            Event::MouseRelease(mouse) if !mouse.buttons.contains(MouseButtons::LEFT) => {
                self.drag_pos = None;
                false
            }
            Event::Wheel { mouse, angle_delta } => {
                let (_, dy) = *angle_delta;
                if dy == 0.0 {
                    return false;
                }
                let zoom = 2f64.powf(dy * WHEEL_ZOOM_RATE);
                let zx = if self.lock_x { 1.0 } else { zoom };
                let zy = if self.lock_y { 1.0 } else { zoom };
                pose.projection = pose.projection.scaled(Vector3::new(zx, zy, 1.0));

                // Keep the world point under the cursor fixed
                let cursor = mouse.world_ray.origin;
                let camera = pose.transform.origin();
                let before = Vector3::new(cursor.x - camera.x, cursor.y - camera.y, 0.0);
                let pan = (before * zoom - before) / zoom;
                pose.transform = pose.transform.translated(Vector3::new(
                    if self.lock_x { 0.0 } else { pan.x },
                    if self.lock_y { 0.0 } else { pan.y },
                    0.0,
                ));
                true
            }
            _ => false,
        }
    }
}

/// Orbits the camera around `center`.
///
/// - Left-drag changes azimuth (about `polar_axis`) and elevation (about
///   the camera's right vector, clamped to `[0°, 180°]` from the polar
///   axis).
/// - Right-drag pans the camera and the center together.
/// - The wheel moves the camera toward or away from the center.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Orbit {
    pub center: Point3<f64>,
    pub polar_axis: Vector3<f64>,
    #[cfg_attr(feature = "serde", serde(skip))]
    last_canvas_pos: Option<(f64, f64)>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pan_ray: Option<Ray>,
}

impl Default for Orbit {
    fn default() -> Self {
        Self::new(Point3::origin())
    }
}

impl Orbit {
    pub fn new(center: Point3<f64>) -> Self {
        Self {
            center,
            polar_axis: Vector3::unit_z(),
            last_canvas_pos: None,
            pan_ray: None,
        }
    }

    pub fn with_polar_axis(mut self, polar_axis: Vector3<f64>) -> Self {
        self.polar_axis = polar_axis;
        self
    }

    pub fn handle_event(&mut self, event: &Event, pose: &mut CameraPose) -> bool {
        let handled = match event {
            Event::MouseMove(mouse) if mouse.buttons == MouseButtons::LEFT => {
                match self.last_canvas_pos {
                    Some(last) => {
                        self.orbit(pose, last, mouse.canvas_pos);
                        true
                    }
                    None => false,
                }
            }
            Event::MousePress(mouse) if mouse.buttons == MouseButtons::RIGHT => {
                self.pan_ray = Some(mouse.world_ray);
                false
            }
            Event::MouseMove(mouse) if mouse.buttons == MouseButtons::RIGHT => {
                match self.pan_ray {
                    Some(pan_ray) => {
                        self.pan(pose, &pan_ray, &mouse.world_ray);
                        true
                    }
                    None => false,
                }
            }
            Event::Wheel { angle_delta, .. } => {
                let (_, dy) = *angle_delta;
                if dy != 0.0 {
                    let offset = pose.transform.origin() - self.center;
                    let zoom = 2f64.powf(-dy * WHEEL_ZOOM_RATE);
                    pose.transform = pose.transform.translated(offset * (zoom - 1.0));
                }
                true
            }
            _ => false,
        };

        if let Some(mouse) = event.mouse() {
            self.last_canvas_pos = Some(mouse.canvas_pos);
        }
        handled
    }

    /// One degree of rotation per pixel of cursor travel.
    fn orbit(&self, pose: &mut CameraPose, last: (f64, f64), current: (f64, f64)) {
        let d_azimuth = last.0 - current.0;
        let mut d_elevation = last.1 - current.1;

        let offset = pose.transform.origin() - self.center;
        if offset.magnitude2() > 0.0 && self.polar_axis.magnitude2() > 0.0 {
            let elevation = offset.angle(self.polar_axis).0.to_degrees();
            d_elevation = d_elevation.clamp(-elevation, 180.0 - elevation);
        }

        let right = camera::forward(&pose.transform).cross(camera::up(&pose.transform));
        let center = self.center.to_vec();
        pose.transform = pose
            .transform
            .translated(-center)
            .rotated(d_elevation, right)
            .rotated(d_azimuth, self.polar_axis)
            .translated(center);
    }

    /// Moves camera and center so the point `distance` along the press ray
    /// lands under the cursor again.
    fn pan(&mut self, pose: &mut CameraPose, pan_ray: &Ray, current: &Ray) {
        let distance = (pose.transform.origin() - self.center).magnitude();
        let grabbed = pan_ray.point_at_distance(distance);
        let now = current.point_at_distance(distance);
        let diff = grabbed - now;
        pose.transform = pose.transform.translated(diff);
        self.center += diff;
    }
}
