use cgmath::{InnerSpace, Point3};

use crate::color::Color;
use crate::common::{Aabb, Ray};
use crate::error::{SceneResult, check_non_negative};
use crate::geom_query::HitContext;

/// Marker shape drawn at each point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Symbol {
    #[default]
    Disc,
    Arrow,
    Ring,
    Clobber,
    Square,
    X,
    Diamond,
    VBar,
    HBar,
    Cross,
    TailedArrow,
    TriangleUp,
    TriangleDown,
    Star,
    CrossLines,
}

/// The space in which `size` and `edge_width` are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scaling {
    /// Canvas pixels; markers keep their size when zooming.
    #[default]
    Fixed,
    /// World (scene) units.
    Scene,
    /// The node's own local units, so markers follow the node transform.
    Visual,
}

/// A cloud of markers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Points {
    coords: Vec<Point3<f64>>,
    size: f64,
    face_color: Option<Color>,
    edge_color: Option<Color>,
    edge_width: f64,
    symbol: Symbol,
    scaling: Scaling,
    antialias: f64,
}

impl Default for Points {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Points {
    pub fn new(coords: Vec<Point3<f64>>) -> Self {
        Self {
            coords,
            size: 10.0,
            face_color: Some(Color::WHITE),
            edge_color: Some(Color::BLACK),
            edge_width: 1.0,
            symbol: Symbol::Disc,
            scaling: Scaling::Fixed,
            antialias: 1.0,
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_face_color(mut self, color: Option<Color>) -> Self {
        self.face_color = color;
        self
    }

    pub fn with_edge_color(mut self, color: Option<Color>) -> Self {
        self.edge_color = color;
        self
    }

    pub fn with_edge_width(mut self, edge_width: f64) -> Self {
        self.edge_width = edge_width;
        self
    }

    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = symbol;
        self
    }

    pub fn with_scaling(mut self, scaling: Scaling) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn with_antialias(mut self, antialias: f64) -> Self {
        self.antialias = antialias;
        self
    }

    pub fn coords(&self) -> &[Point3<f64>] {
        &self.coords
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn face_color(&self) -> Option<Color> {
        self.face_color
    }

    pub fn edge_color(&self) -> Option<Color> {
        self.edge_color
    }

    pub fn edge_width(&self) -> f64 {
        self.edge_width
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn scaling(&self) -> Scaling {
        self.scaling
    }

    pub fn antialias(&self) -> f64 {
        self.antialias
    }

    pub(crate) fn validate(&self) -> SceneResult<()> {
        check_non_negative("size", self.size)?;
        check_non_negative("edge_width", self.edge_width)?;
        check_non_negative("antialias", self.antialias)?;
        Ok(())
    }

    pub(crate) fn set_coords(&mut self, coords: Vec<Point3<f64>>) {
        self.coords = coords;
    }

    pub(crate) fn set_size(&mut self, size: f64) -> SceneResult<()> {
        self.size = check_non_negative("size", size)?;
        Ok(())
    }

    pub(crate) fn set_face_color(&mut self, color: Option<Color>) {
        self.face_color = color;
    }

    pub(crate) fn set_edge_color(&mut self, color: Option<Color>) {
        self.edge_color = color;
    }

    pub(crate) fn set_edge_width(&mut self, edge_width: f64) -> SceneResult<()> {
        self.edge_width = check_non_negative("edge_width", edge_width)?;
        Ok(())
    }

    pub(crate) fn set_symbol(&mut self, symbol: Symbol) {
        self.symbol = symbol;
    }

    pub(crate) fn set_scaling(&mut self, scaling: Scaling) {
        self.scaling = scaling;
    }

    pub(crate) fn set_antialias(&mut self, antialias: f64) -> SceneResult<()> {
        self.antialias = check_non_negative("antialias", antialias)?;
        Ok(())
    }

    /// Extent of the marker centers; marker size is not included.
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(&self.coords)
    }

    /// Marker radius: half the size plus the edge, in the units of `scaling`.
    pub fn effective_radius(&self) -> f64 {
        self.size / 2.0 + self.edge_width
    }

    pub(crate) fn passes_through(&self, ctx: &HitContext<'_>) -> Option<f64> {
        if self.coords.is_empty() || ctx.ray.is_degenerate() {
            return None;
        }
        match self.scaling {
            Scaling::Scene => {
                let world = ctx.to_world.map_all(&self.coords);
                nearest_sphere_hit(ctx.ray, &world, self.effective_radius())
            }
            Scaling::Visual => {
                let local_ray = ctx.local_ray()?;
                nearest_sphere_hit(&local_ray, &self.coords, self.effective_radius())
            }
            Scaling::Fixed => self.screen_space_hit(ctx),
        }
    }

    /// Compares pixel distances between each projected point and the projected
    /// ray origin, then reports the nearest qualifying point's distance along
    /// the ray.
    fn screen_space_hit(&self, ctx: &HitContext<'_>) -> Option<f64> {
        let Some(projector) = ctx.projector() else {
            log::debug!("Fixed-size points need a ray cast from a view; skipping");
            return None;
        };
        let ray = ctx.ray;
        let (cx, cy) = projector.to_canvas(ray.origin);
        let radius = self.effective_radius();
        let dir_len2 = ray.direction.dot(ray.direction);

        ctx.to_world
            .map_all(&self.coords)
            .into_iter()
            .filter(|p| {
                let (px, py) = projector.to_canvas(*p);
                (px - cx).hypot(py - cy) <= radius
            })
            .map(|p| (p - ray.origin).dot(ray.direction) / dir_len2)
            .filter(|t| *t >= 0.0)
            .min_by(f64::total_cmp)
    }
}

fn nearest_sphere_hit(ray: &Ray, centers: &[Point3<f64>], radius: f64) -> Option<f64> {
    centers
        .iter()
        .filter_map(|c| ray.intersect_sphere(*c, radius))
        .min_by(f64::total_cmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{EPSILON, Projector, RaySource, Transform};
    use cgmath::Vector3;

    fn down_from(x: f64, y: f64, z: f64) -> Ray {
        Ray::new(Point3::new(x, y, z), Vector3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn test_scene_scaled_point_hit_at_sphere_surface() {
        let points = Points::new(vec![Point3::new(1.0, 1.0, 0.0)])
            .with_size(1.0)
            .with_edge_width(0.0)
            .with_scaling(Scaling::Scene);
        let ray = down_from(1.0, 1.0, 1.0);
        let identity = Transform::identity();
        let t = points.passes_through(&HitContext::new(&ray, &identity));
        assert!((t.unwrap() - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_scene_scaled_edge_width_grows_radius() {
        let points = Points::new(vec![Point3::new(0.0, 0.0, 0.0)])
            .with_size(1.0)
            .with_edge_width(0.5)
            .with_scaling(Scaling::Scene);
        // 0.9 off-center: outside size/2 but inside size/2 + edge_width
        let ray = down_from(0.9, 0.0, 5.0);
        let identity = Transform::identity();
        assert!(points.passes_through(&HitContext::new(&ray, &identity)).is_some());
    }

    #[test]
    fn test_scene_scaled_reports_nearest_point() {
        let points = Points::new(vec![Point3::new(0.0, 0.0, -3.0), Point3::new(0.0, 0.0, 0.0)])
            .with_size(2.0)
            .with_edge_width(0.0)
            .with_scaling(Scaling::Scene);
        let ray = down_from(0.0, 0.0, 2.0);
        let identity = Transform::identity();
        let t = points.passes_through(&HitContext::new(&ray, &identity));
        assert!((t.unwrap() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_visual_scaling_follows_node_transform() {
        // Radius 0.5 in local units, doubled by the node scale
        let points = Points::new(vec![Point3::new(0.0, 0.0, 0.0)])
            .with_size(1.0)
            .with_edge_width(0.0)
            .with_scaling(Scaling::Visual);
        let to_world = Transform::identity().scaled(Vector3::new(2.0, 2.0, 2.0));
        let ray = down_from(0.9, 0.0, 5.0);
        let t = points.passes_through(&HitContext::new(&ray, &to_world));
        assert!(t.is_some());
    }

    #[test]
    fn test_fixed_scaling_uses_pixel_distance() {
        // Identity camera over a 100x100 view: 1 world unit == 50 pixels
        let projector = Projector {
            world_to_ndc: Transform::identity(),
            width: 100.0,
            height: 100.0,
        };
        let points = Points::new(vec![Point3::new(0.1, 0.0, -0.5)])
            .with_size(10.0)
            .with_edge_width(1.0);
        let identity = Transform::identity();

        // 0.1 world == 5 pixels away, radius is 6 pixels
        let ray = down_from(0.0, 0.0, 0.0).with_source(RaySource { view: 0, projector });
        let t = points.passes_through(&HitContext::new(&ray, &identity));
        assert!((t.unwrap() - 0.5).abs() < EPSILON);

        // 0.2 world == 10 pixels away
        let far = Points::new(vec![Point3::new(0.2, 0.0, -0.5)])
            .with_size(10.0)
            .with_edge_width(1.0);
        assert!(far.passes_through(&HitContext::new(&ray, &identity)).is_none());
    }

    #[test]
    fn test_fixed_scaling_without_source_misses() {
        let points = Points::new(vec![Point3::new(0.0, 0.0, -1.0)]);
        let ray = down_from(0.0, 0.0, 0.0);
        let identity = Transform::identity();
        assert!(points.passes_through(&HitContext::new(&ray, &identity)).is_none());
    }

    #[test]
    fn test_empty_coords_miss() {
        let points = Points::new(Vec::new()).with_scaling(Scaling::Scene);
        let ray = down_from(0.0, 0.0, 1.0);
        let identity = Transform::identity();
        assert!(points.passes_through(&HitContext::new(&ray, &identity)).is_none());
        assert!(points.bounding_box().is_none());
    }

    #[test]
    fn test_negative_size_rejected_and_previous_kept() {
        let mut points = Points::new(vec![Point3::new(0.0, 0.0, 0.0)]);
        assert!(points.set_size(-1.0).is_err());
        assert_eq!(points.size(), 10.0);
    }
}
