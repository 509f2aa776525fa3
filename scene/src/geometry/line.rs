use cgmath::{InnerSpace, Point3};

use crate::color::{Color, ColorModel};
use crate::common::Aabb;
use crate::error::{SceneError, SceneResult, check_non_negative};
use crate::geom_query::HitContext;

/// A connected polyline through `vertices`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    vertices: Vec<Point3<f64>>,
    color: ColorModel,
    width: f64,
    antialias: f64,
}

impl Default for Line {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Line {
    pub fn new(vertices: Vec<Point3<f64>>) -> Self {
        Self {
            vertices,
            color: ColorModel::Uniform(Color::WHITE),
            width: 1.0,
            antialias: 1.0,
        }
    }

    pub fn with_color(mut self, color: ColorModel) -> Self {
        self.color = color;
        self
    }

    /// Stroke width in canvas pixels. Picking treats it as an exclusive
    /// distance bound.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_antialias(mut self, antialias: f64) -> Self {
        self.antialias = antialias;
        self
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn color(&self) -> &ColorModel {
        &self.color
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn antialias(&self) -> f64 {
        self.antialias
    }

    pub(crate) fn validate(&self) -> SceneResult<()> {
        check_color_model(&self.color)?;
        check_non_negative("width", self.width)?;
        check_non_negative("antialias", self.antialias)?;
        Ok(())
    }

    pub(crate) fn set_vertices(&mut self, vertices: Vec<Point3<f64>>) {
        self.vertices = vertices;
    }

    pub(crate) fn set_color(&mut self, color: ColorModel) -> SceneResult<()> {
        check_color_model(&color)?;
        self.color = color;
        Ok(())
    }

    pub(crate) fn set_width(&mut self, width: f64) -> SceneResult<()> {
        self.width = check_non_negative("width", width)?;
        Ok(())
    }

    pub(crate) fn set_antialias(&mut self, antialias: f64) -> SceneResult<()> {
        self.antialias = check_non_negative("antialias", antialias)?;
        Ok(())
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }

    /// Segment proximity test in canvas space.
    ///
    /// A segment qualifies when the projected ray origin lies strictly closer
    /// than `width` pixels to the line through the projected endpoints, its
    /// foot falls within the segment, and the matching world point is not
    /// behind the ray. Returns the smallest world-space ray parameter.
    ///
    /// The bound is exclusive: a ray exactly `width` pixels from the line
    /// misses, so a 1 pixel line hits 1 pixel off center but not 2.
    pub(crate) fn passes_through(&self, ctx: &HitContext<'_>) -> Option<f64> {
        if self.vertices.len() < 2 || ctx.ray.is_degenerate() {
            return None;
        }
        let Some(projector) = ctx.projector() else {
            log::debug!("Line picking needs a ray cast from a view; skipping");
            return None;
        };

        let ray = ctx.ray;
        let (x0, y0) = projector.to_canvas(ray.origin);
        let dir_len2 = ray.direction.dot(ray.direction);
        let world = ctx.to_world.map_all(&self.vertices);

        world
            .windows(2)
            .filter_map(|segment| {
                let (a, b) = (segment[0], segment[1]);
                let (x1, y1) = projector.to_canvas(a);
                let (x2, y2) = projector.to_canvas(b);
                let (dx, dy) = (x2 - x1, y2 - y1);

                let len2 = dx * dx + dy * dy;
                if len2 == 0.0 {
                    return None;
                }
                let distance = (dy * x0 - dx * y0 + x2 * y1 - y2 * x1).abs() / len2.sqrt();
                if distance >= self.width {
                    return None;
                }

                let along = ((x0 - x1) * dx + (y0 - y1) * dy) / len2;
                if !(0.0..=1.0).contains(&along) {
                    return None;
                }

                let on_segment = a + (b - a) * along;
                let t = (on_segment - ray.origin).dot(ray.direction) / dir_len2;
                (t >= 0.0).then_some(t)
            })
            .min_by(f64::total_cmp)
    }
}

fn check_color_model(color: &ColorModel) -> SceneResult<()> {
    match color {
        ColorModel::FaceColors(_) => Err(SceneError::Validation {
            field: "color",
            reason: "lines support uniform or vertex colors only".to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{EPSILON, Projector, Ray, RaySource, Transform};
    use cgmath::Vector3;

    /// Identity camera over a 200x200 view: world [-1, 1] spans the view.
    fn ray_at(x: f64, y: f64) -> Ray {
        let projector = Projector {
            world_to_ndc: Transform::identity(),
            width: 200.0,
            height: 200.0,
        };
        Ray::new(Point3::new(x, y, 1.0), Vector3::new(0.0, 0.0, -1.0))
            .with_source(RaySource { view: 0, projector })
    }

    fn horizontal_line() -> Line {
        Line::new(vec![Point3::new(-0.5, 0.0, 0.0), Point3::new(0.5, 0.0, 0.0)]).with_width(3.0)
    }

    #[test]
    fn test_ray_over_segment_hits() {
        let identity = Transform::identity();
        let ray = ray_at(0.0, 0.0);
        let t = horizontal_line().passes_through(&HitContext::new(&ray, &identity));
        assert!((t.unwrap() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_ray_within_width_hits() {
        let identity = Transform::identity();
        // 0.02 world == 2 pixels
        let ray = ray_at(0.1, 0.02);
        assert!(horizontal_line().passes_through(&HitContext::new(&ray, &identity)).is_some());
    }

    #[test]
    fn test_ray_at_exact_width_misses() {
        let identity = Transform::identity();
        // 0.0625 world == 6.25 pixels
        let ray = ray_at(0.0, 0.0625);
        let ctx = HitContext::new(&ray, &identity);
        let line = |width| horizontal_line().with_width(width);
        assert!(line(6.25).passes_through(&ctx).is_none());
        assert!(line(6.5).passes_through(&ctx).is_some());
    }

    #[test]
    fn test_ray_beyond_width_misses() {
        let identity = Transform::identity();
        // 0.05 world == 5 pixels
        let ray = ray_at(0.1, 0.05);
        assert!(horizontal_line().passes_through(&HitContext::new(&ray, &identity)).is_none());
    }

    #[test]
    fn test_ray_past_segment_end_misses() {
        let identity = Transform::identity();
        let ray = ray_at(0.75, 0.0);
        assert!(horizontal_line().passes_through(&HitContext::new(&ray, &identity)).is_none());
    }

    #[test]
    fn test_segment_behind_ray_misses() {
        let identity = Transform::identity();
        let line = Line::new(vec![Point3::new(-0.5, 0.0, 2.0), Point3::new(0.5, 0.0, 2.0)]);
        let ray = ray_at(0.0, 0.0);
        assert!(line.passes_through(&HitContext::new(&ray, &identity)).is_none());
    }

    #[test]
    fn test_line_picks_nearest_segment() {
        let identity = Transform::identity();
        let line = Line::new(vec![
            Point3::new(-0.5, 0.0, -1.0),
            Point3::new(0.5, 0.0, -1.0),
            Point3::new(0.5, 0.0, 0.5),
            Point3::new(-0.5, 0.0, 0.5),
        ]);
        let ray = ray_at(0.0, 0.0);
        let t = line.passes_through(&HitContext::new(&ray, &identity));
        assert!((t.unwrap() - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_face_colors_rejected() {
        let mut line = horizontal_line();
        let result = line.set_color(ColorModel::FaceColors(vec![Color::RED]));
        assert!(matches!(result, Err(SceneError::Validation { field: "color", .. })));
        assert_eq!(line.color(), &ColorModel::Uniform(Color::WHITE));
    }

    #[test]
    fn test_bounding_box_spans_vertices() {
        let bounds = horizontal_line().bounding_box().unwrap();
        assert_eq!(bounds.min, Point3::new(-0.5, 0.0, 0.0));
        assert_eq!(bounds.max, Point3::new(0.5, 0.0, 0.0));
    }
}
