use cgmath::{Point3, Vector3};

use crate::common::{Aabb, Parallelogram};
use crate::error::{SceneError, SceneResult};
use crate::geom_query::HitContext;

/// A dense, row-major array of scalar samples.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrayData {
    shape: Vec<usize>,
    values: Vec<f32>,
}

impl ArrayData {
    /// Fails when `values` does not hold exactly `product(shape)` samples.
    pub fn new(shape: Vec<usize>, values: Vec<f32>) -> SceneResult<Self> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(SceneError::Validation {
                field: "data",
                reason: format!(
                    "shape {shape:?} needs {expected} values, got {}",
                    values.len()
                ),
            });
        }
        Ok(Self { shape, values })
    }

    /// An all-zero array of the given shape.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self {
            shape,
            values: vec![0.0; len],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    fn is_empty(&self) -> bool {
        self.shape.iter().any(|d| *d == 0)
    }
}

/// Sampling used when an image is magnified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interpolation {
    #[default]
    Nearest,
    Linear,
    Bicubic,
}

/// How a volume is composited along each view ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderMode {
    /// Maximum intensity projection.
    #[default]
    Mip,
    /// Iso-surface.
    Iso,
}

/// Colormapping fields shared by images and volumes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Colormapping {
    cmap: String,
    clims: Option<(f64, f64)>,
    gamma: f64,
    interpolation: Interpolation,
}

impl Default for Colormapping {
    fn default() -> Self {
        Self {
            cmap: "gray".to_string(),
            clims: None,
            gamma: 1.0,
            interpolation: Interpolation::Nearest,
        }
    }
}

fn check_gamma(gamma: f64) -> SceneResult<f64> {
    if gamma > 0.0 && gamma <= 2.0 {
        Ok(gamma)
    } else {
        Err(SceneError::Validation {
            field: "gamma",
            reason: format!("{gamma} is outside (0, 2]"),
        })
    }
}

fn check_clims(clims: Option<(f64, f64)>) -> SceneResult<Option<(f64, f64)>> {
    match clims {
        Some((lo, hi)) if lo.is_nan() || hi.is_nan() => Err(SceneError::Validation {
            field: "clims",
            reason: "contrast limits must be numbers".to_string(),
        }),
        _ => Ok(clims),
    }
}

fn check_dims(data: &ArrayData, allowed: &[usize], kind: &str) -> SceneResult<()> {
    if allowed.contains(&data.shape().len()) {
        Ok(())
    } else {
        Err(SceneError::Validation {
            field: "data",
            reason: format!("{kind} data must have {allowed:?} dimensions, got {:?}", data.shape()),
        })
    }
}

macro_rules! colormapped_accessors {
    ($ty:ident) => {
        impl $ty {
            pub fn with_cmap(mut self, cmap: impl Into<String>) -> Self {
                self.style.cmap = cmap.into();
                self
            }

            pub fn with_clims(mut self, clims: Option<(f64, f64)>) -> Self {
                self.style.clims = clims;
                self
            }

            pub fn with_gamma(mut self, gamma: f64) -> Self {
                self.style.gamma = gamma;
                self
            }

            pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
                self.style.interpolation = interpolation;
                self
            }

            pub fn data(&self) -> &ArrayData {
                &self.data
            }

            pub fn cmap(&self) -> &str {
                &self.style.cmap
            }

            pub fn clims(&self) -> Option<(f64, f64)> {
                self.style.clims
            }

            pub fn gamma(&self) -> f64 {
                self.style.gamma
            }

            pub fn interpolation(&self) -> Interpolation {
                self.style.interpolation
            }

            pub(crate) fn set_cmap(&mut self, cmap: String) {
                self.style.cmap = cmap;
            }

            pub(crate) fn set_clims(&mut self, clims: Option<(f64, f64)>) -> SceneResult<()> {
                self.style.clims = check_clims(clims)?;
                Ok(())
            }

            pub(crate) fn set_gamma(&mut self, gamma: f64) -> SceneResult<()> {
                self.style.gamma = check_gamma(gamma)?;
                Ok(())
            }

            pub(crate) fn set_interpolation(&mut self, interpolation: Interpolation) {
                self.style.interpolation = interpolation;
            }
        }
    };
}

/// A 2-D scalar (or RGB/RGBA) image drawn on the z = 0 plane, one unit
/// per sample, with samples centered on integer coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Image {
    data: ArrayData,
    style: Colormapping,
}

colormapped_accessors!(Image);

impl Image {
    pub fn new(data: ArrayData) -> Self {
        Self {
            data,
            style: Colormapping::default(),
        }
    }

    pub(crate) fn validate(&self) -> SceneResult<()> {
        check_dims(&self.data, &[2, 3], "image")?;
        check_gamma(self.style.gamma)?;
        check_clims(self.style.clims)?;
        Ok(())
    }

    pub(crate) fn set_data(&mut self, data: ArrayData) -> SceneResult<()> {
        check_dims(&data, &[2, 3], "image")?;
        self.data = data;
        Ok(())
    }

    /// Extent of the first two axes (x from `shape[0]`, y from `shape[1]`)
    /// with sample centers on integers.
    pub fn bounding_box(&self) -> Option<Aabb> {
        let &[s0, s1, ..] = self.data.shape() else {
            return None;
        };
        if s0 == 0 || s1 == 0 {
            return None;
        }
        Some(Aabb::new(
            Point3::new(-0.5, -0.5, 0.0),
            Point3::new(s0 as f64 - 0.5, s1 as f64 - 0.5, 0.0),
        ))
    }

    pub(crate) fn passes_through(&self, ctx: &HitContext<'_>) -> Option<f64> {
        let bounds = self.bounding_box()?;
        let shape = self.data.shape();
        let local_ray = ctx.local_ray()?;
        Parallelogram::new(
            bounds.min,
            Vector3::new(shape[0] as f64, 0.0, 0.0),
            Vector3::new(0.0, shape[1] as f64, 0.0),
        )
        .intersect_ray(&local_ray)
    }
}

/// A 3-D scalar volume with data in (z, y, x) order.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Volume {
    data: ArrayData,
    style: Colormapping,
    render_mode: RenderMode,
}

colormapped_accessors!(Volume);

impl Volume {
    pub fn new(data: ArrayData) -> Self {
        Self {
            data,
            style: Colormapping::default(),
            render_mode: RenderMode::Mip,
        }
    }

    pub fn with_render_mode(mut self, render_mode: RenderMode) -> Self {
        self.render_mode = render_mode;
        self
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub(crate) fn set_render_mode(&mut self, render_mode: RenderMode) {
        self.render_mode = render_mode;
    }

    pub(crate) fn validate(&self) -> SceneResult<()> {
        check_dims(&self.data, &[3], "volume")?;
        check_gamma(self.style.gamma)?;
        check_clims(self.style.clims)?;
        Ok(())
    }

    pub(crate) fn set_data(&mut self, data: ArrayData) -> SceneResult<()> {
        check_dims(&data, &[3], "volume")?;
        self.data = data;
        Ok(())
    }

    /// Edge lengths along x, y and z.
    fn extent(&self) -> Option<Vector3<f64>> {
        let &[s0, s1, s2] = self.data.shape() else {
            return None;
        };
        if self.data.is_empty() {
            return None;
        }
        Some(Vector3::new(s1 as f64, s2 as f64, s0 as f64))
    }

    /// The box in x/y/z order: x spans `shape[1]`, y `shape[2]`, z `shape[0]`.
    pub fn bounding_box(&self) -> Option<Aabb> {
        let extent = self.extent()?;
        let min = Point3::new(-0.5, -0.5, -0.5);
        Some(Aabb::new(min, min + extent))
    }

    /// Nearest crossing of the six box faces.
    pub(crate) fn passes_through(&self, ctx: &HitContext<'_>) -> Option<f64> {
        let extent = self.extent()?;
        let bounds = self.bounding_box()?;
        let local_ray = ctx.local_ray()?;

        let u = Vector3::new(extent.x, 0.0, 0.0);
        let v = Vector3::new(0.0, extent.y, 0.0);
        let w = Vector3::new(0.0, 0.0, extent.z);
        let faces = [
            Parallelogram::new(bounds.min, u, v),
            Parallelogram::new(bounds.min, v, w),
            Parallelogram::new(bounds.min, w, u),
            Parallelogram::new(bounds.max, -u, -v),
            Parallelogram::new(bounds.max, -v, -w),
            Parallelogram::new(bounds.max, -w, -u),
        ];
        faces
            .iter()
            .filter_map(|face| face.intersect_ray(&local_ray))
            .min_by(f64::total_cmp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{EPSILON, Ray, Transform};

    fn hit_image(image: &Image, origin: Point3<f64>) -> Option<f64> {
        let ray = Ray::new(origin, Vector3::new(0.0, 0.0, -1.0));
        let identity = Transform::identity();
        image.passes_through(&HitContext::new(&ray, &identity))
    }

    #[test]
    fn test_array_data_length_checked() {
        assert!(ArrayData::new(vec![2, 3], vec![0.0; 6]).is_ok());
        assert!(ArrayData::new(vec![2, 3], vec![0.0; 5]).is_err());
    }

    #[test]
    fn test_image_bounding_box_centers_samples() {
        let image = Image::new(ArrayData::zeros(vec![4, 2]));
        let bounds = image.bounding_box().unwrap();
        assert_eq!(bounds.min, Point3::new(-0.5, -0.5, 0.0));
        assert_eq!(bounds.max, Point3::new(3.5, 1.5, 0.0));
    }

    #[test]
    fn test_image_hit_and_miss() {
        let image = Image::new(ArrayData::zeros(vec![4, 2]));
        let t = hit_image(&image, Point3::new(3.0, 1.0, 2.0));
        assert!((t.unwrap() - 2.0).abs() < EPSILON);
        assert!(hit_image(&image, Point3::new(3.0, 2.0, 2.0)).is_none());
    }

    #[test]
    fn test_image_behind_ray_misses() {
        let image = Image::new(ArrayData::zeros(vec![4, 2]));
        assert!(hit_image(&image, Point3::new(1.0, 1.0, -2.0)).is_none());
    }

    #[test]
    fn test_gamma_must_be_in_half_open_interval() {
        let mut image = Image::new(ArrayData::zeros(vec![2, 2]));
        assert!(image.set_gamma(0.0).is_err());
        assert!(image.set_gamma(2.5).is_err());
        assert!(image.set_gamma(2.0).is_ok());
        assert_eq!(image.gamma(), 2.0);
    }

    #[test]
    fn test_image_rejects_volume_data() {
        let mut image = Image::new(ArrayData::zeros(vec![2, 2]));
        assert!(image.set_data(ArrayData::zeros(vec![2, 2, 2, 2])).is_err());
        assert_eq!(image.data().shape(), &[2, 2]);
    }

    #[test]
    fn test_volume_bounding_box_is_xyz() {
        let volume = Volume::new(ArrayData::zeros(vec![3, 4, 5]));
        let bounds = volume.bounding_box().unwrap();
        assert_eq!(bounds.min, Point3::new(-0.5, -0.5, -0.5));
        assert_eq!(bounds.max, Point3::new(3.5, 4.5, 2.5));
    }

    #[test]
    fn test_volume_hit_reports_front_face() {
        let volume = Volume::new(ArrayData::zeros(vec![3, 4, 5]));
        let ray = Ray::new(Point3::new(1.0, 1.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
        let identity = Transform::identity();
        let t = volume.passes_through(&HitContext::new(&ray, &identity));
        assert!((t.unwrap() - 7.5).abs() < EPSILON);
    }

    #[test]
    fn test_volume_side_ray_misses() {
        let volume = Volume::new(ArrayData::zeros(vec![3, 4, 5]));
        let ray = Ray::new(Point3::new(10.0, 10.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
        let identity = Transform::identity();
        assert!(volume.passes_through(&HitContext::new(&ray, &identity)).is_none());
    }
}
