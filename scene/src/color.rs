/// A linear RGBA color with components in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// How colors are assigned to a node's geometry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorModel {
    /// One color for the whole node.
    Uniform(Color),
    /// One color per face (meshes).
    FaceColors(Vec<Color>),
    /// One color per vertex.
    VertexColors(Vec<Color>),
}

impl Default for ColorModel {
    fn default() -> Self {
        Self::Uniform(Color::WHITE)
    }
}

impl ColorModel {
    pub fn name(&self) -> &'static str {
        match self {
            ColorModel::Uniform(_) => "uniform",
            ColorModel::FaceColors(_) => "face colors",
            ColorModel::VertexColors(_) => "vertex colors",
        }
    }
}
