use cgmath::Point3;

use crate::color::Color;
use crate::common::Aabb;
use crate::error::{SceneResult, check_non_negative};

/// Half-extent of the placeholder box around a text anchor.
const TEXT_EXTENT: f64 = 1e-6;

/// A text label anchored at the node origin. Text is rendered in screen
/// space, so it contributes only its anchor to bounds and is never picked.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Text {
    text: String,
    color: Color,
    size: f64,
}

impl Default for Text {
    fn default() -> Self {
        Self::new("")
    }
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: Color::WHITE,
            size: 12.0,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Font size in pixels.
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub(crate) fn validate(&self) -> SceneResult<()> {
        check_non_negative("size", self.size)?;
        Ok(())
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.text = text;
    }

    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub(crate) fn set_size(&mut self, size: f64) -> SceneResult<()> {
        self.size = check_non_negative("size", size)?;
        Ok(())
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        Some(Aabb::new(
            Point3::new(-TEXT_EXTENT, -TEXT_EXTENT, -TEXT_EXTENT),
            Point3::new(TEXT_EXTENT, TEXT_EXTENT, TEXT_EXTENT),
        ))
    }
}
