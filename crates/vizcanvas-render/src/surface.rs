//! The 2D drawing surface the renderers draw onto.
//!
//! Modelled on the immediate-mode canvas API: a state stack
//! (`save`/`restore`) holding transform, alpha, styles and font, plus
//! rectangle, path and text primitives. Implemented by the browser canvas,
//! the headless raster surface and the recording surface.

use std::fmt;

use vizcanvas_core::{Color, Size2D, VizResult};

/// Horizontal text anchoring relative to the draw point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    /// Parse a canvas `textAlign` keyword; unknown keywords yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" | "end" => Some(TextAlign::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// Vertical text anchoring relative to the draw point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    Top,
    #[default]
    Middle,
    Alphabetic,
    Bottom,
}

impl TextBaseline {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "top" | "hanging" => Some(TextBaseline::Top),
            "middle" => Some(TextBaseline::Middle),
            "alphabetic" => Some(TextBaseline::Alphabetic),
            "bottom" | "ideographic" => Some(TextBaseline::Bottom),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextBaseline::Top => "top",
            TextBaseline::Middle => "middle",
            TextBaseline::Alphabetic => "alphabetic",
            TextBaseline::Bottom => "bottom",
        }
    }
}

/// A font request: pixel size and family name.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub size_px: f64,
    pub family: String,
}

impl FontSpec {
    pub fn new(size_px: f64, family: impl Into<String>) -> Self {
        Self {
            size_px,
            family: family.into(),
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new(16.0, "Arial")
    }
}

/// CSS font shorthand, e.g. `16px Arial`.
impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px {}", self.size_px, self.family)
    }
}

/// An immediate-mode 2D drawing target.
///
/// Coordinates are CSS pixels; implementations map them onto their
/// backing store. Fallible operations report failures as
/// [`vizcanvas_core::VizError`] instead of panicking.
pub trait DrawSurface {
    /// Drawable area in CSS pixels.
    fn size(&self) -> Size2D;

    /// Reset every pixel of the surface to its background.
    fn clear(&mut self) -> VizResult<()>;

    /// Push the current drawing state.
    fn save(&mut self);

    /// Pop the drawing state pushed by the matching [`DrawSurface::save`].
    fn restore(&mut self);

    fn translate(&mut self, dx: f64, dy: f64) -> VizResult<()>;

    fn set_global_alpha(&mut self, alpha: f64);

    fn set_fill_color(&mut self, color: &Color);

    fn set_stroke_color(&mut self, color: &Color);

    fn set_line_width(&mut self, width: f64);

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> VizResult<()>;

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> VizResult<()>;

    /// Start a new, empty path.
    fn begin_path(&mut self);

    fn move_to(&mut self, x: f64, y: f64);

    fn line_to(&mut self, x: f64, y: f64);

    /// Add a circular arc (angles in radians, clockwise) to the path.
    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) -> VizResult<()>;

    /// Fill the current path.
    fn fill(&mut self) -> VizResult<()>;

    /// Stroke the current path.
    fn stroke(&mut self) -> VizResult<()>;

    fn set_font(&mut self, font: &FontSpec);

    fn set_text_align(&mut self, align: TextAlign);

    fn set_text_baseline(&mut self, baseline: TextBaseline);

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> VizResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_align_parse() {
        assert_eq!(TextAlign::parse("center"), Some(TextAlign::Center));
        assert_eq!(TextAlign::parse("START"), Some(TextAlign::Left));
        assert_eq!(TextAlign::parse("end"), Some(TextAlign::Right));
        assert_eq!(TextAlign::parse("justify"), None);
        assert_eq!(TextAlign::default(), TextAlign::Center);
    }

    #[test]
    fn test_baseline_parse() {
        assert_eq!(TextBaseline::parse("top"), Some(TextBaseline::Top));
        assert_eq!(TextBaseline::parse("ideographic"), Some(TextBaseline::Bottom));
        assert_eq!(TextBaseline::parse("sideways"), None);
        assert_eq!(TextBaseline::default(), TextBaseline::Middle);
    }

    #[test]
    fn test_font_css() {
        assert_eq!(FontSpec::default().to_string(), "16px Arial");
        assert_eq!(FontSpec::new(12.5, "monospace").to_string(), "12.5px monospace");
    }
}
