//! Text rasterization for headless surfaces.
//! Uses fontdue for CPU-based glyph rasterization.
//!
//! No font ships with the crate. Fonts are loaded from files by family
//! name; requests for an unknown family use the first loaded font, or a
//! sans-serif face found in a well-known system location.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use fontdue::{Font, FontSettings};
use tracing::debug;
use vizcanvas_core::{Color, FrameBuffer, VizError, VizResult};

/// Places where a usable sans-serif face commonly lives.
const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static SYSTEM_FONT: OnceLock<Option<Font>> = OnceLock::new();

/// Get or probe the system fallback font.
fn system_font() -> Option<&'static Font> {
    SYSTEM_FONT
        .get_or_init(|| {
            SYSTEM_FONT_PATHS.iter().find_map(|path| {
                let data = std::fs::read(path).ok()?;
                let font = Font::from_bytes(data, FontSettings::default()).ok()?;
                debug!(path, "using system fallback font");
                Some(font)
            })
        })
        .as_ref()
}

fn parse_font(name: &str, data: Vec<u8>) -> VizResult<Font> {
    Font::from_bytes(data, FontSettings::default())
        .map_err(|e| VizError::InvalidArgument(format!("failed to parse font {}: {}", name, e)))
}

/// Horizontal extent and vertical metrics of one line of text, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMeasure {
    /// Total advance width.
    pub width: f32,
    /// Distance from the baseline up to the top of the em box.
    pub ascent: f32,
    /// Distance from the baseline down to the bottom of the em box (negative).
    pub descent: f32,
}

/// Text renderer: rasterizes a line of text into a FrameBuffer.
pub struct TextRenderer {
    font_cache: HashMap<String, Font>,
    first_loaded: Option<String>,
    use_system_font: bool,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self {
            font_cache: HashMap::new(),
            first_loaded: None,
            use_system_font: true,
        }
    }

    /// A renderer that only uses explicitly loaded fonts.
    pub fn without_system_font() -> Self {
        Self {
            use_system_font: false,
            ..Self::new()
        }
    }

    /// Load a font from a file path under a family name.
    pub fn load_font(&mut self, name: &str, path: &Path) -> VizResult<()> {
        let data = std::fs::read(path)?;
        self.load_font_bytes(name, data)
    }

    pub fn load_font_bytes(&mut self, name: &str, data: Vec<u8>) -> VizResult<()> {
        let font = parse_font(name, data)?;
        self.font_cache.insert(name.to_string(), font);
        if self.first_loaded.is_none() {
            self.first_loaded = Some(name.to_string());
        }
        Ok(())
    }

    /// Get a font by family name, falling back to the default.
    pub fn get_font(&self, font_family: &str) -> Option<&Font> {
        self.font_cache
            .get(font_family)
            .or_else(|| self.first_loaded.as_ref().and_then(|n| self.font_cache.get(n)))
            .or_else(|| if self.use_system_font { system_font() } else { None })
    }

    pub fn has_font(&self) -> bool {
        self.get_font("").is_some()
    }

    /// Measure a single line of text.
    pub fn measure_line(&self, font_family: &str, text: &str, font_size: f32) -> Option<LineMeasure> {
        let font = self.get_font(font_family)?;
        let width = text
            .chars()
            .map(|ch| font.metrics(ch, font_size).advance_width)
            .sum();
        let (ascent, descent) = match font.horizontal_line_metrics(font_size) {
            Some(m) => (m.ascent, m.descent),
            None => (font_size * 0.8, -font_size * 0.2),
        };
        Some(LineMeasure {
            width,
            ascent,
            descent,
        })
    }

    /// Blend a single line into `fb` with its baseline starting at
    /// `(x, baseline_y)` in device pixels. Returns `false` when no font is
    /// available.
    pub fn draw_line(
        &self,
        fb: &mut FrameBuffer,
        font_family: &str,
        text: &str,
        font_size: f32,
        x: f32,
        baseline_y: f32,
        color: &Color,
    ) -> bool {
        let Some(font) = self.get_font(font_family) else {
            return false;
        };
        let mut cursor_x = x;

        for ch in text.chars() {
            let (metrics, bitmap) = font.rasterize(ch, font_size);
            let glyph_x = (cursor_x + metrics.xmin as f32).round() as i64;
            let glyph_y = (baseline_y - (metrics.height as i32 + metrics.ymin) as f32).round() as i64;

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let coverage = bitmap[gy * metrics.width + gx];
                    if coverage == 0 {
                        continue;
                    }
                    fb.blend_pixel(
                        glyph_x + gx as i64,
                        glyph_y + gy as i64,
                        color,
                        coverage as f32 / 255.0,
                    );
                }
            }

            cursor_x += metrics.advance_width;
        }
        true
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer_with_font() -> Option<TextRenderer> {
        let renderer = TextRenderer::new();
        renderer.has_font().then_some(renderer)
    }

    #[test]
    fn test_without_font_draws_nothing() {
        let renderer = TextRenderer::without_system_font();
        assert!(!renderer.has_font());
        let mut fb = FrameBuffer::new(20, 20);
        assert!(!renderer.draw_line(&mut fb, "Arial", "Hi", 12.0, 0.0, 15.0, &Color::BLACK));
        assert!(fb.data.iter().all(|b| *b == 0));
        assert!(renderer.measure_line("Arial", "Hi", 12.0).is_none());
    }

    #[test]
    fn test_load_missing_font_file() {
        let mut renderer = TextRenderer::new();
        let result = renderer.load_font("missing", Path::new("/nonexistent/font.ttf"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_garbage_font_bytes() {
        let mut renderer = TextRenderer::without_system_font();
        assert!(renderer.load_font_bytes("junk", vec![0, 1, 2, 3]).is_err());
        assert!(!renderer.has_font());
    }

    #[test]
    fn test_render_line_with_system_font() {
        let Some(renderer) = renderer_with_font() else {
            return;
        };
        let mut fb = FrameBuffer::new(120, 40);
        assert!(renderer.draw_line(&mut fb, "Arial", "Hello", 24.0, 2.0, 30.0, &Color::RED));
        let has_red = fb.data.chunks_exact(4).any(|p| p[3] > 0 && p[0] > 0);
        assert!(has_red, "rendered text should have visible red pixels");
    }

    #[test]
    fn test_measure_grows_with_text() {
        let Some(renderer) = renderer_with_font() else {
            return;
        };
        let short = renderer.measure_line("", "Hi", 16.0).unwrap();
        let long = renderer.measure_line("", "Hello World", 16.0).unwrap();
        assert!(long.width > short.width);
        assert!(short.ascent > 0.0);
        assert!(short.descent <= 0.0);
    }
}
