//! Maps layers onto drawing-surface primitives.

use std::f64::consts::TAU;

use tracing::warn;
use vizcanvas_core::{Color, Duration, Palette, Theme, VizError, VizResult};
use vizcanvas_ir::{LayerKind, PropKey, Props, Scene};

use crate::surface::{DrawSurface, FontSpec, TextAlign, TextBaseline};

pub const DEFAULT_RECT_SIZE: f64 = 50.0;
pub const DEFAULT_RADIUS: f64 = 20.0;
pub const DEFAULT_LINE_END: f64 = 100.0;
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const DEFAULT_TEXT: &str = "Text";
/// Side of the square marker drawn for unknown layer types.
pub const PLACEHOLDER_SIZE: f64 = 20.0;

/// Outcome of drawing a scene once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawReport {
    pub drawn: usize,
    pub failed: usize,
}

/// Draws scene layers with theme-dependent default colors.
#[derive(Debug, Clone)]
pub struct ShapeRenderer {
    palette: Palette,
}

impl Default for ShapeRenderer {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl ShapeRenderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            palette: theme.palette(),
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.palette = theme.palette();
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Draw every layer of `scene` at scene time `t`, bottom to top.
    ///
    /// A layer that fails to draw is logged and skipped; the remaining
    /// layers still draw.
    pub fn draw_scene(&self, surface: &mut dyn DrawSurface, scene: &Scene, t: Duration) -> DrawReport {
        let mut report = DrawReport::default();
        for (index, layer) in scene.layers.iter().enumerate() {
            let props = layer.props_at(t.as_millis());
            match self.draw_layer(surface, &layer.kind, &props) {
                Ok(()) => report.drawn += 1,
                Err(e) => {
                    let err = VizError::draw(index, e.to_string());
                    warn!(layer = index, kind = %layer.kind, error = %err, "skipping layer");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Draw one layer from its resolved props.
    ///
    /// Transform and alpha are scoped to the layer: the surface state is
    /// restored whether or not drawing succeeds.
    pub fn draw_layer(&self, surface: &mut dyn DrawSurface, kind: &LayerKind, props: &Props) -> VizResult<()> {
        surface.save();
        let result = self.draw_layer_scoped(surface, kind, props);
        surface.restore();
        result
    }

    fn draw_layer_scoped(&self, surface: &mut dyn DrawSurface, kind: &LayerKind, props: &Props) -> VizResult<()> {
        let x = props.number(PropKey::X).unwrap_or(0.0);
        let y = props.number(PropKey::Y).unwrap_or(0.0);
        if x != 0.0 || y != 0.0 {
            surface.translate(x, y)?;
        }
        let opacity = props.number(PropKey::Opacity).unwrap_or(1.0).clamp(0.0, 1.0);
        surface.set_global_alpha(opacity);

        match kind {
            LayerKind::Rect => self.draw_rect(surface, props),
            LayerKind::Circle => self.draw_circle(surface, props),
            LayerKind::Line => self.draw_line(surface, props),
            LayerKind::Text | LayerKind::Label => self.draw_text(surface, props),
            LayerKind::Unknown(_) => self.draw_placeholder(surface),
        }
    }

    fn draw_rect(&self, surface: &mut dyn DrawSurface, props: &Props) -> VizResult<()> {
        let width = props.number(PropKey::Width).unwrap_or(DEFAULT_RECT_SIZE);
        let height = props.number(PropKey::Height).unwrap_or(DEFAULT_RECT_SIZE);
        surface.set_fill_color(&self.color(props, PropKey::Fill, self.palette.fill));
        surface.fill_rect(0.0, 0.0, width, height)?;
        if let Some(stroke) = self.explicit_color(props, PropKey::Stroke) {
            surface.set_stroke_color(&stroke);
            surface.set_line_width(props.number(PropKey::StrokeWidth).unwrap_or(1.0));
            surface.stroke_rect(0.0, 0.0, width, height)?;
        }
        Ok(())
    }

    fn draw_circle(&self, surface: &mut dyn DrawSurface, props: &Props) -> VizResult<()> {
        let radius = props
            .first_number(&[PropKey::R, PropKey::Radius])
            .unwrap_or(DEFAULT_RADIUS);
        if radius < 0.0 {
            return Err(VizError::InvalidArgument(format!("negative radius {}", radius)));
        }
        surface.begin_path();
        surface.arc(0.0, 0.0, radius, 0.0, TAU)?;
        surface.set_fill_color(&self.color(props, PropKey::Fill, self.palette.fill));
        surface.fill()?;
        if let Some(stroke) = self.explicit_color(props, PropKey::Stroke) {
            surface.set_stroke_color(&stroke);
            surface.set_line_width(props.number(PropKey::StrokeWidth).unwrap_or(1.0));
            surface.stroke()?;
        }
        Ok(())
    }

    fn draw_line(&self, surface: &mut dyn DrawSurface, props: &Props) -> VizResult<()> {
        let x1 = props.number(PropKey::X1).unwrap_or(0.0);
        let y1 = props.number(PropKey::Y1).unwrap_or(0.0);
        let x2 = props
            .first_number(&[PropKey::X2, PropKey::X])
            .unwrap_or(DEFAULT_LINE_END);
        let y2 = props
            .first_number(&[PropKey::Y2, PropKey::Y])
            .unwrap_or(DEFAULT_LINE_END);
        surface.begin_path();
        surface.move_to(x1, y1);
        surface.line_to(x2, y2);
        surface.set_stroke_color(&self.color(props, PropKey::Stroke, self.palette.stroke));
        surface.set_line_width(props.number(PropKey::StrokeWidth).unwrap_or(2.0));
        surface.stroke()
    }

    fn draw_text(&self, surface: &mut dyn DrawSurface, props: &Props) -> VizResult<()> {
        let content = props
            .first_display(&[PropKey::Content, PropKey::Text, PropKey::Label])
            .unwrap_or_else(|| DEFAULT_TEXT.to_string());
        let size = props
            .number(PropKey::FontSize)
            .filter(|s| *s > 0.0)
            .unwrap_or(DEFAULT_FONT_SIZE);
        let family = props.text(PropKey::FontFamily).unwrap_or(DEFAULT_FONT_FAMILY);
        let align = props
            .text(PropKey::TextAlign)
            .and_then(TextAlign::parse)
            .unwrap_or_default();
        let baseline = props
            .text(PropKey::TextBaseline)
            .and_then(TextBaseline::parse)
            .unwrap_or_default();

        surface.set_fill_color(&self.color(props, PropKey::Fill, self.palette.fill));
        surface.set_font(&FontSpec::new(size, family));
        surface.set_text_align(align);
        surface.set_text_baseline(baseline);
        surface.fill_text(&content, 0.0, 0.0)
    }

    fn draw_placeholder(&self, surface: &mut dyn DrawSurface) -> VizResult<()> {
        let half = PLACEHOLDER_SIZE / 2.0;
        surface.set_fill_color(&self.palette.placeholder);
        surface.fill_rect(-half, -half, PLACEHOLDER_SIZE, PLACEHOLDER_SIZE)
    }

    /// A parseable color from `key`, or `fallback`.
    fn color(&self, props: &Props, key: PropKey, fallback: Color) -> Color {
        self.explicit_color(props, key).unwrap_or(fallback)
    }

    fn explicit_color(&self, props: &Props, key: PropKey) -> Option<Color> {
        props.text(key).and_then(|css| Color::parse_css(css).ok())
    }
}
