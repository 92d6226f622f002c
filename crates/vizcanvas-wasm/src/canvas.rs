//! [`DrawSurface`] over a browser `CanvasRenderingContext2d`.
//!
//! This module is the only place that touches the 2D context. Coordinates
//! arrive in CSS pixels; the device pixel ratio is applied as the base
//! transform on every clear.

use vizcanvas_core::{CanvasConfig, Color, Size2D, Viewport, VizError, VizResult};
use vizcanvas_render::{DrawSurface, FontSpec, TextAlign, TextBaseline};
use wasm_bindgen::JsValue;
use tracing::warn;
use web_sys::{CanvasRenderingContext2d, CssStyleDeclaration, HtmlCanvasElement};

pub(crate) fn js_err(err: JsValue) -> VizError {
    VizError::surface(
        err.as_string()
            .unwrap_or_else(|| format!("{:?}", err)),
    )
}

/// Size to lay the canvas out at, given what the container reports.
///
/// A container that reports nothing usable (detached, `display: none`)
/// gets the configured fallback; [`Viewport::fit`] then clamps to the
/// minimum.
pub(crate) fn container_size(width: f64, height: f64, canvas: &CanvasConfig) -> Size2D {
    let fallback = canvas.fallback_size();
    let pick = |v: f64, fb: f64| if v.is_finite() && v > 0.0 { v } else { fb };
    Size2D::new(pick(width, fallback.width), pick(height, fallback.height))
}

/// Measure the canvas container: the parent element when there is one,
/// otherwise the canvas itself.
fn measure(canvas: &HtmlCanvasElement, config: &CanvasConfig) -> Size2D {
    let (w, h) = match canvas.parent_element() {
        Some(parent) => (parent.client_width(), parent.client_height()),
        None => (canvas.client_width(), canvas.client_height()),
    };
    container_size(w as f64, h as f64, config)
}

fn set_style_px(style: &CssStyleDeclaration, property: &str, px: f64) {
    if let Err(e) = style.set_property(property, &format!("{}px", px)) {
        warn!(property, error = %js_err(e), "failed to set canvas style");
    }
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    viewport: Viewport,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        let viewport = Viewport::fit(Size2D::new(0.0, 0.0), 1.0, Size2D::new(1.0, 1.0));
        Self {
            canvas,
            ctx,
            viewport,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Re-measure the container and resize the backing store if the CSS
    /// size or the pixel ratio changed. Returns whether anything changed.
    pub fn fit(&mut self, device_pixel_ratio: f64, config: &CanvasConfig) -> bool {
        let viewport = Viewport::fit(measure(&self.canvas, config), device_pixel_ratio, config.min_size());
        if viewport == self.viewport {
            return false;
        }
        self.canvas.set_width(viewport.backing_width);
        self.canvas.set_height(viewport.backing_height);
        let style = self.canvas.style();
        set_style_px(&style, "width", viewport.css.width);
        set_style_px(&style, "height", viewport.css.height);
        tracing::debug!(
            width = viewport.css.width,
            height = viewport.css.height,
            scale = viewport.scale,
            "canvas resized"
        );
        self.viewport = viewport;
        true
    }
}

impl DrawSurface for CanvasSurface {
    fn size(&self) -> Size2D {
        self.viewport.css
    }

    fn clear(&mut self) -> VizResult<()> {
        let s = self.viewport.scale;
        self.ctx.set_transform(s, 0.0, 0.0, s, 0.0, 0.0).map_err(js_err)?;
        let size = self.viewport.css;
        self.ctx.clear_rect(0.0, 0.0, size.width, size.height);
        Ok(())
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, dx: f64, dy: f64) -> VizResult<()> {
        self.ctx.translate(dx, dy).map_err(js_err)
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }

    fn set_fill_color(&mut self, color: &Color) {
        self.ctx.set_fill_style_str(&color.to_css());
    }

    fn set_stroke_color(&mut self, color: &Color) {
        self.ctx.set_stroke_style_str(&color.to_css());
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> VizResult<()> {
        self.ctx.fill_rect(x, y, width, height);
        Ok(())
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> VizResult<()> {
        self.ctx.stroke_rect(x, y, width, height);
        Ok(())
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.ctx.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.ctx.line_to(x, y);
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) -> VizResult<()> {
        self.ctx.arc(cx, cy, radius, start, end).map_err(js_err)
    }

    fn fill(&mut self) -> VizResult<()> {
        self.ctx.fill();
        Ok(())
    }

    fn stroke(&mut self) -> VizResult<()> {
        self.ctx.stroke();
        Ok(())
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.ctx.set_font(&font.to_string());
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.ctx.set_text_align(align.as_str());
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.ctx.set_text_baseline(baseline.as_str());
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> VizResult<()> {
        self.ctx.fill_text(text, x, y).map_err(js_err)
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn detached_surface() -> CanvasSurface {
        let document = web_sys::window().unwrap().document().unwrap();
        let canvas = document
            .create_element("canvas")
            .unwrap()
            .dyn_into::<HtmlCanvasElement>()
            .unwrap();
        let ctx = canvas
            .get_context("2d")
            .unwrap()
            .unwrap()
            .dyn_into::<CanvasRenderingContext2d>()
            .unwrap();
        CanvasSurface::new(canvas, ctx)
    }

    #[wasm_bindgen_test]
    fn test_fit_sizes_backing_store_and_style() {
        let mut surface = detached_surface();
        assert!(surface.fit(2.0, &CanvasConfig::default()));
        assert_eq!(surface.canvas.width(), 800);
        assert_eq!(surface.canvas.height(), 600);
        let style = surface.canvas.style();
        assert_eq!(style.get_property_value("width").unwrap(), "400px");
        assert_eq!(style.get_property_value("height").unwrap(), "300px");
        assert!(!surface.fit(2.0, &CanvasConfig::default()));
    }
}
