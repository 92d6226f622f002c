//! A CPU surface that rasterizes draw calls into a [`FrameBuffer`].
//!
//! Coverage is estimated by 4x4 supersampling per pixel. Paths are
//! flattened to polylines in device space at construction time, the way a
//! canvas applies the current transform when a path segment is added.

use std::sync::Arc;

use vizcanvas_core::{Color, FrameBuffer, Size2D, Viewport, VizError, VizResult};

use crate::surface::{DrawSurface, FontSpec, TextAlign, TextBaseline};
use crate::text::TextRenderer;

const SAMPLES: usize = 4;

/// Glyphs are rasterized whole, so a font may be at most this many times
/// the larger frame side.
const MAX_FONT_TO_FRAME: f64 = 4.0;

#[derive(Debug, Clone)]
struct State {
    tx: f64,
    ty: f64,
    alpha: f64,
    fill: Color,
    stroke: Color,
    line_width: f64,
    font: FontSpec,
    align: TextAlign,
    baseline: TextBaseline,
}

impl Default for State {
    fn default() -> Self {
        Self {
            tx: 0.0,
            ty: 0.0,
            alpha: 1.0,
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
            font: FontSpec::new(10.0, "sans-serif"),
            align: TextAlign::Left,
            baseline: TextBaseline::Alphabetic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pt {
    x: f64,
    y: f64,
}

/// Headless drawing surface backed by an RGBA8 frame.
pub struct RasterSurface {
    frame: FrameBuffer,
    viewport: Viewport,
    background: Color,
    state: State,
    stack: Vec<State>,
    path: Vec<Vec<Pt>>,
    text: Arc<TextRenderer>,
}

impl RasterSurface {
    pub fn new(viewport: Viewport, background: Color, text: Arc<TextRenderer>) -> Self {
        let mut frame = FrameBuffer::new(viewport.backing_width, viewport.backing_height);
        frame.fill(&background);
        Self {
            frame,
            viewport,
            background,
            state: State::default(),
            stack: Vec::new(),
            path: Vec::new(),
            text,
        }
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn into_frame(self) -> FrameBuffer {
        self.frame
    }

    fn to_device(&self, x: f64, y: f64) -> Pt {
        let s = self.viewport.scale;
        Pt {
            x: (x + self.state.tx) * s,
            y: (y + self.state.ty) * s,
        }
    }

    fn paint_color(&self, color: &Color) -> Color {
        let alpha = (color.a as f64 * self.state.alpha).clamp(0.0, 1.0);
        color.with_alpha(alpha as f32)
    }

    /// Blend `color` over every pixel inside `bounds`, weighted by the
    /// fraction of sub-samples for which `inside` holds.
    fn cover(&mut self, bounds: (f64, f64, f64, f64), color: &Color, inside: impl Fn(f64, f64) -> bool) {
        let (min_x, min_y, max_x, max_y) = bounds;
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return;
        }
        let x0 = min_x.floor().max(0.0) as i64;
        let y0 = min_y.floor().max(0.0) as i64;
        let x1 = (max_x.ceil() as i64).min(self.frame.width as i64);
        let y1 = (max_y.ceil() as i64).min(self.frame.height as i64);
        let step = 1.0 / SAMPLES as f64;
        let total = (SAMPLES * SAMPLES) as f32;

        for py in y0..y1 {
            for px in x0..x1 {
                let mut hits = 0usize;
                for sy in 0..SAMPLES {
                    for sx in 0..SAMPLES {
                        let x = px as f64 + (sx as f64 + 0.5) * step;
                        let y = py as f64 + (sy as f64 + 0.5) * step;
                        if inside(x, y) {
                            hits += 1;
                        }
                    }
                }
                if hits > 0 {
                    self.frame.blend_pixel(px, py, color, hits as f32 / total);
                }
            }
        }
    }

    fn fill_polygons(&mut self, polygons: &[Vec<Pt>], color: &Color) {
        let Some(bounds) = bounds_of(polygons.iter().flatten(), 0.0) else {
            return;
        };
        self.cover(bounds, color, |x, y| winding(polygons, x, y) != 0);
    }

    fn stroke_polylines(&mut self, lines: &[Vec<Pt>], closed: bool, color: &Color) {
        let half = (self.state.line_width * self.viewport.scale / 2.0).max(0.5);
        let Some(bounds) = bounds_of(lines.iter().flatten(), half) else {
            return;
        };
        let segments: Vec<(Pt, Pt)> = lines
            .iter()
            .flat_map(|line| segments_of(line, closed))
            .collect();
        self.cover(bounds, color, |x, y| {
            segments
                .iter()
                .any(|(a, b)| distance_to_segment(Pt { x, y }, *a, *b) <= half)
        });
    }

    fn rect_corners(&self, x: f64, y: f64, width: f64, height: f64) -> Vec<Pt> {
        vec![
            self.to_device(x, y),
            self.to_device(x + width, y),
            self.to_device(x + width, y + height),
            self.to_device(x, y + height),
        ]
    }
}

fn bounds_of<'a>(points: impl Iterator<Item = &'a Pt>, pad: f64) -> Option<(f64, f64, f64, f64)> {
    points.fold(None, |acc, p| {
        let (a, b, c, d) = acc.unwrap_or((p.x, p.y, p.x, p.y));
        Some((a.min(p.x), b.min(p.y), c.max(p.x), d.max(p.y)))
    })
    .map(|(a, b, c, d)| (a - pad, b - pad, c + pad, d + pad))
}

fn segments_of(line: &[Pt], closed: bool) -> Vec<(Pt, Pt)> {
    let mut segments: Vec<(Pt, Pt)> = line.windows(2).map(|w| (w[0], w[1])).collect();
    if closed && line.len() > 2 {
        segments.push((line[line.len() - 1], line[0]));
    }
    segments
}

/// Nonzero winding number of `(x, y)` against closed polygons.
fn winding(polygons: &[Vec<Pt>], x: f64, y: f64) -> i32 {
    let mut wn = 0;
    for poly in polygons {
        for (a, b) in segments_of(poly, true) {
            let cross = (b.x - a.x) * (y - a.y) - (x - a.x) * (b.y - a.y);
            if a.y <= y {
                if b.y > y && cross > 0.0 {
                    wn += 1;
                }
            } else if b.y <= y && cross < 0.0 {
                wn -= 1;
            }
        }
    }
    wn
}

fn distance_to_segment(p: Pt, a: Pt, b: Pt) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.x + t * dx, a.y + t * dy);
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}

impl DrawSurface for RasterSurface {
    fn size(&self) -> Size2D {
        self.viewport.css
    }

    fn clear(&mut self) -> VizResult<()> {
        let background = self.background;
        self.frame.fill(&background);
        Ok(())
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) -> VizResult<()> {
        if dx.is_finite() && dy.is_finite() {
            self.state.tx += dx;
            self.state.ty += dy;
        }
        Ok(())
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        if (0.0..=1.0).contains(&alpha) {
            self.state.alpha = alpha;
        }
    }

    fn set_fill_color(&mut self, color: &Color) {
        self.state.fill = *color;
    }

    fn set_stroke_color(&mut self, color: &Color) {
        self.state.stroke = *color;
    }

    fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> VizResult<()> {
        let corners = self.rect_corners(x, y, width, height);
        let color = self.paint_color(&self.state.fill);
        self.fill_polygons(&[corners], &color);
        Ok(())
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> VizResult<()> {
        let corners = self.rect_corners(x, y, width, height);
        let color = self.paint_color(&self.state.stroke);
        self.stroke_polylines(&[corners], true, &color);
        Ok(())
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let p = self.to_device(x, y);
        self.path.push(vec![p]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let p = self.to_device(x, y);
        match self.path.last_mut() {
            Some(sub) => sub.push(p),
            None => self.path.push(vec![p]),
        }
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) -> VizResult<()> {
        if radius < 0.0 {
            return Err(VizError::surface(format!("arc radius {} is negative", radius)));
        }
        if !(cx.is_finite() && cy.is_finite() && radius.is_finite() && start.is_finite() && end.is_finite()) {
            return Ok(());
        }
        let sweep = (end - start).clamp(-std::f64::consts::TAU, std::f64::consts::TAU);
        let device_radius = radius * self.viewport.scale;
        let steps = ((device_radius * sweep.abs()) / 2.0).ceil().clamp(8.0, 720.0) as usize;
        let points: Vec<Pt> = (0..=steps)
            .map(|i| {
                let angle = start + sweep * i as f64 / steps as f64;
                self.to_device(cx + radius * angle.cos(), cy + radius * angle.sin())
            })
            .collect();
        match self.path.last_mut() {
            Some(sub) => sub.extend(points),
            None => self.path.push(points),
        }
        Ok(())
    }

    fn fill(&mut self) -> VizResult<()> {
        let path = std::mem::take(&mut self.path);
        let color = self.paint_color(&self.state.fill);
        self.fill_polygons(&path, &color);
        self.path = path;
        Ok(())
    }

    fn stroke(&mut self) -> VizResult<()> {
        let path = std::mem::take(&mut self.path);
        let color = self.paint_color(&self.state.stroke);
        self.stroke_polylines(&path, false, &color);
        self.path = path;
        Ok(())
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.state.font = font.clone();
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.state.align = align;
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.baseline = baseline;
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> VizResult<()> {
        let size = self.state.font.size_px * self.viewport.scale;
        let limit = f64::from(self.frame.width.max(self.frame.height)) * MAX_FONT_TO_FRAME;
        if !size.is_finite() || size > limit {
            return Err(VizError::surface(format!(
                "font size {}px exceeds the {}px limit for this frame",
                size, limit
            )));
        }
        let size = size as f32;
        let family = self.state.font.family.clone();
        let Some(measure) = self.text.measure_line(&family, text, size) else {
            return Ok(());
        };
        let origin = self.to_device(x, y);
        let left = match self.state.align {
            TextAlign::Left => origin.x as f32,
            TextAlign::Center => origin.x as f32 - measure.width / 2.0,
            TextAlign::Right => origin.x as f32 - measure.width,
        };
        let baseline = match self.state.baseline {
            TextBaseline::Alphabetic => origin.y as f32,
            TextBaseline::Top => origin.y as f32 + measure.ascent,
            TextBaseline::Middle => origin.y as f32 + (measure.ascent + measure.descent) / 2.0,
            TextBaseline::Bottom => origin.y as f32 + measure.descent,
        };
        let color = self.paint_color(&self.state.fill);
        let text_renderer = Arc::clone(&self.text);
        text_renderer.draw_line(&mut self.frame, &family, text, size, left, baseline, &color);
        Ok(())
    }
}
