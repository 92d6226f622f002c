//! A surface that records draw calls instead of producing pixels.
//!
//! Used by tests and by the CLI to show exactly which primitives a scene
//! produces at a given instant.

use serde::Serialize;
use vizcanvas_core::{Color, Size2D, VizResult};

use crate::surface::{DrawSurface, FontSpec, TextAlign, TextBaseline};

/// One recorded surface call. Colors are recorded as CSS strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawOp {
    Clear,
    Save,
    Restore,
    Translate { dx: f64, dy: f64 },
    GlobalAlpha(f64),
    FillStyle(String),
    StrokeStyle(String),
    LineWidth(f64),
    FillRect { x: f64, y: f64, width: f64, height: f64 },
    StrokeRect { x: f64, y: f64, width: f64, height: f64 },
    BeginPath,
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    Arc { cx: f64, cy: f64, radius: f64, start: f64, end: f64 },
    Fill,
    Stroke,
    Font(String),
    TextAlign(String),
    TextBaseline(String),
    FillText { text: String, x: f64, y: f64 },
}

/// Records every call in order.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Size2D,
    ops: Vec<DrawOp>,
    depth: usize,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size2D::new(width, height),
            ops: Vec::new(),
            depth: 0,
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    /// Number of `save` calls not yet matched by a `restore`.
    pub fn save_depth(&self) -> usize {
        self.depth
    }

    /// Forget everything recorded so far.
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> Size2D {
        self.size
    }

    fn clear(&mut self) -> VizResult<()> {
        self.push(DrawOp::Clear);
        Ok(())
    }

    fn save(&mut self) {
        self.depth += 1;
        self.push(DrawOp::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.push(DrawOp::Restore);
    }

    fn translate(&mut self, dx: f64, dy: f64) -> VizResult<()> {
        self.push(DrawOp::Translate { dx, dy });
        Ok(())
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.push(DrawOp::GlobalAlpha(alpha));
    }

    fn set_fill_color(&mut self, color: &Color) {
        self.push(DrawOp::FillStyle(color.to_css()));
    }

    fn set_stroke_color(&mut self, color: &Color) {
        self.push(DrawOp::StrokeStyle(color.to_css()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.push(DrawOp::LineWidth(width));
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> VizResult<()> {
        self.push(DrawOp::FillRect { x, y, width, height });
        Ok(())
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> VizResult<()> {
        self.push(DrawOp::StrokeRect { x, y, width, height });
        Ok(())
    }

    fn begin_path(&mut self) {
        self.push(DrawOp::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push(DrawOp::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push(DrawOp::LineTo { x, y });
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) -> VizResult<()> {
        self.push(DrawOp::Arc {
            cx,
            cy,
            radius,
            start,
            end,
        });
        Ok(())
    }

    fn fill(&mut self) -> VizResult<()> {
        self.push(DrawOp::Fill);
        Ok(())
    }

    fn stroke(&mut self) -> VizResult<()> {
        self.push(DrawOp::Stroke);
        Ok(())
    }

    fn set_font(&mut self, font: &FontSpec) {
        self.push(DrawOp::Font(font.to_string()));
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.push(DrawOp::TextAlign(align.as_str().to_string()));
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.push(DrawOp::TextBaseline(baseline.as_str().to_string()));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> VizResult<()> {
        self.push(DrawOp::FillText {
            text: text.to_string(),
            x,
            y,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        surface.save();
        surface.fill_rect(0.0, 0.0, 1.0, 1.0).unwrap();
        surface.restore();
        assert_eq!(
            surface.ops(),
            &[
                DrawOp::Save,
                DrawOp::FillRect { x: 0.0, y: 0.0, width: 1.0, height: 1.0 },
                DrawOp::Restore
            ]
        );
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn test_unbalanced_restore_is_harmless() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        surface.restore();
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn test_serializes_snake_case() {
        let json = serde_json::to_value(vec![
            DrawOp::BeginPath,
            DrawOp::GlobalAlpha(0.5),
            DrawOp::MoveTo { x: 1.0, y: 2.0 },
        ])
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!(["begin_path", {"global_alpha": 0.5}, {"move_to": {"x": 1.0, "y": 2.0}}])
        );
    }
}
