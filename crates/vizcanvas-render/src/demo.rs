//! The animation shown while no scene is loaded: a disc sliding across the
//! surface with a caption underneath.

use std::f64::consts::TAU;

use vizcanvas_core::{DemoConfig, Duration, Palette, Point2D, Size2D, VizResult};

use crate::surface::{DrawSurface, FontSpec, TextAlign, TextBaseline};

pub const DEMO_CAPTION: &str = "Demo Animation";
const CAPTION_OFFSET: f64 = 60.0;
const TRACE_OFFSET: f64 = 40.0;
const FALLBACK_PERIOD_MS: f64 = 3000.0;

#[derive(Debug, Clone, Default)]
pub struct DemoFallback {
    config: DemoConfig,
}

impl DemoFallback {
    pub fn new(config: DemoConfig) -> Self {
        Self { config }
    }

    fn period_ms(&self) -> f64 {
        if self.config.period_ms.is_finite() && self.config.period_ms > 0.0 {
            self.config.period_ms
        } else {
            FALLBACK_PERIOD_MS
        }
    }

    /// Where the disc is after `elapsed` on a surface of `size`.
    pub fn disc_center(&self, size: Size2D, elapsed: Duration) -> Point2D {
        let period = self.period_ms();
        let progress = (elapsed.as_millis() % period) / period;
        let margin = self.config.margin;
        let travel = (size.width - margin * 2.0).max(0.0);
        Point2D::new(margin + travel * progress, size.height / 2.0)
    }

    /// Draw one demo frame. `trace` is printed under the caption when
    /// enabled in the config.
    pub fn draw(
        &self,
        surface: &mut dyn DrawSurface,
        palette: &Palette,
        elapsed: Duration,
        trace: Option<&str>,
    ) -> VizResult<()> {
        surface.save();
        let result = self.draw_scoped(surface, palette, elapsed, trace);
        surface.restore();
        result
    }

    fn draw_scoped(
        &self,
        surface: &mut dyn DrawSurface,
        palette: &Palette,
        elapsed: Duration,
        trace: Option<&str>,
    ) -> VizResult<()> {
        let size = surface.size();
        let center = self.disc_center(size, elapsed);

        surface.begin_path();
        surface.arc(center.x, center.y, self.config.radius.max(0.0), 0.0, TAU)?;
        surface.set_fill_color(&palette.demo_accent);
        surface.fill()?;

        surface.set_fill_color(&palette.fill);
        surface.set_font(&FontSpec::new(16.0, "Arial"));
        surface.set_text_align(TextAlign::Center);
        surface.set_text_baseline(TextBaseline::Top);
        surface.fill_text(DEMO_CAPTION, size.width / 2.0, size.height - CAPTION_OFFSET)?;

        if let Some(trace) = trace.filter(|t| self.config.show_trace && !t.is_empty()) {
            surface.set_font(&FontSpec::new(12.0, "monospace"));
            surface.fill_text(
                &format!("Debug: {}", trace),
                size.width / 2.0,
                size.height - TRACE_OFFSET,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawOp, RecordingSurface};
    use vizcanvas_core::Theme;

    #[test]
    fn test_disc_travel() {
        let demo = DemoFallback::default();
        let size = Size2D::new(400.0, 300.0);
        assert_eq!(demo.disc_center(size, Duration::zero()), Point2D::new(50.0, 150.0));
        assert_eq!(demo.disc_center(size, Duration::from_millis(1500.0)), Point2D::new(200.0, 150.0));
        assert_eq!(demo.disc_center(size, Duration::from_millis(3000.0)), Point2D::new(50.0, 150.0));
    }

    #[test]
    fn test_narrow_surface_keeps_disc_at_margin() {
        let demo = DemoFallback::default();
        let center = demo.disc_center(Size2D::new(80.0, 100.0), Duration::from_millis(1000.0));
        assert_eq!(center, Point2D::new(50.0, 50.0));
    }

    #[test]
    fn test_draws_caption_and_trace() {
        let mut surface = RecordingSurface::new(400.0, 300.0);
        DemoFallback::default()
            .draw(&mut surface, &Theme::Light.palette(), Duration::zero(), Some("input: null"))
            .unwrap();
        let ops = surface.ops();
        assert!(ops.contains(&DrawOp::FillText { text: "Demo Animation".into(), x: 200.0, y: 240.0 }));
        assert!(ops.contains(&DrawOp::FillText { text: "Debug: input: null".into(), x: 200.0, y: 260.0 }));
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn test_trace_hidden_when_disabled() {
        let config = DemoConfig {
            show_trace: false,
            ..DemoConfig::default()
        };
        let mut surface = RecordingSurface::new(400.0, 300.0);
        DemoFallback::new(config)
            .draw(&mut surface, &Theme::Dark.palette(), Duration::zero(), Some("x"))
            .unwrap();
        let texts = surface
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::FillText { .. }))
            .count();
        assert_eq!(texts, 1);
    }
}
