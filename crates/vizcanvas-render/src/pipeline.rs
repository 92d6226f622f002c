use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use vizcanvas_core::hash::{self, ContentHash};
use vizcanvas_core::{Duration, FrameBuffer, Size2D, Theme, Viewport, VizConfig, VizError, VizResult};
use vizcanvas_ir::Scene;

use crate::demo::DemoFallback;
use crate::raster::RasterSurface;
use crate::shapes::{DrawReport, ShapeRenderer};
use crate::surface::DrawSurface;
use crate::text::TextRenderer;

/// What one paint pass drew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Painted {
    Demo,
    Scene(DrawReport),
}

/// Draws one complete frame: clear, then either the scene or the demo.
#[derive(Debug, Clone)]
pub struct Painter {
    shapes: ShapeRenderer,
    demo: DemoFallback,
    demo_when_empty: bool,
}

impl Painter {
    pub fn new(config: &VizConfig) -> Self {
        Self {
            shapes: ShapeRenderer::new(config.theme.theme()),
            demo: DemoFallback::new(config.demo.clone()),
            demo_when_empty: config.playback.demo_when_empty,
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.shapes.set_theme(theme);
    }

    pub fn shapes(&self) -> &ShapeRenderer {
        &self.shapes
    }

    /// Whether `scene` is drawn through the demo animation instead.
    pub fn shows_demo(&self, scene: Option<&Scene>) -> bool {
        match scene {
            None => true,
            Some(scene) => self.demo_when_empty && scene.is_empty(),
        }
    }

    /// Paint one frame. Never fails: surface errors are logged and the
    /// frame is left as far as it got.
    pub fn paint(
        &self,
        surface: &mut dyn DrawSurface,
        scene: Option<&Scene>,
        elapsed: Duration,
        trace: Option<&str>,
    ) -> Painted {
        if let Err(e) = surface.clear() {
            warn!(error = %e, "failed to clear surface");
        }
        match scene {
            Some(scene) if !self.shows_demo(Some(scene)) => {
                let t = scene.effective_time(elapsed);
                Painted::Scene(self.shapes.draw_scene(surface, scene, t))
            }
            _ => {
                if let Err(e) = self.demo.draw(surface, self.shapes.palette(), elapsed, trace) {
                    warn!(error = %e, "failed to draw demo animation");
                }
                Painted::Demo
            }
        }
    }
}

/// Result of a headless render.
pub struct RenderResult {
    /// All rendered frames in order.
    pub frames: Vec<FrameBuffer>,
    /// Playback time of each frame.
    pub times: Vec<Duration>,
    /// Backing width.
    pub width: u32,
    /// Backing height.
    pub height: u32,
    /// FPS.
    pub fps: f64,
}

impl RenderResult {
    /// Compute the content hash of the entire render output.
    ///
    /// The same scene rendered with the same settings produces the same
    /// hash.
    pub fn content_hash(&self) -> ContentHash {
        hash::hash_frames(&self.frames)
    }

    /// Compute the content hash of a single frame by index.
    pub fn frame_hash(&self, index: usize) -> Option<ContentHash> {
        self.frames.get(index).map(hash::hash_frame)
    }
}

/// Renders scenes to frame buffers without a host display.
pub struct RenderPipeline {
    painter: Painter,
    text_renderer: Arc<TextRenderer>,
    viewport: Viewport,
    theme: Theme,
}

impl RenderPipeline {
    /// Create a pipeline for a surface of `width` x `height` CSS pixels at
    /// device pixel ratio `scale`.
    pub fn new(config: &VizConfig, width: f64, height: f64, scale: f64) -> Self {
        let viewport = Viewport::fit(Size2D::new(width, height), scale, config.canvas.min_size());
        Self {
            painter: Painter::new(config),
            text_renderer: Arc::new(TextRenderer::new()),
            viewport,
            theme: config.theme.theme(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.painter.set_theme(theme);
    }

    /// Use the font at `path` for all text.
    pub fn load_font(&mut self, path: &Path) -> VizResult<()> {
        info!("Loading font from {}", path.display());
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Arc::get_mut(&mut self.text_renderer)
            .ok_or_else(|| VizError::Other("font store is shared by a live surface".into()))?
            .load_font(&name, path)
    }

    fn surface(&self) -> RasterSurface {
        RasterSurface::new(
            self.viewport,
            self.theme.palette().background,
            Arc::clone(&self.text_renderer),
        )
    }

    /// Render the frame shown after `elapsed` of playback.
    pub fn render_frame(&self, scene: Option<&Scene>, elapsed: Duration, trace: Option<&str>) -> FrameBuffer {
        let mut surface = self.surface();
        self.painter.paint(&mut surface, scene, elapsed, trace);
        surface.into_frame()
    }

    /// Render `count` frames sampled at `fps`, starting at time zero.
    pub fn render_sequence(&self, scene: Option<&Scene>, fps: f64, count: usize) -> RenderResult {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 30.0 };
        let mut surface = self.surface();
        let mut frames = Vec::with_capacity(count);
        let mut times = Vec::with_capacity(count);
        for index in 0..count {
            let elapsed = Duration::from_millis(index as f64 * 1000.0 / fps);
            self.painter.paint(&mut surface, scene, elapsed, None);
            frames.push(surface.frame().clone());
            times.push(elapsed);
        }
        RenderResult {
            frames,
            times,
            width: self.viewport.backing_width,
            height: self.viewport.backing_height,
            fps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{DrawOp, RecordingSurface};
    use serde_json::json;
    use vizcanvas_ir::normalize;

    fn config() -> VizConfig {
        VizConfig::default()
    }

    #[test]
    fn test_paint_without_scene_shows_demo() {
        let painter = Painter::new(&config());
        let mut surface = RecordingSurface::new(400.0, 300.0);
        let painted = painter.paint(&mut surface, None, Duration::zero(), None);
        assert_eq!(painted, Painted::Demo);
        assert_eq!(surface.ops().first(), Some(&DrawOp::Clear));
    }

    #[test]
    fn test_empty_scene_paints_nothing_by_default() {
        let painter = Painter::new(&config());
        let scene = normalize(&json!({"layers": []})).scene.unwrap();
        let mut surface = RecordingSurface::new(400.0, 300.0);
        let painted = painter.paint(&mut surface, Some(&scene), Duration::zero(), None);
        assert_eq!(painted, Painted::Scene(DrawReport::default()));
        assert_eq!(surface.ops(), &[DrawOp::Clear]);
    }

    #[test]
    fn test_empty_scene_demo_when_configured() {
        let mut cfg = config();
        cfg.playback.demo_when_empty = true;
        let painter = Painter::new(&cfg);
        let scene = normalize(&json!([])).scene.unwrap();
        let mut surface = RecordingSurface::new(400.0, 300.0);
        assert_eq!(
            painter.paint(&mut surface, Some(&scene), Duration::zero(), None),
            Painted::Demo
        );
    }

    #[test]
    fn test_paint_wraps_elapsed() {
        let painter = Painter::new(&config());
        let scene = vizcanvas_ir::sample_scene();
        let mut surface = RecordingSurface::new(400.0, 300.0);
        painter.paint(&mut surface, Some(&scene), Duration::from_millis(5000.0), None);
        assert!(surface.ops().contains(&DrawOp::Translate { dx: 200.0, dy: 100.0 }));
    }

    #[test]
    fn test_render_deterministic() {
        let pipeline = RenderPipeline::new(&config(), 200.0, 150.0, 1.0);
        let scene = vizcanvas_ir::sample_scene();
        let a = pipeline.render_sequence(Some(&scene), 10.0, 5);
        let b = pipeline.render_sequence(Some(&scene), 10.0, 5);
        assert_eq!(a.frames.len(), 5);
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.frame_hash(0), a.frame_hash(4));
    }

    #[test]
    fn test_render_frame_size_follows_viewport() {
        let pipeline = RenderPipeline::new(&config(), 50.0, 40.0, 2.0);
        let frame = pipeline.render_frame(None, Duration::zero(), None);
        assert_eq!((frame.width, frame.height), (200, 200));
    }
}
