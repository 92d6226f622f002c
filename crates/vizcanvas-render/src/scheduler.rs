//! The per-surface playback loop.
//!
//! A [`FrameScheduler`] owns the playback clock, the cached scene and the
//! handle of the pending refresh callback. The host calls
//! [`FrameScheduler::on_frame`] once per display refresh; the scheduler
//! advances its clock, paints, and asks the host for the next refresh.
//! Scene replacement and reset requests are queued and applied at the
//! start of the next tick, never in the middle of one.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use vizcanvas_core::{Duration, Theme, Timestamp, VizConfig, VizResult};
use vizcanvas_ir::{NormalizeTrace, Normalizer, Scene};

use crate::pipeline::{Painted, Painter};
use crate::surface::DrawSurface;

/// Host capability to schedule display-refresh callbacks.
pub trait FrameHost {
    /// Request one callback on the next refresh and return its handle.
    fn request_frame(&mut self) -> VizResult<i32>;

    /// Cancel a callback previously returned by [`FrameHost::request_frame`].
    fn cancel_frame(&mut self, handle: i32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Not attached, or detached for good.
    Idle,
    Running,
    Paused,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Running => "running",
            PlaybackState::Paused => "paused",
        };
        f.write_str(label)
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickStats {
    /// Clock advance applied this tick.
    pub delta: Duration,
    /// Playback clock after the tick.
    pub elapsed: Duration,
    /// `None` when the scheduler is idle and nothing was drawn.
    pub painted: Option<Painted>,
}

/// Playback state machine for one attached surface.
pub struct FrameScheduler {
    state: PlaybackState,
    elapsed: Duration,
    last_tick: Option<Timestamp>,
    scene: Option<Scene>,
    trace: Option<NormalizeTrace>,
    pending_scene: Option<Option<Scene>>,
    reset_requested: bool,
    pending_frame: Option<i32>,
    painter: Painter,
    normalizer: Normalizer,
    max_frame_delta_ms: f64,
    autoplay: bool,
}

impl FrameScheduler {
    pub fn new(config: &VizConfig) -> Self {
        Self {
            state: PlaybackState::Idle,
            elapsed: Duration::zero(),
            last_tick: None,
            scene: None,
            trace: None,
            pending_scene: None,
            reset_requested: false,
            pending_frame: None,
            painter: Painter::new(config),
            normalizer: Normalizer::from_config(&config.playback),
            max_frame_delta_ms: config.playback.max_frame_delta_ms,
            autoplay: config.playback.autoplay,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Running
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// True iff the demo animation is what the current frame shows.
    pub fn using_demo(&self) -> bool {
        self.painter.shows_demo(self.scene.as_ref())
    }

    /// Normalization trace of the most recently loaded payload.
    pub fn trace(&self) -> Option<&NormalizeTrace> {
        self.trace.as_ref()
    }

    /// Whether a refresh callback is outstanding.
    pub fn has_pending_frame(&self) -> bool {
        self.pending_frame.is_some()
    }

    /// Start playback on a freshly attached surface and request the first
    /// refresh.
    pub fn attach(&mut self, host: &mut dyn FrameHost) -> VizResult<()> {
        self.state = if self.autoplay {
            PlaybackState::Running
        } else {
            PlaybackState::Paused
        };
        self.last_tick = None;
        info!(state = %self.state, "scheduler attached");
        self.schedule(host)
    }

    /// Stop for good: cancel the pending refresh and drop the scene.
    pub fn detach(&mut self, host: &mut dyn FrameHost) {
        if let Some(handle) = self.pending_frame.take() {
            host.cancel_frame(handle);
        }
        self.state = PlaybackState::Idle;
        self.scene = None;
        self.pending_scene = None;
        info!("scheduler detached");
    }

    fn schedule(&mut self, host: &mut dyn FrameHost) -> VizResult<()> {
        if self.state == PlaybackState::Idle || self.pending_frame.is_some() {
            return Ok(());
        }
        self.pending_frame = Some(host.request_frame()?);
        Ok(())
    }

    /// Handle a refresh callback: tick, then request the next refresh.
    pub fn on_frame(
        &mut self,
        surface: &mut dyn DrawSurface,
        host: &mut dyn FrameHost,
        timestamp: Timestamp,
    ) -> VizResult<TickStats> {
        self.pending_frame = None;
        let stats = self.tick(surface, timestamp);
        self.schedule(host)?;
        Ok(stats)
    }

    /// Advance the clock to `timestamp` and paint one frame.
    pub fn tick(&mut self, surface: &mut dyn DrawSurface, timestamp: Timestamp) -> TickStats {
        if self.state == PlaybackState::Idle {
            return TickStats {
                delta: Duration::zero(),
                elapsed: self.elapsed,
                painted: None,
            };
        }

        if let Some(scene) = self.pending_scene.take() {
            self.scene = scene;
            self.reset_requested = true;
        }
        if std::mem::take(&mut self.reset_requested) {
            self.elapsed = Duration::zero();
            self.last_tick = None;
        }

        let delta = match self.last_tick {
            Some(last) => timestamp.delta_since(last, self.max_frame_delta_ms),
            None => Duration::zero(),
        };
        self.last_tick = Some(timestamp);

        if self.state == PlaybackState::Running {
            self.elapsed = self.elapsed + delta;
        }
        if let Some(scene) = &self.scene {
            self.elapsed = scene.effective_time(self.elapsed);
        }

        let trace = self.trace.as_ref().map(ToString::to_string);
        let painted = self
            .painter
            .paint(surface, self.scene.as_ref(), self.elapsed, trace.as_deref());

        TickStats {
            delta,
            elapsed: self.elapsed,
            painted: Some(painted),
        }
    }

    /// Normalize `payload` and queue the result (scene or none) for the
    /// next tick. Returns whether a scene was recognized.
    pub fn load_payload(&mut self, payload: &Value) -> bool {
        let normalized = self.normalizer.normalize(payload);
        let found = normalized.scene.is_some();
        info!(trace = %normalized.trace, "visualization payload received");
        self.trace = Some(normalized.trace);
        self.pending_scene = Some(normalized.scene);
        found
    }

    /// Queue an already-built scene for the next tick.
    pub fn load_scene(&mut self, scene: Option<Scene>) {
        self.pending_scene = Some(scene);
    }

    /// Rewind the clock to zero at the next tick.
    pub fn reset(&mut self) {
        self.reset_requested = true;
    }

    /// Flip between running and paused. Elapsed time is left untouched.
    pub fn toggle_play(&mut self) -> PlaybackState {
        self.state = match self.state {
            PlaybackState::Running => PlaybackState::Paused,
            PlaybackState::Paused => PlaybackState::Running,
            PlaybackState::Idle => PlaybackState::Idle,
        };
        debug!(state = %self.state, "playback toggled");
        self.state
    }

    pub fn set_playing(&mut self, playing: bool) {
        if self.state != PlaybackState::Idle && self.is_playing() != playing {
            self.toggle_play();
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.painter.set_theme(theme);
    }

    /// One-line summary for status displays.
    pub fn status_line(&self) -> String {
        format!(
            "Status: {} | Playing: {}",
            if self.using_demo() { "Demo" } else { "Visualization" },
            if self.is_playing() { "Yes" } else { "No" }
        )
    }
}
