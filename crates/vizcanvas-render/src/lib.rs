//! # vizcanvas-render
//!
//! Turns a [`vizcanvas_ir::Scene`] into pixels. Drawing goes through the
//! [`DrawSurface`] trait, so the same shape code paints a browser canvas,
//! a CPU raster, or a recorded op list for tests. [`FrameScheduler`] owns
//! the playback clock and drives one paint per display refresh.

pub mod demo;
pub mod image_io;
pub mod pipeline;
pub mod raster;
pub mod recording;
pub mod scheduler;
pub mod shapes;
pub mod surface;
pub mod text;

pub use demo::DemoFallback;
pub use pipeline::{Painted, Painter, RenderPipeline, RenderResult};
pub use raster::RasterSurface;
pub use recording::{DrawOp, RecordingSurface};
pub use scheduler::{FrameHost, FrameScheduler, PlaybackState, TickStats};
pub use shapes::{DrawReport, ShapeRenderer};
pub use surface::{DrawSurface, FontSpec, TextAlign, TextBaseline};
pub use text::TextRenderer;
