//! # vizcanvas-core
//!
//! Core types and primitives shared by every vizcanvas crate:
//! colors and theme palettes, playback time, geometry, raster frames,
//! configuration, and the error type.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod hash;
pub mod math;
pub mod theme;
pub mod time;

pub use config::*;

pub use color::Color;
pub use error::{VizError, VizResult};
pub use frame::FrameBuffer;
pub use math::{Point2D, Size2D, Viewport};
pub use theme::{Palette, Theme};
pub use time::{Duration, Timestamp};
