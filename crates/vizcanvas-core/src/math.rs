use serde::{Deserialize, Serialize};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

impl Default for Point2D {
    fn default() -> Self {
        Self::zero()
    }
}

/// A 2D size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size2D {
    pub width: f64,
    pub height: f64,
}

impl Size2D {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Sizing of a drawing surface inside its host container.
///
/// Drawing happens in CSS units; the backing store is scaled by the device
/// pixel ratio so that output stays sharp on dense displays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Logical (CSS) size that layer coordinates refer to.
    pub css: Size2D,
    /// Backing store width in device pixels.
    pub backing_width: u32,
    /// Backing store height in device pixels.
    pub backing_height: u32,
    /// Device pixel ratio applied as the base transform.
    pub scale: f64,
}

impl Viewport {
    /// Compute a viewport for a container, clamping a collapsed or
    /// zero-sized container to `min` instead of failing.
    pub fn fit(container: Size2D, device_pixel_ratio: f64, min: Size2D) -> Self {
        let scale = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        let clamp = |v: f64, lo: f64| {
            if v.is_finite() {
                v.floor().max(lo)
            } else {
                lo
            }
        };
        let css = Size2D::new(clamp(container.width, min.width), clamp(container.height, min.height));
        Self {
            css,
            backing_width: (css.width * scale).floor().max(1.0) as u32,
            backing_height: (css.height * scale).floor().max(1.0) as u32,
            scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_scales_backing_store() {
        let vp = Viewport::fit(Size2D::new(640.5, 400.0), 2.0, Size2D::new(100.0, 100.0));
        assert_eq!(vp.css, Size2D::new(640.0, 400.0));
        assert_eq!((vp.backing_width, vp.backing_height), (1280, 800));
        assert_eq!(vp.scale, 2.0);
    }

    #[test]
    fn test_viewport_clamps_zero_sized_container() {
        let vp = Viewport::fit(Size2D::new(0.0, 0.0), 0.0, Size2D::new(100.0, 100.0));
        assert_eq!(vp.css, Size2D::new(100.0, 100.0));
        assert_eq!((vp.backing_width, vp.backing_height), (100, 100));
        assert_eq!(vp.scale, 1.0);
    }
}
