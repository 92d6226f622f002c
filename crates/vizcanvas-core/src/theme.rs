//! Light/dark theme palettes.
//!
//! The theme flag only changes default colors; it never affects what is
//! drawn or in which order.

use serde::{Deserialize, Serialize};

use crate::Color;

/// Host-selected color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_flag(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    /// Default colors for this theme.
    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                fill: Color::from_rgb8(0x33, 0x33, 0x33),
                stroke: Color::from_rgb8(0x77, 0x77, 0x77),
                placeholder: Color::from_rgb8(0xcc, 0xcc, 0xcc),
                demo_accent: Color::from_rgb8(0x22, 0xc5, 0x5e),
                background: Color::WHITE,
            },
            Theme::Dark => Palette {
                fill: Color::from_rgb8(0xe0, 0xe0, 0xe0),
                stroke: Color::from_rgb8(0x88, 0x88, 0x88),
                placeholder: Color::from_rgb8(0x66, 0x66, 0x66),
                demo_accent: Color::from_rgb8(0x4a, 0xde, 0x80),
                background: Color::from_rgb8(0x11, 0x18, 0x27),
            },
        }
    }
}

/// Default colors used when a layer does not specify its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// Fill for rect, circle and text layers.
    pub fill: Color,
    /// Stroke for line layers.
    pub stroke: Color,
    /// Fill of the marker drawn for unknown layer types.
    pub placeholder: Color,
    /// The moving disc of the demo animation.
    pub demo_accent: Color,
    /// Backdrop used by headless surfaces.
    pub background: Color,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_flag() {
        assert_eq!(Theme::from_dark_flag(true), Theme::Dark);
        assert_eq!(Theme::from_dark_flag(false), Theme::Light);
        assert!(Theme::Dark.is_dark());
    }

    #[test]
    fn test_palettes_differ() {
        let light = Theme::Light.palette();
        let dark = Theme::Dark.palette();
        assert_eq!(light.fill.to_rgba8(), [0x33, 0x33, 0x33, 255]);
        assert_eq!(dark.fill.to_rgba8(), [0xe0, 0xe0, 0xe0, 255]);
        assert_ne!(light.placeholder, dark.placeholder);
    }
}
