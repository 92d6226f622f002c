use serde::{Deserialize, Serialize};
use std::fmt;

/// RGBA color representation with f32 components in [0.0, 1.0] range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// CSS named colors recognized by [`Color::parse_css`].
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
    ("pink", [255, 192, 203]),
    ("cyan", [0, 255, 255]),
    ("aqua", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("fuchsia", [255, 0, 255]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("silver", [192, 192, 192]),
    ("brown", [165, 42, 42]),
    ("navy", [0, 0, 128]),
    ("teal", [0, 128, 128]),
    ("olive", [128, 128, 0]),
    ("maroon", [128, 0, 0]),
    ("gold", [255, 215, 0]),
    ("indigo", [75, 0, 130]),
    ("violet", [238, 130, 238]),
    ("skyblue", [135, 206, 235]),
    ("steelblue", [70, 130, 180]),
    ("tomato", [255, 99, 71]),
    ("coral", [255, 127, 80]),
    ("salmon", [250, 128, 114]),
];

impl Color {
    /// Create a new RGBA color.
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 1.0).
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create an opaque color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Create a color from a hex string.
    ///
    /// Accepts the short (`#333`, `#333f`) and long (`#FF0000`, `#FF0000FF`)
    /// forms, with or without the leading `#`.
    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(ColorError::InvalidHex);
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| ColorError::InvalidHex);
        let short = |s: &str| channel(s).map(|v| v * 17);
        match hex.len() {
            3 | 4 => {
                let r = short(&hex[0..1])?;
                let g = short(&hex[1..2])?;
                let b = short(&hex[2..3])?;
                let a = if hex.len() == 4 { short(&hex[3..4])? } else { 255 };
                Ok(Self::from_rgb8(r, g, b).with_alpha(a as f32 / 255.0))
            }
            6 | 8 => {
                let r = channel(&hex[0..2])?;
                let g = channel(&hex[2..4])?;
                let b = channel(&hex[4..6])?;
                let a = if hex.len() == 8 { channel(&hex[6..8])? } else { 255 };
                Ok(Self::from_rgb8(r, g, b).with_alpha(a as f32 / 255.0))
            }
            _ => Err(ColorError::InvalidHex),
        }
    }

    /// Parse a CSS color string: hex, `rgb()`/`rgba()`, or a common named color.
    pub fn parse_css(input: &str) -> Result<Self, ColorError> {
        let s = input.trim();
        if s.starts_with('#') {
            return Self::from_hex(s);
        }
        let lower = s.to_ascii_lowercase();
        if lower == "transparent" {
            return Ok(Color::TRANSPARENT);
        }
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return Self::parse_rgb_args(args);
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, [r, g, b])| Self::from_rgb8(*r, *g, *b))
            .ok_or_else(|| ColorError::Unrecognized(s.to_string()))
    }

    fn parse_rgb_args(args: &str) -> Result<Self, ColorError> {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(ColorError::Unrecognized(args.to_string()));
        }
        let mut channels = [0.0f32; 3];
        for (slot, part) in channels.iter_mut().zip(&parts) {
            let v: f32 = part
                .parse()
                .map_err(|_| ColorError::Unrecognized(args.to_string()))?;
            *slot = (v / 255.0).clamp(0.0, 1.0);
        }
        let a = match parts.get(3) {
            Some(part) => part
                .parse::<f32>()
                .map_err(|_| ColorError::Unrecognized(args.to_string()))?
                .clamp(0.0, 1.0),
            None => 1.0,
        };
        Ok(Self::rgba(channels[0], channels[1], channels[2], a))
    }

    /// Return this color with its alpha replaced.
    pub fn with_alpha(mut self, a: f32) -> Self {
        self.a = a;
        self
    }

    /// Convert to RGBA u8 tuple.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            (self.r * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.g * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.b * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.a * 255.0).round().clamp(0.0, 255.0) as u8,
        ]
    }

    /// CSS `rgba(...)` form, suitable for a browser canvas style.
    pub fn to_css(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({}, {}, {}, {})", r, g, b, self.a.clamp(0.0, 1.0))
    }

    // --- Named constants ---

    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const RED: Color = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const BLUE: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 1.0,
        a: 1.0,
    };
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ColorError {
    #[error("invalid hex color string")]
    InvalidHex,
    #[error("unrecognized color: {0}")]
    Unrecognized(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex_rgb() {
        let c = Color::from_hex("#FF8800").unwrap();
        assert_eq!(c.to_rgba8(), [255, 136, 0, 255]);
    }

    #[test]
    fn test_color_from_hex_rgba() {
        let c = Color::from_hex("#FF880080").unwrap();
        assert_eq!(c.to_rgba8(), [255, 136, 0, 128]);
    }

    #[test]
    fn test_color_from_short_hex() {
        let c = Color::from_hex("#333").unwrap();
        assert_eq!(c.to_rgba8(), [51, 51, 51, 255]);
        let c = Color::from_hex("#e0e0e0").unwrap();
        assert_eq!(c.to_rgba8(), [224, 224, 224, 255]);
    }

    #[test]
    fn test_color_from_hex_invalid() {
        assert!(Color::from_hex("invalid").is_err());
        assert!(Color::from_hex("#GG0000").is_err());
        assert!(Color::from_hex("#ééé").is_err());
    }

    #[test]
    fn test_parse_css_forms() {
        assert_eq!(
            Color::parse_css("#3b82f6").unwrap().to_rgba8(),
            [59, 130, 246, 255]
        );
        assert_eq!(Color::parse_css(" Red ").unwrap().to_rgba8(), [255, 0, 0, 255]);
        assert_eq!(
            Color::parse_css("rgb(10, 20, 30)").unwrap().to_rgba8(),
            [10, 20, 30, 255]
        );
        assert_eq!(
            Color::parse_css("rgba(255,0,0,0.5)").unwrap().to_rgba8(),
            [255, 0, 0, 128]
        );
        assert_eq!(Color::parse_css("transparent").unwrap(), Color::TRANSPARENT);
        assert!(Color::parse_css("not-a-color").is_err());
        assert!(Color::parse_css("rgb(1,2)").is_err());
    }

    #[test]
    fn test_color_display_and_css() {
        assert_eq!(format!("{}", Color::RED), "#FF0000");
        assert_eq!(format!("{}", Color::rgba(1.0, 0.0, 0.0, 0.5)), "#FF000080");
        assert_eq!(Color::RED.to_css(), "rgba(255, 0, 0, 1)");
    }
}
