use serde::{Deserialize, Serialize};

use crate::error::{VizError, VizResult};
use crate::math::Size2D;
use crate::theme::Theme;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Loop period used when a payload declares no usable duration.
    pub default_duration_ms: u64,
    /// Upper bound on the clock advance of a single tick.
    pub max_frame_delta_ms: f64,
    /// Start in the running state when a surface is attached.
    pub autoplay: bool,
    /// Show the demo animation for a scene with no layers.
    pub demo_when_empty: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: 5000,
            max_frame_delta_ms: 100.0,
            autoplay: true,
            demo_when_empty: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub min_width: f64,
    pub min_height: f64,
    /// Size assumed when the host cannot report one.
    pub fallback_width: f64,
    pub fallback_height: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_width: 100.0,
            min_height: 100.0,
            fallback_width: 400.0,
            fallback_height: 300.0,
        }
    }
}

impl CanvasConfig {
    pub fn min_size(&self) -> Size2D {
        Size2D::new(self.min_width, self.min_height)
    }

    pub fn fallback_size(&self) -> Size2D {
        Size2D::new(self.fallback_width, self.fallback_height)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    pub dark: bool,
}

impl ThemeConfig {
    pub fn theme(&self) -> Theme {
        Theme::from_dark_flag(self.dark)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    pub period_ms: f64,
    pub radius: f64,
    pub margin: f64,
    /// Print the normalization trace under the demo caption.
    pub show_trace: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            period_ms: 3000.0,
            radius: 20.0,
            margin: 50.0,
            show_trace: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct VizConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

impl VizConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn load_from_file(path: &std::path::Path) -> VizResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents).map_err(|e| VizError::config(e.to_string(), path))
    }

    pub fn save_to_file(&self, path: &std::path::Path) -> VizResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| VizError::config(e.to_string(), path))?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
