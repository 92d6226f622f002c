//! Advisory checks over a normalized scene.
//!
//! Scenes are never rejected for these; every finding describes something
//! that will be drawn with a fallback or will never take effect.

use std::fmt;

use vizcanvas_core::Color;

use crate::layer::LayerKind;
use crate::props::{PropKey, PropValue};
use crate::scene::Scene;

/// One finding, attributed to a layer index.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneWarning {
    pub layer: usize,
    pub message: String,
}

impl fmt::Display for SceneWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer {}: {}", self.layer, self.message)
    }
}

/// Collect warnings for `scene`, in layer order.
pub fn validate_scene(scene: &Scene) -> Vec<SceneWarning> {
    let mut warnings = Vec::new();

    for (index, layer) in scene.layers.iter().enumerate() {
        let mut warn = |message: String| {
            warnings.push(SceneWarning {
                layer: index,
                message,
            })
        };

        if let LayerKind::Unknown(name) = &layer.kind {
            warn(format!("unknown layer type '{}' drawn as placeholder", name));
        }

        for key in [PropKey::Fill, PropKey::Stroke] {
            if let Some(PropValue::Text(color)) = layer.props.get(key) {
                if Color::parse_css(color).is_err() {
                    warn(format!("{} '{}' is not a color, default used", key, color));
                }
            }
        }

        for anim in &layer.animations {
            if anim.is_inert() {
                warn(format!(
                    "animation of '{}' has end {} <= start {} and never applies",
                    anim.property, anim.end, anim.start
                ));
            } else if anim.start >= scene.duration_ms as f64 {
                warn(format!(
                    "animation of '{}' starts at {} ms, after the {} ms loop",
                    anim.property, anim.start, scene.duration_ms
                ));
            }
            if PropKey::lookup(&anim.property).is_none() {
                warn(format!(
                    "animation targets '{}', which is not drawn",
                    anim.property
                ));
            }
        }
    }

    warnings
}
