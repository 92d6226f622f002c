//! Animation interpolation: a layer's props at a point in scene time.

use crate::layer::Layer;
use crate::props::Props;

/// Resolve the props of `layer` at scene time `t_ms`.
///
/// Starts from the base props and applies each animation in declaration
/// order, so when several animations target the same property the last
/// applicable one wins. Animations that have not started leave the base
/// value untouched.
pub fn resolve_props(layer: &Layer, t_ms: f64) -> Props {
    let mut props = layer.props.clone();
    for anim in &layer.animations {
        if let Some(value) = anim.value_at(t_ms) {
            props.set_number(&anim.property, value);
        }
    }
    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Animation;
    use crate::layer::LayerKind;
    use crate::props::PropKey;
    use serde_json::json;

    fn rect_at_x(x: f64) -> Layer {
        let mut props = Props::new();
        props.set_number("x", x);
        Layer::new(LayerKind::Rect).with_props(props)
    }

    #[test]
    fn test_base_props_before_start() {
        let layer = rect_at_x(5.0).with_animation(Animation::new("x", 1000.0, 2000.0, 100.0, 200.0));
        assert_eq!(resolve_props(&layer, 500.0).number(PropKey::X), Some(5.0));
        assert_eq!(resolve_props(&layer, 1500.0).number(PropKey::X), Some(150.0));
        assert_eq!(resolve_props(&layer, 9000.0).number(PropKey::X), Some(200.0));
    }

    #[test]
    fn test_last_applicable_animation_wins() {
        let layer = rect_at_x(0.0)
            .with_animation(Animation::new("x", 0.0, 1000.0, 0.0, 100.0))
            .with_animation(Animation::new("x", 0.0, 1000.0, 500.0, 600.0));
        assert_eq!(resolve_props(&layer, 500.0).number(PropKey::X), Some(550.0));
    }

    #[test]
    fn test_later_animation_not_started_keeps_earlier() {
        let layer = rect_at_x(0.0)
            .with_animation(Animation::new("x", 0.0, 1000.0, 0.0, 100.0))
            .with_animation(Animation::new("x", 2000.0, 3000.0, 500.0, 600.0));
        assert_eq!(resolve_props(&layer, 1500.0).number(PropKey::X), Some(100.0));
    }

    #[test]
    fn test_animation_creates_missing_prop() {
        let layer = Layer::new(LayerKind::Circle).with_animation(Animation::new("r", 0.0, 100.0, 0.0, 10.0));
        assert_eq!(layer.props.number(PropKey::R), None);
        assert_eq!(layer.props_at(50.0).number(PropKey::R), Some(5.0));
    }

    #[test]
    fn test_base_props_unchanged() {
        let layer = Layer::from_json(&json!({
            "type": "rect",
            "props": {"x": 1},
            "animations": [{"property": "x", "start": 0, "end": 10, "from": 0, "to": 10}]
        }));
        let _ = resolve_props(&layer, 5.0);
        assert_eq!(layer.props.number(PropKey::X), Some(1.0));
    }

    #[test]
    fn test_unknown_property_lands_in_extra() {
        let layer = rect_at_x(0.0).with_animation(Animation::new("rotation", 0.0, 100.0, 0.0, 90.0));
        let props = resolve_props(&layer, 100.0);
        assert_eq!(props.extra_number("rotation"), Some(90.0));
    }
}
