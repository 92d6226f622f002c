use crate::animation::Animation;
use crate::layer::{Layer, LayerKind};
use crate::props::{PropKey, PropValue, Props};
use crate::scene::Scene;

/// A builder for constructing a Scene programmatically.
/// Useful for the built-in sample and for unit testing.
pub struct SceneBuilder {
    scene: Scene,
}

impl SceneBuilder {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            scene: Scene::new(duration_ms, Vec::new()),
        }
    }

    /// Add a layer to the scene. First added is drawn first (back).
    pub fn add_layer(&mut self, layer: Layer) -> &mut Self {
        self.scene.layers.push(layer);
        self
    }

    /// Build and return the scene.
    pub fn build(&self) -> Scene {
        self.scene.clone()
    }
}

/// A builder for constructing a Layer.
pub struct LayerBuilder {
    layer: Layer,
}

impl LayerBuilder {
    pub fn new(kind: LayerKind) -> Self {
        Self {
            layer: Layer::new(kind),
        }
    }

    pub fn position(&mut self, x: f64, y: f64) -> &mut Self {
        self.number(PropKey::X, x).number(PropKey::Y, y)
    }

    pub fn size(&mut self, width: f64, height: f64) -> &mut Self {
        self.number(PropKey::Width, width).number(PropKey::Height, height)
    }

    pub fn opacity(&mut self, val: f64) -> &mut Self {
        self.number(PropKey::Opacity, val)
    }

    pub fn fill(&mut self, color: impl Into<String>) -> &mut Self {
        self.text(PropKey::Fill, color)
    }

    pub fn stroke(&mut self, color: impl Into<String>, width: f64) -> &mut Self {
        self.text(PropKey::Stroke, color).number(PropKey::StrokeWidth, width)
    }

    pub fn number(&mut self, key: PropKey, value: f64) -> &mut Self {
        self.layer.props.set(key, PropValue::Number(value));
        self
    }

    pub fn text(&mut self, key: PropKey, value: impl Into<String>) -> &mut Self {
        self.layer.props.set(key, PropValue::Text(value.into()));
        self
    }

    /// Replace all props at once.
    pub fn props(&mut self, props: Props) -> &mut Self {
        self.layer.props = props;
        self
    }

    /// Add an animation block.
    pub fn add_animation(&mut self, anim: Animation) -> &mut Self {
        self.layer.animations.push(anim);
        self
    }

    /// Build and return the layer.
    pub fn build(&self) -> Layer {
        self.layer.clone()
    }
}

/// The built-in sample: a rectangle sliding right, a circle and a caption
/// on a four second loop.
pub fn sample_scene() -> Scene {
    SceneBuilder::new(4000)
        .add_layer(
            LayerBuilder::new(LayerKind::Rect)
                .position(100.0, 100.0)
                .size(100.0, 50.0)
                .fill("#3b82f6")
                .add_animation(Animation::new("x", 0.0, 2000.0, 100.0, 300.0))
                .build(),
        )
        .add_layer(
            LayerBuilder::new(LayerKind::Circle)
                .position(200.0, 200.0)
                .number(PropKey::Radius, 30.0)
                .fill("#ef4444")
                .build(),
        )
        .add_layer(
            LayerBuilder::new(LayerKind::Text)
                .position(200.0, 250.0)
                .text(PropKey::Content, "Test Visualization")
                .number(PropKey::FontSize, 18.0)
                .build(),
        )
        .build()
}
