use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::animation::Animation;
use crate::interpolate::resolve_props;
use crate::props::Props;

/// Payload fields of a layer object that are never treated as props.
const STRUCTURAL_FIELDS: [&str; 3] = ["type", "props", "animations"];

/// What a layer draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerKind {
    Rect,
    Circle,
    Line,
    Text,
    /// Drawn exactly like [`LayerKind::Text`].
    Label,
    /// Anything else; drawn as a small placeholder square.
    Unknown(String),
}

impl LayerKind {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "rect" => LayerKind::Rect,
            "circle" => LayerKind::Circle,
            "line" => LayerKind::Line,
            "text" => LayerKind::Text,
            "label" => LayerKind::Label,
            _ => LayerKind::Unknown(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LayerKind::Rect => "rect",
            LayerKind::Circle => "circle",
            LayerKind::Line => "line",
            LayerKind::Text => "text",
            LayerKind::Label => "label",
            LayerKind::Unknown(name) => name,
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, LayerKind::Text | LayerKind::Label)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, LayerKind::Unknown(_))
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerKind::Unknown(name) if name.is_empty() => write!(f, "<untyped>"),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl Serialize for LayerKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// One drawable element of a scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub props: Props,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub animations: Vec<Animation>,
}

impl Layer {
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            props: Props::new(),
            animations: Vec::new(),
        }
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animations.push(animation);
        self
    }

    /// Read a layer from a payload value.
    ///
    /// Never fails. A non-object becomes an untyped layer with no props. A
    /// layer without a `props` object contributes its own remaining fields
    /// as props. Animation entries that are not objects, or that name no
    /// property, are skipped.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::from_json_map(map),
            _ => Layer::new(LayerKind::Unknown(String::new())),
        }
    }

    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        let kind = match map.get("type") {
            Some(Value::String(name)) => LayerKind::parse(name),
            _ => LayerKind::Unknown(String::new()),
        };

        let props = match map.get("props") {
            Some(Value::Object(props)) => Props::from_json_map(props, &[]),
            None | Some(Value::Null) => Props::from_json_map(map, &STRUCTURAL_FIELDS),
            Some(_) => Props::new(),
        };

        let animations = match map.get("animations") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_object)
                .filter_map(Animation::from_json)
                .collect(),
            _ => Vec::new(),
        };

        Self {
            kind,
            props,
            animations,
        }
    }

    /// The layer's props at scene time `t_ms`.
    pub fn props_at(&self, t_ms: f64) -> Props {
        resolve_props(self, t_ms)
    }
}
