//! Normalization of loosely shaped payloads into a [`Scene`].
//!
//! Payloads arrive from an untrusted generator in several legal shapes.
//! Each input is classified once into an [`InputShape`] and the shapes are
//! matched in a fixed precedence order. Nothing here fails outward: every
//! error collapses into "no scene" plus a readable [`NormalizeTrace`].

use std::fmt;

use serde_json::{Map, Value};
use tracing::debug;
use vizcanvas_core::{PlaybackConfig, VizError, VizResult};

use crate::extract::{extract_from_str, ExtractStrategy};
use crate::layer::{Layer, LayerKind};
use crate::scene::{parse_duration, Scene, DEFAULT_DURATION_MS};

/// Limit on nested unwrapping (`.visualization`, embedded strings).
pub const MAX_UNWRAP_DEPTH: usize = 16;

/// One branch taken while normalizing.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Extracted(ExtractStrategy),
    Visualization,
    AnswerVisualization,
    LayerArray { layers: usize },
    SingleLayer,
    Canonical { layers: usize, dropped: usize },
    Rejected(String),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Extracted(strategy) => write!(f, "extracted JSON via {}", strategy),
            Step::Visualization => write!(f, "unwrapped .visualization"),
            Step::AnswerVisualization => write!(f, "unwrapped .answer.visualization"),
            Step::LayerArray { layers } => write!(f, "bare layer array ({} layers)", layers),
            Step::SingleLayer => write!(f, "single layer"),
            Step::Canonical { layers, dropped: 0 } => write!(f, "canonical scene ({} layers)", layers),
            Step::Canonical { layers, dropped } => write!(
                f,
                "canonical scene ({} layers, {} malformed entries dropped)",
                layers, dropped
            ),
            Step::Rejected(reason) => write!(f, "no scene: {}", reason),
        }
    }
}

/// Diagnostic record of how an input was interpreted.
///
/// Purely informational; rendering never depends on it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeTrace {
    input: &'static str,
    steps: Vec<Step>,
}

impl NormalizeTrace {
    fn new(input: &Value) -> Self {
        Self {
            input: kind_name(input),
            steps: Vec::new(),
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.steps.last(), Some(Step::Rejected(_)))
    }

    fn push(&mut self, step: Step) {
        self.steps.push(step);
    }
}

impl fmt::Display for NormalizeTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "input: {}", self.input)?;
        for step in &self.steps {
            write!(f, " -> {}", step)?;
        }
        Ok(())
    }
}

/// Result of normalizing one payload.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub scene: Option<Scene>,
    pub trace: NormalizeTrace,
}

/// The recognized payload shapes, in precedence order.
#[derive(Debug)]
pub enum InputShape<'a> {
    Missing,
    Text(&'a str),
    Wrapped(&'a Value),
    AnswerWrapped(&'a Value),
    LayerArray(&'a [Value]),
    SingleLayer(&'a Map<String, Value>),
    Canonical(&'a Map<String, Value>, &'a [Value]),
    Unrecognized(&'static str),
}

/// Classify a payload value. First match wins.
pub fn classify(value: &Value) -> InputShape<'_> {
    match value {
        Value::Null => InputShape::Missing,
        Value::String(text) => InputShape::Text(text),
        Value::Array(items) => InputShape::LayerArray(items),
        Value::Object(map) => classify_object(map),
        Value::Bool(_) => InputShape::Unrecognized("boolean"),
        Value::Number(_) => InputShape::Unrecognized("number"),
    }
}

fn classify_object(map: &Map<String, Value>) -> InputShape<'_> {
    if let Some(inner) = map.get("visualization").filter(|v| is_truthy(v)) {
        return InputShape::Wrapped(inner);
    }
    if let Some(inner) = map
        .get("answer")
        .and_then(Value::as_object)
        .and_then(|answer| answer.get("visualization"))
        .filter(|v| is_truthy(v))
    {
        return InputShape::AnswerWrapped(inner);
    }
    let has_layers_field = map.get("layers").is_some_and(|v| !v.is_null());
    if map.get("type").is_some_and(is_truthy) && !has_layers_field {
        return InputShape::SingleLayer(map);
    }
    match map.get("layers") {
        Some(Value::Array(items)) => InputShape::Canonical(map, items),
        Some(_) if has_layers_field => InputShape::Unrecognized("object whose layers is not an array"),
        _ => InputShape::Unrecognized("object without layers"),
    }
}

/// Empty strings, zero, `false` and `null` do not count as present.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Turns payloads into scenes.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    default_duration_ms: u64,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_MS)
    }
}

impl Normalizer {
    pub fn new(default_duration_ms: u64) -> Self {
        Self {
            default_duration_ms: if default_duration_ms == 0 {
                DEFAULT_DURATION_MS
            } else {
                default_duration_ms
            },
        }
    }

    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self::new(config.default_duration_ms)
    }

    pub fn default_duration_ms(&self) -> u64 {
        self.default_duration_ms
    }

    /// Normalize any payload. Never fails; an unusable payload yields
    /// `scene: None` with the reason recorded in the trace.
    pub fn normalize(&self, input: &Value) -> Normalized {
        let mut trace = NormalizeTrace::new(input);
        match self.normalize_at(input, 0, &mut trace) {
            Ok(scene) => {
                debug!(%trace, duration_ms = scene.duration_ms, "payload normalized");
                Normalized {
                    scene: Some(scene),
                    trace,
                }
            }
            Err(e) => {
                trace.push(Step::Rejected(e.to_string()));
                debug!(%trace, "payload rejected");
                Normalized { scene: None, trace }
            }
        }
    }

    /// Normalize a raw text payload.
    pub fn normalize_str(&self, text: &str) -> Normalized {
        self.normalize(&Value::String(text.to_string()))
    }

    fn normalize_at(&self, value: &Value, depth: usize, trace: &mut NormalizeTrace) -> VizResult<Scene> {
        if depth > MAX_UNWRAP_DEPTH {
            return Err(VizError::Normalize(format!(
                "nested deeper than {} levels",
                MAX_UNWRAP_DEPTH
            )));
        }

        match classify(value) {
            InputShape::Missing => Err(VizError::Normalize("payload is missing".into())),
            InputShape::Text(text) => {
                let (inner, strategy) = extract_from_str(text)
                    .ok_or_else(|| VizError::Extract("no JSON value found in text".into()))?;
                trace.push(Step::Extracted(strategy));
                self.normalize_at(&inner, depth + 1, trace)
            }
            InputShape::Wrapped(inner) => {
                trace.push(Step::Visualization);
                self.normalize_at(inner, depth + 1, trace)
            }
            InputShape::AnswerWrapped(inner) => {
                trace.push(Step::AnswerVisualization);
                self.normalize_at(inner, depth + 1, trace)
            }
            InputShape::LayerArray(items) => {
                let layers: Vec<Layer> = items.iter().map(array_element_layer).collect();
                trace.push(Step::LayerArray {
                    layers: layers.len(),
                });
                Ok(Scene::new(self.default_duration_ms, layers))
            }
            InputShape::SingleLayer(map) => {
                trace.push(Step::SingleLayer);
                let duration = parse_duration(map.get("duration"), self.default_duration_ms);
                Ok(Scene::new(duration, vec![Layer::from_json_map(map)]))
            }
            InputShape::Canonical(map, items) => {
                let layers: Vec<Layer> = items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(Layer::from_json_map)
                    .collect();
                trace.push(Step::Canonical {
                    layers: layers.len(),
                    dropped: items.len() - layers.len(),
                });
                let duration = parse_duration(map.get("duration"), self.default_duration_ms);
                Ok(Scene::new(duration, layers))
            }
            InputShape::Unrecognized(what) => {
                Err(VizError::Normalize(format!("unrecognized {}", what)))
            }
        }
    }
}

/// Array elements that are not objects become rectangles with no props.
fn array_element_layer(element: &Value) -> Layer {
    match element {
        Value::Object(map) => Layer::from_json_map(map),
        _ => Layer::new(LayerKind::Rect),
    }
}

/// Normalize with the default scene duration.
pub fn normalize(input: &Value) -> Normalized {
    Normalizer::default().normalize(input)
}
