//! The semantic property container of a layer.
//!
//! Payloads carry free-form `props` objects. Known property names are
//! parsed into typed [`PropValue`]s keyed by [`PropKey`]; anything else is
//! kept verbatim in an `extra` bucket so it survives a round trip but never
//! influences drawing.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// Property names the shape renderer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropKey {
    X,
    Y,
    Width,
    Height,
    R,
    Radius,
    X1,
    Y1,
    X2,
    Y2,
    Opacity,
    Fill,
    Stroke,
    StrokeWidth,
    Content,
    Text,
    Label,
    FontSize,
    FontFamily,
    TextAlign,
    TextBaseline,
}

impl PropKey {
    pub const ALL: [PropKey; 21] = [
        PropKey::X,
        PropKey::Y,
        PropKey::Width,
        PropKey::Height,
        PropKey::R,
        PropKey::Radius,
        PropKey::X1,
        PropKey::Y1,
        PropKey::X2,
        PropKey::Y2,
        PropKey::Opacity,
        PropKey::Fill,
        PropKey::Stroke,
        PropKey::StrokeWidth,
        PropKey::Content,
        PropKey::Text,
        PropKey::Label,
        PropKey::FontSize,
        PropKey::FontFamily,
        PropKey::TextAlign,
        PropKey::TextBaseline,
    ];

    /// Canonical payload name.
    pub fn name(self) -> &'static str {
        match self {
            PropKey::X => "x",
            PropKey::Y => "y",
            PropKey::Width => "width",
            PropKey::Height => "height",
            PropKey::R => "r",
            PropKey::Radius => "radius",
            PropKey::X1 => "x1",
            PropKey::Y1 => "y1",
            PropKey::X2 => "x2",
            PropKey::Y2 => "y2",
            PropKey::Opacity => "opacity",
            PropKey::Fill => "fill",
            PropKey::Stroke => "stroke",
            PropKey::StrokeWidth => "strokeWidth",
            PropKey::Content => "content",
            PropKey::Text => "text",
            PropKey::Label => "label",
            PropKey::FontSize => "fontSize",
            PropKey::FontFamily => "fontFamily",
            PropKey::TextAlign => "textAlign",
            PropKey::TextBaseline => "textBaseline",
        }
    }

    /// Resolve a payload name. Returns the key and whether the name was an
    /// alias (aliases never override the canonical spelling).
    pub fn lookup(name: &str) -> Option<(PropKey, bool)> {
        if name == "font-size" {
            return Some((PropKey::FontSize, true));
        }
        PropKey::ALL
            .iter()
            .copied()
            .find(|k| k.name() == name)
            .map(|k| (k, false))
    }
}

impl fmt::Display for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed scalar property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl PropValue {
    /// Convert a JSON scalar. Null, arrays and objects are not property values.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).map(PropValue::Number),
            Value::String(s) => Some(PropValue::Text(s.clone())),
            Value::Bool(b) => Some(PropValue::Bool(*b)),
            _ => None,
        }
    }

    /// Numeric reading: numbers as-is, numeric strings parsed, everything else `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropValue::Number(v) => Some(*v),
            PropValue::Text(s) => parse_numeric_str(s),
            PropValue::Bool(_) => None,
        }
    }

    /// Display reading used for text content.
    pub fn to_display_string(&self) -> String {
        match self {
            PropValue::Number(v) => format_number(*v),
            PropValue::Text(s) => s.clone(),
            PropValue::Bool(b) => b.to_string(),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            PropValue::Number(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            PropValue::Text(s) => Value::String(s.clone()),
            PropValue::Bool(b) => Value::Bool(*b),
        }
    }
}

fn parse_numeric_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Lenient numeric coercion for untrusted payload fields.
///
/// Finite JSON numbers and numeric strings yield a value; anything else is
/// treated as absent so the caller's default applies.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    }
}

/// Layer properties: typed known keys plus preserved unknown fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
    known: BTreeMap<PropKey, PropValue>,
    extra: BTreeMap<String, Value>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object, skipping the names in `exclude`.
    pub fn from_json_map(map: &Map<String, Value>, exclude: &[&str]) -> Self {
        let mut props = Props::new();
        for (name, value) in map {
            if exclude.contains(&name.as_str()) {
                continue;
            }
            props.insert_json(name, value);
        }
        props
    }

    fn insert_json(&mut self, name: &str, value: &Value) {
        match (PropKey::lookup(name), PropValue::from_json(value)) {
            (Some((key, true)), Some(v)) => {
                self.known.entry(key).or_insert(v);
            }
            (Some((key, false)), Some(v)) => {
                self.known.insert(key, v);
            }
            (_, _) if value.is_null() => {}
            _ => {
                self.extra.insert(name.to_string(), value.clone());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty() && self.extra.is_empty()
    }

    pub fn get(&self, key: PropKey) -> Option<&PropValue> {
        self.known.get(&key)
    }

    /// Known properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (PropKey, &PropValue)> + '_ {
        self.known.iter().map(|(k, v)| (*k, v))
    }

    /// Numeric value of `key`, or `None` when absent or non-numeric.
    pub fn number(&self, key: PropKey) -> Option<f64> {
        self.get(key).and_then(PropValue::as_number)
    }

    /// First numeric value among `keys`, in order.
    pub fn first_number(&self, keys: &[PropKey]) -> Option<f64> {
        keys.iter().find_map(|k| self.number(*k))
    }

    /// Textual value of `key` (strings only).
    pub fn text(&self, key: PropKey) -> Option<&str> {
        match self.get(key) {
            Some(PropValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// First present value among `keys`, rendered for display.
    pub fn first_display(&self, keys: &[PropKey]) -> Option<String> {
        keys.iter()
            .find_map(|k| self.get(*k))
            .map(PropValue::to_display_string)
    }

    pub fn set(&mut self, key: PropKey, value: PropValue) {
        self.known.insert(key, value);
    }

    /// Set a numeric value by payload name; unknown names land in `extra`.
    pub fn set_number(&mut self, name: &str, value: f64) {
        match PropKey::lookup(name) {
            Some((key, _)) => {
                self.known.insert(key, PropValue::Number(value));
            }
            None => {
                let json = serde_json::Number::from_f64(value)
                    .map(Value::Number)
                    .unwrap_or(Value::Null);
                self.extra.insert(name.to_string(), json);
            }
        }
    }

    /// Fields that are preserved but not used for drawing.
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    /// Read a preserved field by name.
    pub fn extra_number(&self, name: &str) -> Option<f64> {
        self.extra.get(name).and_then(coerce_number)
    }
}

impl Serialize for Props {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.known.len() + self.extra.len()))?;
        for (key, value) in &self.known {
            map.serialize_entry(key.name(), &value.to_json())?;
        }
        for (name, value) in &self.extra {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Props {
        Props::from_json_map(value.as_object().unwrap(), &[])
    }

    #[test]
    fn test_known_and_extra_split() {
        let p = props(json!({"x": 10, "fill": "#fff", "rotation": 45, "meta": {"a": 1}}));
        assert_eq!(p.number(PropKey::X), Some(10.0));
        assert_eq!(p.text(PropKey::Fill), Some("#fff"));
        assert_eq!(p.extra().len(), 2);
        assert_eq!(p.extra_number("rotation"), Some(45.0));
    }

    #[test]
    fn test_numeric_coercion() {
        let p = props(json!({"width": "120", "height": "tall", "opacity": true}));
        assert_eq!(p.number(PropKey::Width), Some(120.0));
        assert_eq!(p.number(PropKey::Height), None);
        assert_eq!(p.number(PropKey::Opacity), None);
    }

    #[test]
    fn test_null_is_absent() {
        let p = props(json!({"x": null, "foo": null}));
        assert!(p.is_empty());
    }

    #[test]
    fn test_font_size_alias_never_overrides() {
        let p = props(json!({"font-size": 30, "fontSize": 18}));
        assert_eq!(p.number(PropKey::FontSize), Some(18.0));
        let p = props(json!({"font-size": 30}));
        assert_eq!(p.number(PropKey::FontSize), Some(30.0));
    }

    #[test]
    fn test_first_number_and_display() {
        let p = props(json!({"radius": 12, "label": 42}));
        assert_eq!(p.first_number(&[PropKey::R, PropKey::Radius]), Some(12.0));
        assert_eq!(
            p.first_display(&[PropKey::Content, PropKey::Text, PropKey::Label]),
            Some("42".to_string())
        );
    }

    #[test]
    fn test_set_number_routes_unknown_to_extra() {
        let mut p = Props::new();
        p.set_number("x", 5.0);
        p.set_number("rotation", 90.0);
        assert_eq!(p.number(PropKey::X), Some(5.0));
        assert_eq!(p.extra_number("rotation"), Some(90.0));
    }

    #[test]
    fn test_serializes_canonical_names() {
        let p = props(json!({"strokeWidth": 2, "font-size": 14, "custom": "keep"}));
        let out = serde_json::to_value(&p).unwrap();
        assert_eq!(out, json!({"strokeWidth": 2.0, "fontSize": 14.0, "custom": "keep"}));
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(3)), Some(3.0));
        assert_eq!(coerce_number(&json!(" 2.5 ")), Some(2.5));
        assert_eq!(coerce_number(&json!("abc")), None);
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!([1])), None);
    }
}
